//! Tagged span tree

use crate::EffectClass;

/// A tag attribute exactly as written: name and its raw digit string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }

    /// Numeric value, saturating at `u64::MAX` for absurdly long digit runs
    pub fn number(&self) -> Option<u64> {
        if self.value.is_empty() || !self.value.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(self.value.parse().unwrap_or(u64::MAX))
    }
}

/// Attributes present on an element, in declaration order.
/// Omitted attributes are simply absent; defaults are applied by consumers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<Attribute>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, attribute: Attribute) {
        self.0.push(attribute);
    }

    /// Raw value of an attribute
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.iter().find(|a| a.name == name).map(|a| a.value.as_str())
    }

    /// Integer value of an attribute
    pub fn number(&self, name: &str) -> Option<u64> {
        self.0.iter().find(|a| a.name == name).and_then(Attribute::number)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(n, v)| Attribute::new(n, v)).collect())
    }
}

/// Node of a parsed page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaggedNode {
    Text(String),
    Element {
        effect: EffectClass,
        attributes: Attributes,
        children: Vec<TaggedNode>,
    },
}

impl TaggedNode {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    pub fn element(effect: EffectClass, attributes: Attributes, children: Vec<TaggedNode>) -> Self {
        Self::Element { effect, attributes, children }
    }

    /// Effect class for elements, `None` for text
    pub fn effect(&self) -> Option<EffectClass> {
        match self {
            Self::Text(_) => None,
            Self::Element { effect, .. } => Some(*effect),
        }
    }

    /// Attribute lookup, `None` for text nodes
    pub fn attribute_number(&self, name: &str) -> Option<u64> {
        match self {
            Self::Text(_) => None,
            Self::Element { attributes, .. } => attributes.number(name),
        }
    }

    /// Concatenated text of this node and all descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Text(content) => out.push_str(content),
            Self::Element { children, .. } => {
                for child in children {
                    child.collect_text(out);
                }
            }
        }
    }
}
