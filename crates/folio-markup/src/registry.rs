//! Tag registry
//!
//! The fixed set of inline tags. Attribute order in a [`TagSpec`] is the
//! order the tokenizer accepts them in.

/// Behaviour attached to a tagged span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EffectClass {
    Shake,
    Instant,
    Slow,
    Fade,
    Glitch,
}

impl EffectClass {
    /// CSS class put on the rendered element
    pub fn class_name(self) -> &'static str {
        match self {
            Self::Shake => "shake",
            Self::Instant => "instant",
            Self::Slow => "slow",
            Self::Fade => "fade",
            Self::Glitch => "glitch",
        }
    }

    /// Registry entry for this class
    pub fn spec(self) -> &'static TagSpec {
        // variants are declared in registry order
        &TAG_REGISTRY[self as usize]
    }

    /// Timing directives change typing speed and have no visual effect
    pub fn is_timing_directive(self) -> bool {
        matches!(self, Self::Instant | Self::Slow)
    }
}

impl std::fmt::Display for EffectClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.class_name())
    }
}

/// One inline tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagSpec {
    /// Name between the angle brackets
    pub tag_name: &'static str,
    pub effect: EffectClass,
    /// Declared attributes, in accepted order
    pub attributes: &'static [&'static str],
}

impl TagSpec {
    pub fn accepts(&self, attribute: &str) -> bool {
        self.attributes.contains(&attribute)
    }
}

/// All known tags, in registry order
pub static TAG_REGISTRY: [TagSpec; 5] = [
    TagSpec { tag_name: "shake", effect: EffectClass::Shake, attributes: &["force"] },
    TagSpec { tag_name: "instant", effect: EffectClass::Instant, attributes: &[] },
    TagSpec { tag_name: "slow", effect: EffectClass::Slow, attributes: &["speed"] },
    TagSpec { tag_name: "fade", effect: EffectClass::Fade, attributes: &["speed"] },
    TagSpec { tag_name: "glitch", effect: EffectClass::Glitch, attributes: &[] },
];

/// Look up a tag by its exact (case-sensitive) name
pub fn lookup(tag_name: &str) -> Option<&'static TagSpec> {
    TAG_REGISTRY.iter().find(|spec| spec.tag_name == tag_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_is_unique() {
        for (i, a) in TAG_REGISTRY.iter().enumerate() {
            for b in &TAG_REGISTRY[i + 1..] {
                assert_ne!(a.tag_name, b.tag_name);
                assert_ne!(a.effect, b.effect);
            }
        }
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert_eq!(lookup("glitch").map(|s| s.effect), Some(EffectClass::Glitch));
        assert!(lookup("Glitch").is_none());
        assert!(lookup("span").is_none());
    }

    #[test]
    fn test_spec_round_trip() {
        for spec in &TAG_REGISTRY {
            assert_eq!(spec.effect.spec(), spec);
            assert_eq!(spec.effect.class_name(), spec.tag_name);
        }
    }
}
