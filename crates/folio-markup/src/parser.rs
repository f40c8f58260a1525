//! Tree builder
//!
//! Folds the token stream into [`TaggedNode`]s with an explicit stack of open
//! frames. A close tag pops back to the innermost open frame of the same tag
//! (closing anything opened after it); a close tag nothing matches stays
//! literal. Frames still open at end of input run to the end.

use crate::lexer::{self, Token};
use crate::{Attributes, EffectClass, TaggedNode};

struct Frame {
    effect: Option<EffectClass>,
    attributes: Attributes,
    children: Vec<TaggedNode>,
}

impl Frame {
    fn root() -> Self {
        Self { effect: None, attributes: Attributes::new(), children: Vec::new() }
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(TaggedNode::Text(last)) = self.children.last_mut() {
            last.push_str(text);
        } else {
            self.children.push(TaggedNode::Text(text.to_string()));
        }
    }

    fn into_node(self) -> Option<TaggedNode> {
        let effect = self.effect?;
        Some(TaggedNode::Element { effect, attributes: self.attributes, children: self.children })
    }
}

/// Parse raw story text into top-level tagged nodes
pub fn parse(input: &str) -> Vec<TaggedNode> {
    let mut stack = vec![Frame::root()];

    for token in lexer::tokenize(input) {
        match token {
            Token::Text(text) => top(&mut stack).push_text(text),
            Token::Open { spec, attributes } => stack.push(Frame {
                effect: Some(spec.effect),
                attributes,
                children: Vec::new(),
            }),
            Token::Close { spec, raw } => {
                let open = stack.iter().rposition(|f| f.effect == Some(spec.effect));
                match open {
                    Some(index) => {
                        while stack.len() > index {
                            close_top(&mut stack);
                        }
                    }
                    None => top(&mut stack).push_text(raw),
                }
            }
        }
    }

    while stack.len() > 1 {
        close_top(&mut stack);
    }
    let nodes = stack.pop().map(|root| root.children).unwrap_or_default();
    tracing::trace!("Parsed {} top-level nodes", nodes.len());
    nodes
}

fn top(stack: &mut [Frame]) -> &mut Frame {
    // the root frame is never popped while tokens remain
    let last = stack.len() - 1;
    &mut stack[last]
}

fn close_top(stack: &mut Vec<Frame>) {
    if stack.len() < 2 {
        return;
    }
    if let Some(node) = stack.pop().and_then(Frame::into_node) {
        top(stack).children.push(node);
    }
}
