//! Canonical markup output
//!
//! `<tag name=value>` with one space before each attribute.

use crate::TaggedNode;

/// Serialize nodes back to markup
pub fn serialize(nodes: &[TaggedNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(node, &mut out);
    }
    out
}

fn write_node(node: &TaggedNode, out: &mut String) {
    match node {
        TaggedNode::Text(content) => out.push_str(content),
        TaggedNode::Element { effect, attributes, children } => {
            let tag = effect.spec().tag_name;
            out.push('<');
            out.push_str(tag);
            for attribute in attributes.iter() {
                out.push(' ');
                out.push_str(&attribute.name);
                out.push('=');
                out.push_str(&attribute.value);
            }
            out.push('>');
            for child in children {
                write_node(child, out);
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
    }
}
