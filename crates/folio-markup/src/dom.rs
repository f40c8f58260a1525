//! DOM materialization
//!
//! Builds `span` elements for tagged nodes: class = effect class, one
//! `data-*` entry per attribute actually written in the markup.

use folio_dom::{DomResult, DomTree, NodeId};

use crate::TaggedNode;

/// Build a detached DOM subtree for one node
pub fn materialize(node: &TaggedNode, tree: &mut DomTree) -> DomResult<NodeId> {
    match node {
        TaggedNode::Text(content) => Ok(tree.create_text(content.as_str())),
        TaggedNode::Element { effect, attributes, children } => {
            let span = tree.create_element("span");
            if let Some(element) = tree.element_mut(span) {
                element.classes.add(effect.class_name());
                for attribute in attributes.iter() {
                    element.dataset.set(&attribute.name, attribute.value.as_str());
                }
            }
            for child in children {
                let child_id = materialize(child, tree)?;
                tree.append_child(span, child_id)?;
            }
            Ok(span)
        }
    }
}

/// Parse `raw` and append every resulting node under `parent`, without any
/// typing animation. Returns the appended top-level ids.
pub fn render_static(raw: &str, tree: &mut DomTree, parent: NodeId) -> DomResult<Vec<NodeId>> {
    let nodes = crate::parse(raw);
    let mut appended = Vec::with_capacity(nodes.len());
    for node in &nodes {
        let id = materialize(node, tree)?;
        tree.append_child(parent, id)?;
        appended.push(id);
    }
    Ok(appended)
}
