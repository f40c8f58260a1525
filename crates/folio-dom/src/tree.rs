//! DOM Tree (arena-based allocation)
//!
//! Nodes are only ever appended to the arena. Removing a node detaches it
//! from its parent; the id stays valid and is never handed out again.

use crate::{DomError, DomResult, ElementData, Node, NodeData, NodeId};

/// Arena-based DOM tree
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a tree holding only the document root
    pub fn new() -> Self {
        Self { nodes: vec![Node::document()] }
    }

    /// Document root
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Element data of `id`, if it is an element
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(Node::as_element)
    }

    /// Mutable element data of `id`, if it is an element
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(Node::as_element_mut)
    }

    /// Number of nodes ever allocated
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty (only the root)
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Allocate a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(Node::element(tag))
    }

    /// Allocate a detached text node
    pub fn create_text(&mut self, content: impl Into<String>) -> NodeId {
        self.push(Node::text(content))
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Parent of a node
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Children of a node, empty for unknown ids
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Append `child` as last child of `parent`, detaching it first
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        let parent_node = self.get(parent).ok_or(DomError::NotFound(parent))?;
        if parent_node.is_text() {
            return Err(DomError::InvalidNodeType(parent));
        }
        if child == NodeId::ROOT {
            return Err(DomError::InvalidNodeType(child));
        }
        if self.get(child).is_none() {
            return Err(DomError::NotFound(child));
        }
        if self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }

        self.detach(child);
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(child);
        Ok(())
    }

    /// Detach every child of `parent` and return them in order
    pub fn clear_children(&mut self, parent: NodeId) -> Vec<NodeId> {
        let Some(node) = self.get_mut(parent) else {
            return Vec::new();
        };
        let removed = std::mem::take(&mut node.children);
        for &child in &removed {
            self.nodes[child.index()].parent = None;
        }
        removed
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(old_parent) = self.nodes[id.index()].parent.take() {
            self.nodes[old_parent.index()].children.retain(|&c| c != id);
        }
    }

    /// Is `ancestor` equal to `node` or one of its ancestors?
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Is the node reachable from the document root?
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.get(id).is_some() && self.is_inclusive_ancestor(NodeId::ROOT, id)
    }

    /// Descendants of `id` in document order, excluding `id`
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Descendant elements of `root` carrying `class`, in document order
    pub fn get_elements_by_class_name(&self, root: NodeId, class: &str) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|&id| self.element(id).is_some_and(|e| e.classes.contains(class)))
            .collect()
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        match self.get(id).map(|n| &n.data) {
            Some(NodeData::Text(t)) => t.content.clone(),
            Some(_) => self
                .descendants(id)
                .into_iter()
                .filter_map(|d| self.get(d).and_then(Node::as_text))
                .collect(),
            None => String::new(),
        }
    }

    /// Replace all children with a single text node (none for empty text).
    /// A sole text child is rewritten in place, so repeated updates do not
    /// grow the arena.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> DomResult<()> {
        let node = self.get_mut(id).ok_or(DomError::NotFound(id))?;
        if let NodeData::Text(t) = &mut node.data {
            t.content = text.to_string();
            return Ok(());
        }
        if let [only] = *node.children.as_slice() {
            if !text.is_empty() {
                if let NodeData::Text(t) = &mut self.nodes[only.index()].data {
                    t.content.clear();
                    t.content.push_str(text);
                    return Ok(());
                }
            }
        }
        self.clear_children(id);
        if !text.is_empty() {
            let text_node = self.create_text(text);
            self.append_child(id, text_node)?;
        }
        Ok(())
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_text_content() {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        let span = tree.create_element("span");
        let a = tree.create_text("Hello ");
        let b = tree.create_text("World");
        tree.append_child(tree.root(), div).unwrap();
        tree.append_child(div, a).unwrap();
        tree.append_child(div, span).unwrap();
        tree.append_child(span, b).unwrap();

        assert_eq!(tree.text_content(div), "Hello World");
        assert_eq!(tree.descendants(div), vec![a, span, b]);
        assert!(tree.is_connected(b));
    }

    #[test]
    fn test_append_rejects_cycles() {
        let mut tree = DomTree::new();
        let outer = tree.create_element("span");
        let inner = tree.create_element("span");
        tree.append_child(outer, inner).unwrap();
        assert_eq!(
            tree.append_child(inner, outer),
            Err(DomError::HierarchyRequest { parent: inner, child: outer })
        );
    }

    #[test]
    fn test_append_moves_node() {
        let mut tree = DomTree::new();
        let first = tree.create_element("div");
        let second = tree.create_element("div");
        let text = tree.create_text("x");
        tree.append_child(first, text).unwrap();
        tree.append_child(second, text).unwrap();
        assert!(tree.children(first).is_empty());
        assert_eq!(tree.children(second), &[text]);
    }

    #[test]
    fn test_clear_children_detaches() {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        tree.append_child(tree.root(), div).unwrap();
        let text = tree.create_text("gone");
        tree.append_child(div, text).unwrap();

        assert_eq!(tree.clear_children(div), vec![text]);
        assert!(!tree.is_connected(text));
        assert_eq!(tree.text_content(div), "");
    }

    #[test]
    fn test_set_text_content() {
        let mut tree = DomTree::new();
        let span = tree.create_element("span");
        let child = tree.create_element("span");
        tree.append_child(span, child).unwrap();
        tree.set_text_content(span, "abc").unwrap();
        assert_eq!(tree.children(span).len(), 1);
        assert_eq!(tree.text_content(span), "abc");
        tree.set_text_content(span, "").unwrap();
        assert!(tree.children(span).is_empty());
    }

    #[test]
    fn test_set_text_content_reuses_text_child() {
        let mut tree = DomTree::new();
        let span = tree.create_element("span");
        tree.set_text_content(span, "ERROR").unwrap();
        let text = tree.children(span)[0];
        let allocated = tree.len();

        for pass in ["ERR0R", "xRROR", "ERROR"] {
            tree.set_text_content(span, pass).unwrap();
            assert_eq!(tree.children(span), &[text]);
            assert_eq!(tree.text_content(span), pass);
        }
        assert_eq!(tree.len(), allocated);
    }

    #[test]
    fn test_elements_by_class_excludes_root() {
        let mut tree = DomTree::new();
        let host = tree.create_element("div");
        tree.element_mut(host).unwrap().classes.add("glitch");
        let inner = tree.create_element("span");
        tree.element_mut(inner).unwrap().classes.add("glitch");
        tree.append_child(host, inner).unwrap();
        assert_eq!(tree.get_elements_by_class_name(host, "glitch"), vec![inner]);
    }
}
