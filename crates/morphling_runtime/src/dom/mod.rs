//! DOM abstraction used by the runtime.
//!
//! The runtime never touches nodes directly, everything goes through
//! a [`DomHelper`]. [`SimpleDom`] is the in-memory implementation.

use morphling_core::{children_namespace, Namespace};
use strum_macros::{AsRefStr, IntoStaticStr};

mod simple;

pub use simple::SimpleDom;

/// Handle of a node owned by a [`DomHelper`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, IntoStaticStr)]
pub enum NodeKind {
    Element,
    Text,
    Comment,
    Fragment,
}

pub trait DomHelper {
    fn create_element(&mut self, tag_name: &str, namespace: Namespace) -> NodeId;
    fn create_text(&mut self, text: &str) -> NodeId;
    fn create_comment(&mut self, text: &str) -> NodeId;
    fn create_fragment(&mut self) -> NodeId;

    fn set_attribute(&mut self, element: NodeId, name: &str, value: &str);
    fn remove_attribute(&mut self, element: NodeId, name: &str);
    fn get_attribute(&self, element: NodeId, name: &str) -> Option<&str>;

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.insert_before(parent, child, None);
    }

    /// Inserts `child` before `reference` (at the end when `None`).
    /// Inserting a fragment moves its children instead, leaving the fragment empty.
    fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>);
    fn remove_child(&mut self, parent: NodeId, child: NodeId);

    fn parent(&self, node: NodeId) -> Option<NodeId>;
    fn child_nodes(&self, node: NodeId) -> Vec<NodeId>;
    fn kind(&self, node: NodeId) -> NodeKind;
    fn tag_name(&self, node: NodeId) -> Option<&str>;
    fn namespace(&self, node: NodeId) -> Option<Namespace>;

    /// Content of a text or comment node
    fn text(&self, node: NodeId) -> Option<&str>;
    fn set_text(&mut self, node: NodeId, text: &str);

    /// Parses `html` as the content of `contextual_element` into a new fragment
    fn parse_html(&mut self, html: &str, contextual_element: Option<NodeId>) -> NodeId;

    /// Outer HTML of the node. Fragments serialize as their children.
    fn serialize(&self, node: NodeId) -> String;

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.parent(node) {
            self.remove_child(parent, node);
        }
    }
}

/// Namespace children of `element` are created in.
/// Without a contextual element this is XHTML.
pub fn children_namespace_of(dom: &dyn DomHelper, element: Option<NodeId>) -> Namespace {
    let Some(element) = element else {
        return Namespace::Xhtml;
    };

    match (dom.tag_name(element), dom.namespace(element)) {
        (Some(tag_name), Some(namespace)) => children_namespace(tag_name, namespace),
        _ => Namespace::Xhtml,
    }
}
