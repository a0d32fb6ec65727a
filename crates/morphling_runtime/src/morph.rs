//! Morphs are the dynamic content regions of a rendered template.
//!
//! A morph owns the nodes currently inserted right before its anchor
//! and replaces them whenever it is updated with a different value.
//! Morphs are shared (`Rc<RefCell<..>>`) so that helpers can keep them
//! and update them after the initial render.

use std::{cell::RefCell, rc::Rc};

use smallvec::SmallVec;
use tracing::debug;

use crate::{
    dom::{NodeId, NodeKind},
    Environment, Value,
};

pub type MorphHandle = Rc<RefCell<Morph>>;

#[derive(Debug)]
pub struct Morph {
    /// Insertion point, content goes right before it
    anchor: NodeId,
    nodes: SmallVec<[NodeId; 1]>,
    /// Whether strings are inserted as text (`true`) or parsed as HTML
    pub escaped: bool,
    /// Element used as the parsing context for unescaped content
    pub contextual_element: Option<NodeId>,
    value: Option<Value>,
    rendered_escaped: bool,
}

impl Morph {
    pub fn new(anchor: NodeId, escaped: bool, contextual_element: Option<NodeId>) -> Self {
        Morph {
            anchor,
            nodes: SmallVec::new(),
            escaped,
            contextual_element,
            value: None,
            rendered_escaped: escaped,
        }
    }

    #[inline]
    pub fn into_handle(self) -> MorphHandle {
        Rc::new(RefCell::new(self))
    }

    #[inline]
    pub fn anchor(&self) -> NodeId {
        self.anchor
    }

    /// Nodes currently owned by the morph
    #[inline]
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Last value rendered, `None` before the first update or while detached
    #[inline]
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Replaces the content with `value`. Setting the same value twice is a no-op.
    pub fn update(&mut self, env: &Environment, value: Value) {
        if self.value.as_ref() == Some(&value) && self.rendered_escaped == self.escaped {
            return;
        }

        let mut dom = env.dom();
        let Some(parent) = dom.parent(self.anchor) else {
            // Nothing is inserted, so the next update must not be skipped
            debug!("Morph anchor is detached, skipping the update");
            self.value = None;
            return;
        };

        // A text node can be reused for escaped scalars
        if self.escaped && !value.is_nullish() && !matches!(value, Value::Node(_)) {
            if let [node] = self.nodes[..] {
                if dom.kind(node) == NodeKind::Text {
                    dom.set_text(node, &value.to_str());
                    self.value = Some(value);
                    self.rendered_escaped = true;
                    return;
                }
            }
        }

        for node in self.nodes.drain(..) {
            dom.remove_child(parent, node);
        }

        let inserted = match value {
            Value::Undefined | Value::Null => None,
            Value::Node(node) => Some(node),
            ref scalar if self.escaped => Some(dom.create_text(&scalar.to_str())),
            ref scalar => Some(dom.parse_html(&scalar.to_str(), self.contextual_element)),
        };

        if let Some(node) = inserted {
            if dom.kind(node) == NodeKind::Fragment {
                self.nodes.extend(dom.child_nodes(node));
            } else {
                self.nodes.push(node);
            }
            dom.insert_before(parent, node, Some(self.anchor));
        }

        self.value = Some(value);
        self.rendered_escaped = self.escaped;
    }

    /// Removes all the content
    pub fn clear(&mut self, env: &Environment) {
        self.update(env, Value::Null);
    }
}
