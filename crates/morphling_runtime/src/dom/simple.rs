use morphling_core::{children_namespace, element_namespace, is_void_tag, Namespace};
use morphling_parser::{escape_attribute, escape_text, Token, Tokenizer};
use smallvec::SmallVec;
use tracing::warn;

use super::{children_namespace_of, DomHelper, NodeId, NodeKind};

/// In-memory DOM. Nodes live in an arena and are never freed,
/// a detached node simply has no parent.
///
/// `NodeId`s are plain indices which callers may keep (e.g. a helper
/// returning the same node on every render), so removed slots cannot be
/// handed out again. The arena therefore grows with every created node:
/// each morph update which cannot reuse its text node allocates new ones.
/// Long-lived environments with many such updates should start over with a
/// fresh `SimpleDom`.
#[derive(Debug, Default)]
pub struct SimpleDom {
    nodes: Vec<SimpleNode>,
}

#[derive(Debug)]
struct SimpleNode {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

#[derive(Debug)]
enum NodeData {
    Element {
        tag_name: String,
        namespace: Namespace,
        attributes: Vec<(String, String)>,
    },
    Text(String),
    Comment(String),
    Fragment,
}

impl SimpleDom {
    pub fn new() -> Self {
        SimpleDom::default()
    }

    /// Number of nodes ever created, attached or not
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(SimpleNode {
            parent: None,
            children: Vec::new(),
            data,
        });
        id
    }

    #[inline]
    fn node(&self, id: NodeId) -> &SimpleNode {
        &self.nodes[id.0 as usize]
    }

    #[inline]
    fn node_mut(&mut self, id: NodeId) -> &mut SimpleNode {
        &mut self.nodes[id.0 as usize]
    }

    fn attributes_mut(&mut self, element: NodeId) -> Option<&mut Vec<(String, String)>> {
        match self.node_mut(element).data {
            NodeData::Element {
                ref mut attributes, ..
            } => Some(attributes),
            _ => None,
        }
    }

    fn serialize_into(&self, id: NodeId, out: &mut String) {
        let node = self.node(id);

        match node.data {
            NodeData::Text(ref text) => out.push_str(&escape_text(text)),
            NodeData::Comment(ref text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            NodeData::Fragment => {
                for child in node.children.iter() {
                    self.serialize_into(*child, out);
                }
            }
            NodeData::Element {
                ref tag_name,
                namespace,
                ref attributes,
            } => {
                out.push('<');
                out.push_str(tag_name);
                for (name, value) in attributes.iter() {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape_attribute(value));
                    out.push('"');
                }
                out.push('>');

                if namespace == Namespace::Xhtml && is_void_tag(tag_name) {
                    return;
                }

                for child in node.children.iter() {
                    self.serialize_into(*child, out);
                }

                out.push_str("</");
                out.push_str(tag_name);
                out.push('>');
            }
        }
    }

    /// Builds the parsed tokens into `fragment`.
    /// End tags close the nearest matching open element, unmatched ones are ignored.
    fn build_tokens(&mut self, tokens: Vec<Token>, fragment: NodeId, root_namespace: Namespace) {
        let mut stack: SmallVec<[(NodeId, Namespace); 8]> = SmallVec::new();
        stack.push((fragment, root_namespace));

        for token in tokens {
            let (parent, parent_namespace) = stack[stack.len() - 1];

            match token {
                Token::StartTag(start_tag) => {
                    let namespace = element_namespace(start_tag.name, parent_namespace);
                    let element = self.create_element(start_tag.name, namespace);
                    for attribute in start_tag.attributes {
                        self.set_attribute(element, attribute.name, &attribute.value.text());
                    }
                    self.append_child(parent, element);

                    let is_void = namespace == Namespace::Xhtml && is_void_tag(start_tag.name);
                    if !is_void && !start_tag.self_closing {
                        stack.push((element, children_namespace(start_tag.name, namespace)));
                    }
                }
                Token::EndTag { name, .. } => {
                    let open = stack
                        .iter()
                        .skip(1)
                        .rposition(|(node, _)| self.tag_name(*node) == Some(name));
                    if let Some(idx) = open {
                        // `skip(1)` shifted the index
                        stack.truncate(idx + 1);
                    }
                }
                Token::Chars(text, _) => {
                    let text = self.create_text(&text);
                    self.append_child(parent, text);
                }
                Token::Comment(comment, _) => {
                    let comment = self.create_comment(comment);
                    self.append_child(parent, comment);
                }
                Token::Mustache(_) => {}
            }
        }
    }
}

impl DomHelper for SimpleDom {
    fn create_element(&mut self, tag_name: &str, namespace: Namespace) -> NodeId {
        self.push(NodeData::Element {
            tag_name: tag_name.to_owned(),
            namespace,
            attributes: Vec::new(),
        })
    }

    fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Text(text.to_owned()))
    }

    fn create_comment(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Comment(text.to_owned()))
    }

    fn create_fragment(&mut self) -> NodeId {
        self.push(NodeData::Fragment)
    }

    fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) {
        let Some(attributes) = self.attributes_mut(element) else {
            return;
        };

        match attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => {
                existing.clear();
                existing.push_str(value);
            }
            None => attributes.push((name.to_owned(), value.to_owned())),
        }
    }

    fn remove_attribute(&mut self, element: NodeId, name: &str) {
        if let Some(attributes) = self.attributes_mut(element) {
            attributes.retain(|(n, _)| n != name);
        }
    }

    fn get_attribute(&self, element: NodeId, name: &str) -> Option<&str> {
        match self.node(element).data {
            NodeData::Element { ref attributes, .. } => attributes
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }

    fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        let moved: Vec<NodeId> = if self.kind(child) == NodeKind::Fragment {
            std::mem::take(&mut self.node_mut(child).children)
        } else {
            self.detach(child);
            vec![child]
        };

        let position = reference
            .and_then(|reference| {
                self.node(parent)
                    .children
                    .iter()
                    .position(|c| *c == reference)
            })
            .unwrap_or(self.node(parent).children.len());

        for node in moved.iter() {
            self.node_mut(*node).parent = Some(parent);
        }

        self.node_mut(parent)
            .children
            .splice(position..position, moved);
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        self.node_mut(parent).children.retain(|c| *c != child);
        let node = self.node_mut(child);
        if node.parent == Some(parent) {
            node.parent = None;
        }
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).parent
    }

    fn child_nodes(&self, node: NodeId) -> Vec<NodeId> {
        self.node(node).children.clone()
    }

    fn kind(&self, node: NodeId) -> NodeKind {
        match self.node(node).data {
            NodeData::Element { .. } => NodeKind::Element,
            NodeData::Text(_) => NodeKind::Text,
            NodeData::Comment(_) => NodeKind::Comment,
            NodeData::Fragment => NodeKind::Fragment,
        }
    }

    fn tag_name(&self, node: NodeId) -> Option<&str> {
        match self.node(node).data {
            NodeData::Element { ref tag_name, .. } => Some(tag_name),
            _ => None,
        }
    }

    fn namespace(&self, node: NodeId) -> Option<Namespace> {
        match self.node(node).data {
            NodeData::Element { namespace, .. } => Some(namespace),
            _ => None,
        }
    }

    fn text(&self, node: NodeId) -> Option<&str> {
        match self.node(node).data {
            NodeData::Text(ref text) | NodeData::Comment(ref text) => Some(text),
            _ => None,
        }
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        if let NodeData::Text(ref mut existing) | NodeData::Comment(ref mut existing) =
            self.node_mut(node).data
        {
            existing.clear();
            existing.push_str(text);
        }
    }

    fn parse_html(&mut self, html: &str, contextual_element: Option<NodeId>) -> NodeId {
        let fragment = self.create_fragment();
        let root_namespace = children_namespace_of(&*self, contextual_element);

        match Tokenizer::html(html).tokenize() {
            Ok(tokens) => self.build_tokens(tokens, fragment, root_namespace),
            Err(e) => {
                warn!(error = ?e.kind, "Malformed HTML inserted as text");
                let text = self.create_text(html);
                self.append_child(fragment, text);
            }
        }

        fragment
    }

    fn serialize(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.serialize_into(node, &mut out);
        out
    }
}
