use smallvec::SmallVec;
use strum_macros::{AsRefStr, Display, EnumString, IntoStaticStr};
use swc_core::common::{Span, DUMMY_SP};

use crate::Namespace;

/// A template, or the body of a block, is a `Program`:
/// an ordered list of nodes plus the block parameters introduced at this scope.
///
/// Block parameters are only non-empty for block bodies declared with
/// `{{#helper as |first second|}}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub children: Vec<Node>,
    pub block_params: SmallVec<[String; 2]>,
    pub span: Span,
}

impl Default for Program {
    fn default() -> Self {
        Program {
            children: Vec::new(),
            block_params: SmallVec::new(),
            span: DUMMY_SP,
        }
    }
}

/// A Node represents a part of the Abstract Syntax Tree (AST).
/// There are several possible Node types:
///
/// ### `Element`
/// A plain HTML (or SVG/MathML) tag with attributes, element modifiers and children.
/// Void elements and explicitly self-closed tags never have children.
///
/// ### `Text`
/// Static text, with entities decoded. Whitespace is kept verbatim.
///
/// ### `Comment`
/// An HTML comment `<!-- ... -->`. Its content is opaque,
/// mustaches inside it are never evaluated.
///
/// ### `Mustache`
/// `{{path param key=value}}` or the unescaped form `{{{path}}}`.
///
/// ### `Block`
/// `{{#helper}}...{{else}}...{{/helper}}`, a helper controlling the rendering of its body.
///
/// ### `Component`
/// A custom tag (containing a dash) which is a helper invocation candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(ElementNode),
    Text(String, Span),
    Comment(String, Span),
    Mustache(MustacheNode),
    Block(BlockNode),
    Component(ComponentNode),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementNode {
    /// Tag name as written in the source (case preserved)
    pub tag_name: String,
    pub namespace: Namespace,
    pub attributes: Vec<AttributeNode>,
    /// Node helpers, i.e. `<div {{modifier arg}}>`
    pub modifiers: Vec<SubExpression>,
    pub children: Vec<Node>,
    pub self_closing: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeNode {
    pub name: String,
    pub value: AttributeValue,
    pub span: Span,
}

/// Attribute value is either fully static, a single unquoted mustache,
/// or a concatenation of static and dynamic parts (any quoted value with mustaches).
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Static(String),
    Mustache(MustacheNode),
    Concat(Vec<AttributePart>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributePart {
    Text(String),
    Mustache(MustacheNode),
}

impl AttributeValue {
    /// Whether the value needs any work at render time
    pub fn is_dynamic(&self) -> bool {
        !matches!(self, AttributeValue::Static(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MustacheNode {
    pub call: SubExpression,
    /// `true` for `{{x}}`, `false` for `{{{x}}}`
    pub escaped: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockNode {
    pub call: SubExpression,
    pub program: Program,
    pub inverse: Option<Program>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComponentNode {
    pub tag_name: String,
    pub attributes: Vec<AttributeNode>,
    pub program: Program,
    pub span: Span,
}

/// A call: a helper name or path, followed by positional params and a hash.
///
/// When the callee itself is a literal (`{{"text"}}`, `{{42}}`),
/// `literal` holds it and `path` is its string form.
#[derive(Debug, Clone, PartialEq)]
pub struct SubExpression {
    pub path: String,
    pub literal: Option<Param>,
    pub params: SmallVec<[Param; 2]>,
    pub hash: Vec<HashPair>,
}

impl SubExpression {
    pub fn new(path: impl Into<String>) -> Self {
        SubExpression {
            path: path.into(),
            literal: None,
            params: SmallVec::new(),
            hash: Vec::new(),
        }
    }

    /// A bare path: no params, no hash, not a literal
    pub fn is_simple_path(&self) -> bool {
        self.literal.is_none() && self.params.is_empty() && self.hash.is_empty()
    }

    pub fn param_types(&self) -> SmallVec<[ParamType; 4]> {
        self.params.iter().map(Param::param_type).collect()
    }

    pub fn hash_types(&self) -> Vec<(String, ParamType)> {
        self.hash
            .iter()
            .map(|pair| (pair.key.to_owned(), pair.value.param_type()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HashPair {
    pub key: String,
    pub value: Param,
}

/// A param as written in the source, tagged with its syntactic type
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Id(String),
    String(String),
    Number(f64),
    Boolean(bool),
    SubExpr(Box<SubExpression>),
}

impl Param {
    pub fn param_type(&self) -> ParamType {
        match self {
            Param::Id(_) => ParamType::Id,
            Param::String(_) => ParamType::String,
            Param::Number(_) => ParamType::Number,
            Param::Boolean(_) => ParamType::Boolean,
            Param::SubExpr(_) => ParamType::SubExpr,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, EnumString, IntoStaticStr,
)]
pub enum ParamType {
    #[strum(serialize = "id")]
    Id,
    #[strum(serialize = "string")]
    String,
    #[strum(serialize = "number")]
    Number,
    #[strum(serialize = "boolean")]
    Boolean,
    #[strum(serialize = "sexpr")]
    SubExpr,
}

impl ParamType {
    #[inline]
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Literal params are handed to helpers unevaluated
    #[inline]
    pub fn is_literal(self) -> bool {
        matches!(self, ParamType::String | ParamType::Number | ParamType::Boolean)
    }
}
