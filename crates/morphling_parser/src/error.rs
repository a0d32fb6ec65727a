use strum_macros::IntoStaticStr;
use swc_core::common::{BytePos, Span, Spanned, DUMMY_SP};

/// A malformed template. Always fatal: no nodes are created from a template
/// which failed to parse.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, IntoStaticStr)]
pub enum SyntaxErrorKind {
    /// `<!--` without `-->`
    UnterminatedComment,
    /// `{{` without the matching `}}` (or `}}}`)
    UnterminatedMustache,
    /// A start or end tag which is cut off by the end of input
    UnterminatedTag,
    /// `</b>` closing a `<a>`
    MismatchedEndTag { expected: String, found: String },
    /// `</div>` when nothing is open
    UnexpectedEndTag { found: String },
    /// `</input>`: void elements cannot have end tags
    VoidEndTag { found: String },
    /// An element which is still open when its parent (or the input) ends
    UnclosedElement { tag_name: String },
    /// `{{/b}}` closing a `{{#a}}`
    MismatchedBlockClose { expected: String, found: String },
    /// `{{/a}}` when no block is open
    UnexpectedBlockClose { found: String },
    /// `{{#a}}` without `{{/a}}`
    UnclosedBlock { name: String },
    /// `{{else}}` outside a block, or a second `{{else}}` in the same block
    UnexpectedElse,
    /// Mustache content which is not a valid expression
    InvalidExpression { expression: String, reason: String },
    /// Unsupported construct inside a tag, e.g. a block inside an attribute value
    InvalidAttribute { name: String, reason: String },
}

impl SyntaxError {
    pub fn new(kind: SyntaxErrorKind, span: Span) -> Self {
        SyntaxError { kind, span }
    }

    /// Byte offset of the start of the offending input
    #[inline]
    pub fn offset(&self) -> usize {
        self.span.lo.0 as usize
    }
}

/// Creates a span out of byte offsets into the template source
#[inline]
pub fn byte_span(lo: usize, hi: usize) -> Span {
    Span {
        lo: BytePos(lo as u32),
        hi: BytePos(hi as u32),
        ..DUMMY_SP
    }
}

impl std::fmt::Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnterminatedComment => write!(f, "Unterminated comment, expected `-->`"),
            Self::UnterminatedMustache => write!(f, "Unterminated mustache, expected `}}}}`"),
            Self::UnterminatedTag => write!(f, "Unterminated tag, expected `>`"),
            Self::MismatchedEndTag { expected, found } => {
                write!(f, "Closing tag `{}` did not match last open tag `{}`", found, expected)
            }
            Self::UnexpectedEndTag { found } => {
                write!(f, "Closing tag `{}` without an open tag", found)
            }
            Self::VoidEndTag { found } => {
                write!(f, "Invalid end tag `{}` (void elements cannot have end tags)", found)
            }
            Self::UnclosedElement { tag_name } => {
                write!(f, "Unclosed element `{}`", tag_name)
            }
            Self::MismatchedBlockClose { expected, found } => {
                write!(f, "`{}` doesn't match `{}`", expected, found)
            }
            Self::UnexpectedBlockClose { found } => {
                write!(f, "Closing block `{}` without an open block", found)
            }
            Self::UnclosedBlock { name } => write!(f, "Unclosed block `{}`", name),
            Self::UnexpectedElse => write!(f, "`{{{{else}}}}` outside of a block"),
            Self::InvalidExpression { expression, reason } => {
                write!(f, "Invalid expression `{}`: {}", expression, reason)
            }
            Self::InvalidAttribute { name, reason } => {
                write!(f, "Invalid attribute `{}`: {}", name, reason)
            }
        }
    }
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Syntax error at {}: {}", self.offset(), self.kind)
    }
}

impl std::error::Error for SyntaxError {}

impl Spanned for SyntaxError {
    fn span(&self) -> Span {
        self.span
    }
}
