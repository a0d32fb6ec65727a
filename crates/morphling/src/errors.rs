//! Error definitions for the glue code of `morphling`

use morphling_parser::SyntaxError;
use swc_core::common::{Span, Spanned};

#[derive(Debug, Clone, PartialEq)]
pub enum CompileError {
    /// The template source is malformed.
    ///
    /// This can be due to:
    /// - mismatched or unclosed tags and blocks;
    /// - unterminated comments, tags or mustaches;
    /// - invalid mustache expressions;
    /// - blocks inside attribute values.
    Syntax(SyntaxError),
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileError::Syntax(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompileError::Syntax(e) => Some(e),
        }
    }
}

impl From<SyntaxError> for CompileError {
    fn from(value: SyntaxError) -> Self {
        Self::Syntax(value)
    }
}

impl Spanned for CompileError {
    fn span(&self) -> Span {
        match self {
            CompileError::Syntax(e) => e.span,
        }
    }
}
