mod error;
mod expression;
mod html_utils;
mod normalize;
mod template;
pub mod tokenizer;

pub use error::{byte_span, SyntaxError, SyntaxErrorKind};
pub use expression::{parse_mustache_expression, MustacheExpression};
pub use html_utils::{decode_entities, escape_attribute, escape_text};
pub use normalize::{equal_html, normalize_html, NormalizedToken};
pub use template::parse_template;
pub use tokenizer::{Token, Tokenizer};
