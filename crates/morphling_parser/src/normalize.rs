//! Structural comparison of HTML strings, independent of attribute order
//! and of how text happens to be split.

use morphling_core::is_void_tag;

use crate::{
    error::SyntaxError,
    tokenizer::{Token, Tokenizer},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedToken {
    StartTag {
        name: String,
        /// Sorted by name
        attributes: Vec<(String, String)>,
    },
    EndTag(String),
    Chars(String),
    Comment(String),
}

/// Tokenizes plain HTML into a normalized token list:
/// attributes are sorted, adjacent text is merged and
/// `<tag />` of a non-void element yields a start and an end tag.
pub fn normalize_html(html: &str) -> Result<Vec<NormalizedToken>, SyntaxError> {
    let mut out: Vec<NormalizedToken> = Vec::new();
    let mut tokenizer = Tokenizer::html(html);

    while let Some(token) = tokenizer.next_token()? {
        match token {
            Token::StartTag(start_tag) => {
                let mut attributes: Vec<(String, String)> = start_tag
                    .attributes
                    .into_iter()
                    .map(|attr| (attr.name.to_owned(), attr.value.text()))
                    .collect();
                attributes.sort();

                out.push(NormalizedToken::StartTag {
                    name: start_tag.name.to_owned(),
                    attributes,
                });

                if start_tag.self_closing && !is_void_tag(start_tag.name) {
                    out.push(NormalizedToken::EndTag(start_tag.name.to_owned()));
                }
            }
            Token::EndTag { name, .. } => out.push(NormalizedToken::EndTag(name.to_owned())),
            Token::Chars(text, _) => match out.last_mut() {
                Some(NormalizedToken::Chars(prev)) => prev.push_str(&text),
                _ => out.push(NormalizedToken::Chars(text.into_owned())),
            },
            Token::Comment(comment, _) => out.push(NormalizedToken::Comment(comment.to_owned())),
            // Not produced in HTML mode
            Token::Mustache(_) => {}
        }
    }

    Ok(out)
}

/// Whether two HTML strings are structurally equal.
/// Malformed input is never equal to anything.
pub fn equal_html(a: &str, b: &str) -> bool {
    match (normalize_html(a), normalize_html(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_ignores_attribute_order() {
        assert!(equal_html(
            "<div id=\"a\" class='b c'>x</div>",
            "<div class=\"b c\" id=a>x</div>"
        ));
        assert!(!equal_html("<div id=\"a\"></div>", "<div id=\"b\"></div>"));
    }

    #[test]
    fn it_expands_self_closing_tags() {
        assert!(equal_html("<div />", "<div></div>"));
        assert!(equal_html("<input />", "<input>"));
    }

    #[test]
    fn it_merges_text() {
        let tokens = normalize_html("a&amp;b<!--c-->").expect("Should normalize");
        assert_eq!(
            vec![
                NormalizedToken::Chars("a&b".to_owned()),
                NormalizedToken::Comment("c".to_owned())
            ],
            tokens
        );
        assert!(!equal_html("&lt;b&gt;", "<b>"));
        assert!(!equal_html("<div>", "<div"));
    }
}
