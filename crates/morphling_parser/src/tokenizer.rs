//! Flat tokenizer for HTML with embedded mustaches.
//!
//! In [`Tokenizer::template`] mode, `{{...}}` is recognized in text, inside tags
//! (element modifiers) and inside attribute values.
//! In [`Tokenizer::html`] mode, mustaches are plain text.
//! HTML comments are opaque in both modes.

use std::borrow::Cow;

use nom::{
    bytes::complete::{tag, take_until},
    character::complete::char,
    sequence::{delimited, preceded, terminated},
    IResult,
};
use swc_core::common::Span;

use crate::{
    error::{byte_span, SyntaxError, SyntaxErrorKind},
    html_utils::{attribute_name, decode_entities, html_name, starts_tag_name, trim_space},
};

#[derive(Debug, Clone, PartialEq)]
pub enum Token<'s> {
    StartTag(StartTag<'s>),
    EndTag { name: &'s str, span: Span },
    Chars(Cow<'s, str>, Span),
    Comment(&'s str, Span),
    Mustache(RawMustache<'s>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StartTag<'s> {
    pub name: &'s str,
    pub attributes: Vec<RawAttribute<'s>>,
    /// Mustaches placed between attributes, e.g. `<div {{action "save"}}>`
    pub modifiers: Vec<RawMustache<'s>>,
    /// Explicit `/>`
    pub self_closing: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawAttribute<'s> {
    pub name: &'s str,
    pub value: RawAttributeValue<'s>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RawAttributeValue<'s> {
    /// `<input disabled>`
    Empty,
    /// `attr="..."` or `attr='...'`
    Quoted(Vec<AttributeChunk<'s>>),
    /// `attr=value` or `attr={{value}}`
    Unquoted(Vec<AttributeChunk<'s>>),
}

impl RawAttributeValue<'_> {
    /// Static text of the value, mustache chunks left out
    pub fn text(&self) -> String {
        match self {
            RawAttributeValue::Empty => String::new(),
            RawAttributeValue::Quoted(chunks) | RawAttributeValue::Unquoted(chunks) => chunks
                .iter()
                .filter_map(|chunk| match chunk {
                    AttributeChunk::Text(text) => Some(text.as_ref()),
                    AttributeChunk::Mustache(_) => None,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeChunk<'s> {
    Text(Cow<'s, str>),
    Mustache(RawMustache<'s>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MustacheKind {
    /// `{{x}}`
    Escaped,
    /// `{{{x}}}`
    Unescaped,
    /// `{{#x}}`
    Open,
    /// `{{else}}`
    Else,
    /// `{{/x}}`
    Close,
    /// `{{! x }}` or `{{!-- x --}}`
    Comment,
}

/// A mustache with its delimiters (and the `#`, `/`, `else` markers) stripped
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawMustache<'s> {
    pub kind: MustacheKind,
    pub content: &'s str,
    pub span: Span,
}

pub struct Tokenizer<'s> {
    source: &'s str,
    input: &'s str,
    mustaches: bool,
}

impl<'s> Tokenizer<'s> {
    /// Tokenizer which recognizes mustaches
    pub fn template(source: &'s str) -> Self {
        Tokenizer {
            source,
            input: source,
            mustaches: true,
        }
    }

    /// Tokenizer for plain HTML
    pub fn html(source: &'s str) -> Self {
        Tokenizer {
            source,
            input: source,
            mustaches: false,
        }
    }

    /// Collects all the tokens at once
    pub fn tokenize(mut self) -> Result<Vec<Token<'s>>, SyntaxError> {
        let mut out = Vec::new();
        while let Some(token) = self.next_token()? {
            out.push(token);
        }
        Ok(out)
    }

    #[inline]
    fn offset(&self, rest: &str) -> usize {
        self.source.len() - rest.len()
    }

    #[inline]
    fn error_until_end(&self, kind: SyntaxErrorKind, lo: usize) -> SyntaxError {
        SyntaxError::new(kind, byte_span(lo, self.source.len()))
    }

    pub fn next_token(&mut self) -> Result<Option<Token<'s>>, SyntaxError> {
        let input = self.input;
        if input.is_empty() {
            return Ok(None);
        }

        let lo = self.offset(input);

        if input.starts_with("<!--") {
            let Ok((rest, comment)) = parse_comment(input) else {
                return Err(self.error_until_end(SyntaxErrorKind::UnterminatedComment, lo));
            };
            self.input = rest;
            return Ok(Some(Token::Comment(
                comment,
                byte_span(lo, self.offset(rest)),
            )));
        }

        if let Some(after_lt) = input.strip_prefix("</") {
            if starts_tag_name(after_lt) {
                let Ok((rest, name)) = parse_end_tag(input) else {
                    return Err(self.error_until_end(SyntaxErrorKind::UnterminatedTag, lo));
                };
                self.input = rest;
                return Ok(Some(Token::EndTag {
                    name,
                    span: byte_span(lo, self.offset(rest)),
                }));
            }
        }

        if input.starts_with('<') && starts_tag_name(&input[1..]) {
            return self.start_tag(lo).map(|tag| Some(Token::StartTag(tag)));
        }

        if self.mustaches && input.starts_with("{{") {
            let (rest, mustache) = scan_mustache(self.source, input)?;
            self.input = rest;
            return Ok(Some(Token::Mustache(mustache)));
        }

        let len = self.text_len(input);
        let (text, rest) = input.split_at(len);
        self.input = rest;
        Ok(Some(Token::Chars(decode_entities(text), byte_span(lo, lo + len))))
    }

    /// Length of the text run at the start of `input`.
    /// The first char is always consumed: it is known not to start anything else.
    fn text_len(&self, input: &str) -> usize {
        let mut chars = input.char_indices();
        if chars.next().is_none() {
            return 0;
        }

        for (idx, ch) in chars {
            let rest = &input[idx..];
            let is_boundary = match ch {
                '<' => {
                    let after_lt = &rest[1..];
                    starts_tag_name(after_lt)
                        || after_lt.starts_with("!--")
                        || after_lt.strip_prefix('/').map_or(false, starts_tag_name)
                }
                '{' => self.mustaches && rest.starts_with("{{"),
                _ => false,
            };

            if is_boundary {
                return idx;
            }
        }

        input.len()
    }

    fn start_tag(&mut self, lo: usize) -> Result<StartTag<'s>, SyntaxError> {
        let unterminated = |this: &Self| this.error_until_end(SyntaxErrorKind::UnterminatedTag, lo);

        let Ok((mut rest, name)) = preceded(char('<'), html_name)(self.input) else {
            return Err(unterminated(self));
        };

        let mut attributes = Vec::new();
        let mut modifiers = Vec::new();
        let self_closing;

        loop {
            rest = trim_space(rest);

            if rest.is_empty() {
                return Err(unterminated(self));
            }
            if let Some(after) = rest.strip_prefix("/>") {
                rest = after;
                self_closing = true;
                break;
            }
            if let Some(after) = rest.strip_prefix('>') {
                rest = after;
                self_closing = false;
                break;
            }
            if let Some(after) = rest.strip_prefix('/') {
                // Stray slash, e.g. `<a / href="">`
                rest = after;
                continue;
            }
            if self.mustaches && rest.starts_with("{{") {
                let (after, mustache) = scan_mustache(self.source, rest)?;
                modifiers.push(mustache);
                rest = after;
                continue;
            }

            let attr_lo = self.offset(rest);
            let Ok((after_name, attr_name)) = attribute_name(rest) else {
                return Err(SyntaxError::new(
                    SyntaxErrorKind::InvalidAttribute {
                        name: rest.chars().take(1).collect(),
                        reason: "unexpected character in tag".to_string(),
                    },
                    byte_span(attr_lo, attr_lo + 1),
                ));
            };
            rest = after_name;

            let value = match trim_space(rest).strip_prefix('=') {
                Some(after_eq) => {
                    let (after_value, value) = self.attribute_value(trim_space(after_eq), lo)?;
                    rest = after_value;
                    value
                }
                None => RawAttributeValue::Empty,
            };

            attributes.push(RawAttribute {
                name: attr_name,
                value,
                span: byte_span(attr_lo, self.offset(rest)),
            });
        }

        self.input = rest;

        Ok(StartTag {
            name,
            attributes,
            modifiers,
            self_closing,
            span: byte_span(lo, self.offset(rest)),
        })
    }

    fn attribute_value(
        &self,
        input: &'s str,
        tag_lo: usize,
    ) -> Result<(&'s str, RawAttributeValue<'s>), SyntaxError> {
        let quote = match input.chars().next() {
            Some(q @ ('"' | '\'')) => Some(q),
            _ => None,
        };

        let mut rest = match quote {
            Some(_) => &input[1..],
            None => input,
        };
        let mut chunks = Vec::new();
        let mut text_start = rest;

        macro_rules! flush_text {
            () => {
                let text_len = text_start.len() - rest.len();
                if text_len > 0 {
                    chunks.push(AttributeChunk::Text(decode_entities(&text_start[..text_len])));
                }
            };
        }

        loop {
            let Some(ch) = rest.chars().next() else {
                if quote.is_some() {
                    return Err(self.error_until_end(SyntaxErrorKind::UnterminatedTag, tag_lo));
                }
                flush_text!();
                break;
            };

            if self.mustaches && rest.starts_with("{{") {
                flush_text!();
                let (after, mustache) = scan_mustache(self.source, rest)?;
                chunks.push(AttributeChunk::Mustache(mustache));
                rest = after;
                text_start = rest;
                continue;
            }

            match quote {
                Some(q) if ch == q => {
                    flush_text!();
                    rest = &rest[ch.len_utf8()..];
                    break;
                }
                None if crate::html_utils::is_space_char(ch) || ch == '>' => {
                    flush_text!();
                    break;
                }
                _ => rest = &rest[ch.len_utf8()..],
            }
        }

        let value = match quote {
            Some(_) => RawAttributeValue::Quoted(chunks),
            None => RawAttributeValue::Unquoted(chunks),
        };

        Ok((rest, value))
    }
}

fn parse_comment(input: &str) -> IResult<&str, &str> {
    delimited(tag("<!--"), take_until("-->"), tag("-->"))(input)
}

fn parse_end_tag(input: &str) -> IResult<&str, &str> {
    delimited(
        tag("</"),
        html_name,
        terminated(nom::character::complete::multispace0, char('>')),
    )(input)
}

/// Reads a mustache at the start of `input`.
/// Closing delimiters inside string literals do not end the mustache.
pub(crate) fn scan_mustache<'s>(
    source: &'s str,
    input: &'s str,
) -> Result<(&'s str, RawMustache<'s>), SyntaxError> {
    let lo = source.len() - input.len();

    let (open_len, close, kind) = if input.starts_with("{{{") {
        (3, "}}}", MustacheKind::Unescaped)
    } else if input.starts_with("{{!--") {
        (5, "--}}", MustacheKind::Comment)
    } else if input.starts_with("{{!") {
        (3, "}}", MustacheKind::Comment)
    } else {
        (2, "}}", MustacheKind::Escaped)
    };

    let body = &input[open_len..];
    let end = match kind {
        MustacheKind::Comment => body.find(close),
        _ => find_close(body, close),
    };
    let Some(end) = end else {
        return Err(SyntaxError::new(
            SyntaxErrorKind::UnterminatedMustache,
            byte_span(lo, source.len()),
        ));
    };

    let content = &body[..end];
    let rest = &body[end + close.len()..];
    let span = byte_span(lo, source.len() - rest.len());

    let (kind, content) = match kind {
        MustacheKind::Escaped => classify_mustache(content),
        kind => (kind, content),
    };

    Ok((
        rest,
        RawMustache {
            kind,
            content,
            span,
        },
    ))
}

fn classify_mustache(content: &str) -> (MustacheKind, &str) {
    let trimmed = content.trim();

    if let Some(open) = trimmed.strip_prefix('#') {
        return (MustacheKind::Open, open);
    }
    if let Some(close) = trimmed.strip_prefix('/') {
        return (MustacheKind::Close, close.trim());
    }
    if trimmed == "else" {
        return (MustacheKind::Else, "");
    }
    if let Some(chained) = trimmed.strip_prefix("else ") {
        return (MustacheKind::Else, chained.trim());
    }

    (MustacheKind::Escaped, content)
}

fn find_close(body: &str, close: &str) -> Option<usize> {
    let mut in_quote: Option<char> = None;

    for (idx, ch) in body.char_indices() {
        match in_quote {
            Some(q) if ch == q => in_quote = None,
            Some(_) => {}
            None if ch == '"' || ch == '\'' => in_quote = Some(ch),
            None if body[idx..].starts_with(close) => return Some(idx),
            None => {}
        }
    }

    None
}
