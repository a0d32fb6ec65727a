use std::borrow::Cow;

use nom::{
    bytes::complete::{take_till1, take_while},
    character::complete::satisfy,
    combinator::recognize,
    sequence::pair,
    IResult,
};
use phf::phf_map;

static NAMED_ENTITIES: phf::Map<&'static str, char> = phf_map! {
    "lt" => '<',
    "gt" => '>',
    "amp" => '&',
    "quot" => '"',
    "apos" => '\'',
    "nbsp" => '\u{00A0}',
};

/**
 * U+0020 SPACE, U+0009 CHARACTER TABULATION (tab), U+000A LINE FEED (LF), U+000C FORM FEED (FF), and U+000D CARRIAGE RETURN (CR)
 * https://www.w3.org/TR/2011/WD-html5-20110525/common-microsyntaxes.html#space-character
 */
#[inline]
pub fn is_space_char(x: char) -> bool {
    x == ' ' || x == '\t' || x == '\n' || x == '\r' || x == '\u{000C}'
}

#[inline]
pub fn trim_space(input: &str) -> &str {
    input.trim_start_matches(is_space_char)
}

#[inline]
fn is_tag_name_char(x: char) -> bool {
    x.is_alphanumeric() || x == '-' || x == '_' || x == ':' || x == '.'
}

/// Whether a tag name starts at the beginning of `input`
#[inline]
pub fn starts_tag_name(input: &str) -> bool {
    input.chars().next().map_or(false, |c| c.is_ascii_alphabetic())
}

/// Tag names start with an ASCII letter. Case is preserved.
pub fn html_name(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c: char| c.is_ascii_alphabetic()),
        take_while(is_tag_name_char),
    ))(input)
}

pub fn attribute_name(input: &str) -> IResult<&str, &str> {
    take_till1(|c: char| {
        is_space_char(c) || matches!(c, '=' | '>' | '/' | '"' | '\'' | '<' | '{')
    })(input)
}

/// Decodes character references. Unknown references are kept as written.
pub fn decode_entities(raw: &str) -> Cow<'_, str> {
    if !raw.contains('&') {
        return Cow::Borrowed(raw);
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(amp_idx) = rest.find('&') {
        out.push_str(&rest[..amp_idx]);
        rest = &rest[amp_idx..];

        let decoded = rest[1..]
            .find(';')
            .filter(|semi_idx| *semi_idx > 0 && *semi_idx <= 10)
            .and_then(|semi_idx| {
                let reference = &rest[1..semi_idx + 1];
                decode_reference(reference).map(|ch| (ch, semi_idx + 2))
            });

        match decoded {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &rest[consumed..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    Cow::Owned(out)
}

fn decode_reference(reference: &str) -> Option<char> {
    if let Some(numeric) = reference.strip_prefix('#') {
        let code = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }

    NAMED_ENTITIES.get(reference).copied()
}

/// Escapes text content for serialization
pub fn escape_text(raw: &str) -> Cow<'_, str> {
    escape(raw, false)
}

/// Escapes a double-quoted attribute value for serialization
pub fn escape_attribute(raw: &str) -> Cow<'_, str> {
    escape(raw, true)
}

fn escape(raw: &str, is_attribute: bool) -> Cow<'_, str> {
    let needs_escape = |c: char| match c {
        '&' | '\u{00A0}' => true,
        '<' | '>' => !is_attribute,
        '"' => is_attribute,
        _ => false,
    };

    if !raw.contains(needs_escape) {
        return Cow::Borrowed(raw);
    }

    let mut out = String::with_capacity(raw.len() + 8);
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{00A0}' => out.push_str("&nbsp;"),
            '<' if !is_attribute => out.push_str("&lt;"),
            '>' if !is_attribute => out.push_str("&gt;"),
            '"' if is_attribute => out.push_str("&quot;"),
            c => out.push(c),
        }
    }

    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_decodes_entities() {
        assert_eq!("<b>", decode_entities("&lt;b&gt;"));
        assert_eq!("a & b", decode_entities("a &amp; b"));
        assert_eq!("'A'", decode_entities("&#39;&#x41;&apos;"));
        assert_eq!("&unknown; & done", decode_entities("&unknown; & done"));
        assert!(matches!(decode_entities("plain"), Cow::Borrowed("plain")));
    }

    #[test]
    fn it_escapes_for_serialization() {
        assert_eq!("&lt;strong&gt;hi&lt;/strong&gt;", escape_text("<strong>hi</strong>"));
        assert_eq!("say &quot;hi&quot; <now>", escape_attribute("say \"hi\" <now>"));
    }

    #[test]
    fn it_reads_names() {
        assert_eq!(Ok(("", "linearGradient")), html_name("linearGradient"));
        assert_eq!(Ok((">", "x-bar")), html_name("x-bar>"));
        assert!(html_name("1abc").is_err());
        assert_eq!(Ok(("=\"x\"", "data-foo")), attribute_name("data-foo=\"x\""));
    }
}
