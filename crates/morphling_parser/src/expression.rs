//! Mustache expressions: `path param* key=value* [as |a b|]`

use morphling_core::{HashPair, Param, SubExpression};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_till, take_while1},
    character::complete::{char, digit1, multispace0, multispace1, satisfy},
    combinator::{map, map_res, not, opt, recognize, value},
    multi::separated_list1,
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};
use smallvec::SmallVec;
use swc_core::common::Span;

use crate::error::{SyntaxError, SyntaxErrorKind};

/// A parsed mustache body
#[derive(Debug, Clone, PartialEq)]
pub struct MustacheExpression {
    pub call: SubExpression,
    /// Names from `as |a b|`, empty when not declared
    pub block_params: SmallVec<[String; 2]>,
}

const POSITIONAL_AFTER_HASH: &str = "positional params must come before hash pairs";

/// Parses the content of a mustache (delimiters and block markers already stripped).
/// `span` is the span of the whole mustache and is used for reporting.
pub fn parse_mustache_expression(
    content: &str,
    span: Span,
) -> Result<MustacheExpression, SyntaxError> {
    let expression = content.trim();
    let invalid = |reason: String| {
        SyntaxError::new(
            SyntaxErrorKind::InvalidExpression {
                expression: expression.to_owned(),
                reason,
            },
            span,
        )
    };

    if expression.is_empty() {
        return Err(invalid("empty expression".to_owned()));
    }

    match mustache_expression(expression) {
        Ok(("", parsed)) => Ok(parsed),
        Ok((rest, _)) => Err(invalid(format!("unexpected `{}`", rest))),
        Err(nom::Err::Failure(e)) if e.code == nom::error::ErrorKind::Verify => {
            Err(invalid(POSITIONAL_AFTER_HASH.to_owned()))
        }
        Err(_) => Err(invalid(
            "expected a path, a literal or a sub-expression".to_owned(),
        )),
    }
}

fn mustache_expression(input: &str) -> IResult<&str, MustacheExpression> {
    let (input, call) = call_expression(input)?;
    let (input, block_params) = opt(preceded(multispace1, block_params))(input)?;
    let (input, _) = multispace0(input)?;

    Ok((
        input,
        MustacheExpression {
            call,
            block_params: block_params
                .map(|names| names.into_iter().map(ToOwned::to_owned).collect())
                .unwrap_or_default(),
        },
    ))
}

/// `callee (param | key=value)*`
fn call_expression(input: &str) -> IResult<&str, SubExpression> {
    let (mut input, callee) = param(input)?;

    let mut expr = match callee {
        Param::Id(path) => SubExpression::new(path),
        Param::SubExpr(_) => {
            // `{{(a b) c}}`: a sub-expression cannot be called
            return Err(nom::Err::Error(nom::error::Error {
                input,
                code: nom::error::ErrorKind::Alt,
            }));
        }
        literal => {
            let mut expr = SubExpression::new(literal_source(&literal));
            expr.literal = Some(literal);
            expr
        }
    };

    loop {
        let Ok((after_space, _)) = multispace1::<_, nom::error::Error<&str>>(input) else {
            break;
        };

        // `as |a b|` ends the call
        if block_params(after_space).is_ok() {
            break;
        }

        if let Ok((rest, pair)) = hash_pair(after_space) {
            expr.hash.push(pair);
            input = rest;
            continue;
        }

        match param(after_space) {
            Ok((rest, param)) => {
                if !expr.hash.is_empty() {
                    return Err(nom::Err::Failure(nom::error::Error {
                        input: after_space,
                        code: nom::error::ErrorKind::Verify,
                    }));
                }
                expr.params.push(param);
                input = rest;
            }
            Err(nom::Err::Error(_)) => break,
            Err(e) => return Err(e),
        }
    }

    Ok((input, expr))
}

fn literal_source(literal: &Param) -> String {
    match literal {
        Param::String(s) => s.to_owned(),
        Param::Number(n) => n.to_string(),
        Param::Boolean(b) => b.to_string(),
        Param::Id(id) => id.to_owned(),
        Param::SubExpr(sexpr) => sexpr.path.to_owned(),
    }
}

fn param(input: &str) -> IResult<&str, Param> {
    alt((
        map(sub_expression, |sexpr| Param::SubExpr(Box::new(sexpr))),
        map(string_literal, |s| Param::String(s.to_owned())),
        map(number_literal, Param::Number),
        map(boolean_literal, Param::Boolean),
        map(path, |p| Param::Id(p.to_owned())),
    ))(input)
}

/// `(helper param key=value)`
fn sub_expression(input: &str) -> IResult<&str, SubExpression> {
    delimited(
        pair(char('('), multispace0),
        call_expression,
        pair(multispace0, char(')')),
    )(input)
}

fn hash_pair(input: &str) -> IResult<&str, HashPair> {
    let (input, (key, _, value)) = tuple((
        take_while1(is_key_char),
        delimited(multispace0, char('='), multispace0),
        param,
    ))(input)?;

    Ok((
        input,
        HashPair {
            key: key.to_owned(),
            value,
        },
    ))
}

fn string_literal(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('"'), take_till(|c| c == '"'), char('"')),
        delimited(char('\''), take_till(|c| c == '\''), char('\'')),
    ))(input)
}

fn number_literal(input: &str) -> IResult<&str, f64> {
    map_res(
        terminated(
            recognize(tuple((
                opt(char('-')),
                digit1,
                opt(pair(char('.'), digit1)),
            ))),
            not(satisfy(is_path_char)),
        ),
        str::parse::<f64>,
    )(input)
}

fn boolean_literal(input: &str) -> IResult<&str, bool> {
    terminated(
        alt((value(true, tag("true")), value(false, tag("false")))),
        not(satisfy(is_path_char)),
    )(input)
}

fn path(input: &str) -> IResult<&str, &str> {
    take_while1(is_path_char)(input)
}

/// `as |first second|`
fn block_params(input: &str) -> IResult<&str, Vec<&str>> {
    preceded(
        tuple((tag("as"), multispace1, char('|'), multispace0)),
        terminated(
            separated_list1(multispace1, take_while1(is_key_char)),
            pair(multispace0, char('|')),
        ),
    )(input)
}

#[inline]
fn is_path_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '.' | '_' | '-' | '@' | '$' | '/')
}

#[inline]
fn is_key_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '@' | '$')
}
