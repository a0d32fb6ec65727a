use std::borrow::Cow;

use morphling_core::{
    children_namespace, element_namespace, is_component_tag, is_void_tag, AttributeNode,
    AttributePart, AttributeValue, BlockNode, CompileOptions, ComponentNode, ElementNode,
    MustacheNode, Namespace, Node, Program, SubExpression,
};
use smallvec::SmallVec;
use swc_core::common::Span;
use tracing::debug;

use crate::{
    error::{byte_span, SyntaxError, SyntaxErrorKind},
    expression::{parse_mustache_expression, MustacheExpression},
    tokenizer::{
        AttributeChunk, MustacheKind, RawAttribute, RawAttributeValue, RawMustache, StartTag,
        Token, Tokenizer,
    },
};

/// Parses a template into its AST.
///
/// Elements, blocks and components must be properly nested.
/// The first structural problem aborts parsing.
pub fn parse_template(source: &str, options: &CompileOptions) -> Result<Program, SyntaxError> {
    let mut parser = TemplateParser {
        options,
        stack: Vec::new(),
        root: Vec::new(),
    };

    let mut tokenizer = Tokenizer::template(source);
    while let Some(token) = tokenizer.next_token()? {
        match token {
            Token::Chars(text, span) => parser.push_text(text, span),
            Token::Comment(comment, span) => {
                if options.keep_html_comments {
                    parser.push_node(Node::Comment(comment.to_owned(), span));
                }
            }
            Token::StartTag(start_tag) => parser.start_tag(start_tag)?,
            Token::EndTag { name, span } => parser.end_tag(name, span)?,
            Token::Mustache(mustache) => parser.mustache(mustache)?,
        }
    }

    parser.finish(source.len())
}

struct TemplateParser<'o> {
    options: &'o CompileOptions,
    stack: Vec<Frame>,
    root: Vec<Node>,
}

/// An open element, component or block collecting its children
struct Frame {
    kind: FrameKind,
    children: Vec<Node>,
    /// Namespace the children inherit
    namespace: Namespace,
    lo: u32,
}

enum FrameKind {
    Element(ElementNode),
    Component(ComponentNode),
    Block {
        call: SubExpression,
        block_params: SmallVec<[String; 2]>,
        /// Set once `{{else}}` is reached, `children` then collect the inverse
        program: Option<Program>,
    },
}

impl<'o> TemplateParser<'o> {
    fn current_namespace(&self) -> Namespace {
        self.stack
            .last()
            .map_or(Namespace::Xhtml, |frame| frame.namespace)
    }

    fn children_mut(&mut self) -> &mut Vec<Node> {
        match self.stack.last_mut() {
            Some(frame) => &mut frame.children,
            None => &mut self.root,
        }
    }

    fn push_node(&mut self, node: Node) {
        self.children_mut().push(node);
    }

    /// Adjacent text runs are merged into one node
    fn push_text(&mut self, text: Cow<str>, span: Span) {
        let children = self.children_mut();
        if let Some(Node::Text(prev, prev_span)) = children.last_mut() {
            prev.push_str(&text);
            prev_span.hi = span.hi;
            return;
        }

        children.push(Node::Text(text.into_owned(), span));
    }

    fn start_tag(&mut self, start_tag: StartTag) -> Result<(), SyntaxError> {
        let StartTag {
            name,
            attributes,
            modifiers,
            self_closing,
            span,
        } = start_tag;

        let attributes = attributes
            .into_iter()
            .map(convert_attribute)
            .collect::<Result<Vec<_>, _>>()?;

        if self.options.components && is_component_tag(name) {
            if let Some(modifier) = modifiers
                .iter()
                .find(|m| m.kind != MustacheKind::Comment)
            {
                return Err(SyntaxError::new(
                    SyntaxErrorKind::InvalidAttribute {
                        name: modifier.content.trim().to_owned(),
                        reason: "components do not support element modifiers".to_owned(),
                    },
                    modifier.span,
                ));
            }

            let component = ComponentNode {
                tag_name: name.to_owned(),
                attributes,
                program: Program::default(),
                span,
            };

            if self_closing {
                self.push_node(Node::Component(component));
            } else {
                let namespace = self.current_namespace();
                self.stack.push(Frame {
                    kind: FrameKind::Component(component),
                    children: Vec::new(),
                    namespace,
                    lo: span.lo.0,
                });
            }
            return Ok(());
        }

        let modifiers = modifiers
            .into_iter()
            .filter(|m| m.kind != MustacheKind::Comment)
            .map(|m| convert_modifier(&m))
            .collect::<Result<Vec<_>, _>>()?;

        let namespace = element_namespace(name, self.current_namespace());
        let is_void = is_void_tag(name);

        let element = ElementNode {
            tag_name: name.to_owned(),
            namespace,
            attributes,
            modifiers,
            children: Vec::new(),
            self_closing: self_closing || is_void,
            span,
        };

        if element.self_closing {
            self.push_node(Node::Element(element));
        } else {
            self.stack.push(Frame {
                kind: FrameKind::Element(element),
                children: Vec::new(),
                namespace: children_namespace(name, namespace),
                lo: span.lo.0,
            });
        }

        Ok(())
    }

    fn end_tag(&mut self, name: &str, span: Span) -> Result<(), SyntaxError> {
        if is_void_tag(name) {
            return Err(SyntaxError::new(
                SyntaxErrorKind::VoidEndTag {
                    found: name.to_owned(),
                },
                span,
            ));
        }

        let Some(Frame { kind, children, lo, .. }) = self.stack.pop() else {
            return Err(SyntaxError::new(
                SyntaxErrorKind::UnexpectedEndTag {
                    found: name.to_owned(),
                },
                span,
            ));
        };

        let node = match kind {
            FrameKind::Element(mut element) if element.tag_name.eq_ignore_ascii_case(name) => {
                element.children = children;
                element.span.hi = span.hi;
                Node::Element(element)
            }
            FrameKind::Component(mut component)
                if component.tag_name.eq_ignore_ascii_case(name) =>
            {
                component.program.children = children;
                component.program.span = byte_span(component.span.hi.0 as usize, span.lo.0 as usize);
                component.span.hi = span.hi;
                Node::Component(component)
            }
            FrameKind::Element(ElementNode { tag_name, .. })
            | FrameKind::Component(ComponentNode { tag_name, .. }) => {
                return Err(SyntaxError::new(
                    SyntaxErrorKind::MismatchedEndTag {
                        expected: tag_name,
                        found: name.to_owned(),
                    },
                    span,
                ));
            }
            FrameKind::Block { call, .. } => {
                // `<div>{{#if}}</div>{{/if}}`
                return Err(SyntaxError::new(
                    SyntaxErrorKind::UnclosedBlock { name: call.path },
                    byte_span(lo as usize, span.hi.0 as usize),
                ));
            }
        };

        self.push_node(node);
        Ok(())
    }

    fn mustache(&mut self, mustache: RawMustache) -> Result<(), SyntaxError> {
        match mustache.kind {
            MustacheKind::Comment => Ok(()),
            MustacheKind::Escaped | MustacheKind::Unescaped => {
                let call = parse_call(&mustache)?;
                self.push_node(Node::Mustache(MustacheNode {
                    call,
                    escaped: mustache.kind == MustacheKind::Escaped,
                    span: mustache.span,
                }));
                Ok(())
            }
            MustacheKind::Open => {
                let MustacheExpression { call, block_params } =
                    parse_mustache_expression(mustache.content, mustache.span)?;
                let namespace = self.current_namespace();

                self.stack.push(Frame {
                    kind: FrameKind::Block {
                        call,
                        block_params,
                        program: None,
                    },
                    children: Vec::new(),
                    namespace,
                    lo: mustache.span.lo.0,
                });
                Ok(())
            }
            MustacheKind::Else => self.else_mustache(mustache),
            MustacheKind::Close => self.close_block(mustache),
        }
    }

    fn else_mustache(&mut self, mustache: RawMustache) -> Result<(), SyntaxError> {
        let unexpected_else = || SyntaxError::new(SyntaxErrorKind::UnexpectedElse, mustache.span);

        let Some(frame) = self.stack.last_mut() else {
            return Err(unexpected_else());
        };

        let FrameKind::Block {
            ref block_params,
            ref mut program,
            ..
        } = frame.kind
        else {
            return Err(unexpected_else());
        };

        if program.is_some() {
            return Err(unexpected_else());
        }

        if !mustache.content.trim().is_empty() {
            return Err(SyntaxError::new(
                SyntaxErrorKind::InvalidExpression {
                    expression: format!("else {}", mustache.content.trim()),
                    reason: "chained `else` blocks are not supported".to_owned(),
                },
                mustache.span,
            ));
        }

        *program = Some(Program {
            children: std::mem::take(&mut frame.children),
            block_params: block_params.clone(),
            span: byte_span(frame.lo as usize, mustache.span.lo.0 as usize),
        });

        Ok(())
    }

    fn close_block(&mut self, mustache: RawMustache) -> Result<(), SyntaxError> {
        let found = mustache.content.trim();

        let Some(Frame { kind, children, lo, .. }) = self.stack.pop() else {
            return Err(SyntaxError::new(
                SyntaxErrorKind::UnexpectedBlockClose {
                    found: found.to_owned(),
                },
                mustache.span,
            ));
        };

        let (call, block_params, program) = match kind {
            FrameKind::Block {
                call,
                block_params,
                program,
            } if call.path == found => (call, block_params, program),
            FrameKind::Block { call, .. } => {
                return Err(SyntaxError::new(
                    SyntaxErrorKind::MismatchedBlockClose {
                        expected: call.path,
                        found: found.to_owned(),
                    },
                    mustache.span,
                ));
            }
            FrameKind::Element(ElementNode { tag_name, .. })
            | FrameKind::Component(ComponentNode { tag_name, .. }) => {
                // `{{#if}}<div>{{/if}}</div>`
                return Err(SyntaxError::new(
                    SyntaxErrorKind::UnclosedElement { tag_name },
                    byte_span(lo as usize, mustache.span.hi.0 as usize),
                ));
            }
        };

        let body_span = byte_span(lo as usize, mustache.span.lo.0 as usize);
        let (program, inverse) = match program {
            Some(program) => (
                program,
                Some(Program {
                    children,
                    block_params: SmallVec::new(),
                    span: body_span,
                }),
            ),
            None => (
                Program {
                    children,
                    block_params,
                    span: body_span,
                },
                None,
            ),
        };

        self.push_node(Node::Block(BlockNode {
            call,
            program,
            inverse,
            span: byte_span(lo as usize, mustache.span.hi.0 as usize),
        }));

        Ok(())
    }

    fn finish(mut self, source_len: usize) -> Result<Program, SyntaxError> {
        if let Some(frame) = self.stack.pop() {
            let span = byte_span(frame.lo as usize, source_len);
            let kind = match frame.kind {
                FrameKind::Element(element) => SyntaxErrorKind::UnclosedElement {
                    tag_name: element.tag_name,
                },
                FrameKind::Component(component) => SyntaxErrorKind::UnclosedElement {
                    tag_name: component.tag_name,
                },
                FrameKind::Block { call, .. } => SyntaxErrorKind::UnclosedBlock { name: call.path },
            };
            return Err(SyntaxError::new(kind, span));
        }

        debug!(nodes = self.root.len(), "parsed template");

        Ok(Program {
            children: self.root,
            block_params: SmallVec::new(),
            span: byte_span(0, source_len),
        })
    }
}

/// Parses a non-block mustache, rejecting block params
fn parse_call(mustache: &RawMustache) -> Result<SubExpression, SyntaxError> {
    let MustacheExpression { call, block_params } =
        parse_mustache_expression(mustache.content, mustache.span)?;

    if !block_params.is_empty() {
        return Err(SyntaxError::new(
            SyntaxErrorKind::InvalidExpression {
                expression: mustache.content.trim().to_owned(),
                reason: "block params are only allowed on block helpers".to_owned(),
            },
            mustache.span,
        ));
    }

    Ok(call)
}

fn convert_modifier(mustache: &RawMustache) -> Result<SubExpression, SyntaxError> {
    match mustache.kind {
        MustacheKind::Escaped => parse_call(mustache),
        _ => Err(SyntaxError::new(
            SyntaxErrorKind::InvalidAttribute {
                name: mustache.content.trim().to_owned(),
                reason: "only helper calls `{{helper ...}}` are allowed inside a tag".to_owned(),
            },
            mustache.span,
        )),
    }
}

fn convert_attribute(raw: RawAttribute) -> Result<AttributeNode, SyntaxError> {
    let RawAttribute { name, value, span } = raw;

    let (chunks, quoted) = match value {
        RawAttributeValue::Empty => (Vec::new(), false),
        RawAttributeValue::Quoted(chunks) => (chunks, true),
        RawAttributeValue::Unquoted(chunks) => (chunks, false),
    };

    let mut parts: Vec<AttributePart> = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        match chunk {
            AttributeChunk::Text(text) => match parts.last_mut() {
                Some(AttributePart::Text(prev)) => prev.push_str(&text),
                _ => parts.push(AttributePart::Text(text.into_owned())),
            },
            AttributeChunk::Mustache(mustache) => match mustache.kind {
                MustacheKind::Comment => {}
                MustacheKind::Escaped | MustacheKind::Unescaped => {
                    parts.push(AttributePart::Mustache(MustacheNode {
                        call: parse_call(&mustache)?,
                        escaped: mustache.kind == MustacheKind::Escaped,
                        span: mustache.span,
                    }));
                }
                MustacheKind::Open | MustacheKind::Else | MustacheKind::Close => {
                    return Err(SyntaxError::new(
                        SyntaxErrorKind::InvalidAttribute {
                            name: name.to_owned(),
                            reason: "blocks are not allowed inside attribute values".to_owned(),
                        },
                        mustache.span,
                    ));
                }
            },
        }
    }

    let value = match parts.pop() {
        None => AttributeValue::Static(String::new()),
        Some(AttributePart::Text(text)) if parts.is_empty() => AttributeValue::Static(text),
        Some(AttributePart::Mustache(mustache)) if parts.is_empty() && !quoted => {
            AttributeValue::Mustache(mustache)
        }
        Some(last) => {
            parts.push(last);
            AttributeValue::Concat(parts)
        }
    };

    Ok(AttributeNode {
        name: name.to_owned(),
        value,
        span,
    })
}
