//! Lowering of the template AST into a [`TemplateProgram`].
//!
//! Compilation is pure and deterministic: the same AST always
//! produces the same program, and nothing is evaluated here.

mod attributes;
mod blocks;
mod context;
mod elements;

use morphling_core::{BuildOp, Node, Program, TemplateProgram};
use tracing::debug;

pub use context::CompilerContext;

/// Compiles a template (or a block body) into a reusable program
pub fn compile_program(program: &Program) -> TemplateProgram {
    let mut ctx = CompilerContext::default();
    ctx.program.block_params = program.block_params.clone();
    ctx.compile_children(&program.children);

    debug!(
        build_ops = ctx.program.build.len(),
        sites = ctx.program.sites.len(),
        children = ctx.program.children.len(),
        "compiled program"
    );

    ctx.program
}

impl CompilerContext {
    /// Compiles the children of the current node.
    /// Every AST node produces exactly one node in the built structure.
    pub fn compile_children(&mut self, children: &[Node]) {
        for (index, node) in children.iter().enumerate() {
            self.path.push(index as u32);
            self.compile_node(node);
            self.path.pop();
        }
    }

    fn compile_node(&mut self, node: &Node) {
        match node {
            Node::Element(element) => self.compile_element(element),
            Node::Text(text, _) => self.push_op(BuildOp::Text(text.to_owned())),
            Node::Comment(comment, _) => self.push_op(BuildOp::Comment(comment.to_owned())),
            Node::Mustache(mustache) => self.compile_mustache(mustache),
            Node::Block(block) => self.compile_block(block),
            Node::Component(component) => self.compile_component(component),
        }
    }
}
