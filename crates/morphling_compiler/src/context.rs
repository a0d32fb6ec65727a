use morphling_core::{BuildOp, Namespace, NodePath, Site, SiteKind, TemplateProgram};
use tracing::trace;

/// Accumulates the program of a single template body.
/// Nested bodies (blocks, components) get their own context.
#[derive(Debug, Default)]
pub struct CompilerContext {
    pub program: TemplateProgram,
    /// Path of the node currently being compiled
    pub path: NodePath,
    /// Namespace determined by an ancestor in this body, if any
    pub namespace: Option<Namespace>,
}

impl CompilerContext {
    #[inline]
    pub fn push_op(&mut self, op: BuildOp) {
        self.program.build.push(op);
    }

    pub fn register_site(&mut self, site: Site) {
        let kind: SiteKind = site.kind();
        let kind_name: &'static str = kind.into();
        trace!(path = ?site.path(), kind = kind_name, "registered site");

        self.program.features |= kind;
        self.program.sites.push(site);
    }

    /// Adds a nested program and returns its index
    pub fn add_child(&mut self, child: TemplateProgram) -> usize {
        self.program.children.push(std::sync::Arc::new(child));
        self.program.children.len() - 1
    }
}
