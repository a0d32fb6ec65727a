//! The main public crate of the `morphling` project.
//!
//! A template is compiled once into a [`TemplateProgram`] and rendered any number
//! of times. Every dynamic part of the template is hydrated through the hooks
//! of the [`Environment`], which can be replaced one by one.
//!
//! ```
//! use morphling::{Environment, Object};
//!
//! let template = morphling::compile("<h1 class=\"{{kind}}\">{{title}}</h1>").unwrap();
//!
//! let context: Object = [("kind", "big"), ("title", "Hello")].into_iter().collect();
//! let env = Environment::default();
//! let rendered = template.render(context, &env, None);
//!
//! assert_eq!(
//!     "<h1 class=\"big\">Hello</h1>",
//!     env.dom().serialize(rendered.root.node())
//! );
//! ```

use std::sync::Arc;

use tracing::debug;

mod errors;

pub use errors::CompileError;
pub use morphling_compiler::compile_program;
pub use morphling_core::*;
pub use morphling_parser::{equal_html, normalize_html, parse_template, NormalizedToken, SyntaxError};
pub use morphling_runtime::*;

/// A compiled template, cheap to clone and to render many times
#[derive(Debug, Clone)]
pub struct Template {
    program: Arc<TemplateProgram>,
}

impl Template {
    /// Renders the template with `context` as `this`.
    ///
    /// `contextual_element` is the element the result is meant to be inserted into,
    /// e.g. an `<svg>` or a `<table>`.
    pub fn render(
        &self,
        context: impl Into<Value>,
        env: &Environment,
        contextual_element: Option<NodeId>,
    ) -> Rendered {
        render(&self.program, &Scope::new(context), env, contextual_element)
    }

    #[inline]
    pub fn program(&self) -> Arc<TemplateProgram> {
        self.program.clone()
    }
}

impl From<TemplateProgram> for Template {
    fn from(program: TemplateProgram) -> Self {
        Template {
            program: Arc::new(program),
        }
    }
}

/// Parses and compiles a template with the default options
pub fn compile(source: &str) -> Result<Template, CompileError> {
    compile_with_options(source, &CompileOptions::default())
}

pub fn compile_with_options(
    source: &str,
    options: &CompileOptions,
) -> Result<Template, CompileError> {
    let ast = parse_template(source, options)?;
    let program = compile_program(&ast);

    debug!(
        source_len = source.len(),
        is_static = program.is_static(),
        "Compiled template"
    );

    Ok(Template::from(program))
}

/// Compiles `source` and registers it as a partial named `name`
pub fn register_partial(
    env: &mut Environment,
    name: impl Into<String>,
    source: &str,
) -> Result<(), CompileError> {
    let template = compile(source)?;
    env.register_partial(name, template.program());
    Ok(())
}
