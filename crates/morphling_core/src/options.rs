/// Options which affect how templates are parsed and compiled
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Treat dash-containing tags (`<x-foo>`) as component invocations.
    /// When disabled, they are compiled as ordinary elements.
    pub components: bool,
    /// Keep `<!-- HTML comments -->` in the output
    pub keep_html_comments: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            components: true,
            keep_html_comments: true,
        }
    }
}
