use phf::{phf_map, phf_set};
use strum_macros::{AsRefStr, IntoStaticStr};

/// Element namespace. The string form is the namespace URI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, AsRefStr, IntoStaticStr)]
pub enum Namespace {
    #[default]
    #[strum(serialize = "http://www.w3.org/1999/xhtml")]
    Xhtml,
    #[strum(serialize = "http://www.w3.org/2000/svg")]
    Svg,
    #[strum(serialize = "http://www.w3.org/1998/Math/MathML")]
    MathMl,
}

impl Namespace {
    #[inline]
    pub fn uri(self) -> &'static str {
        self.into()
    }
}

// According to https://www.w3.org/TR/2011/WD-html5-20110525/syntax.html#elements-0
pub static VOID_TAGS: phf::Set<&'static str> = phf_set! {
    "area", "base", "br", "col", "command", "embed", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr"
};

/// Tags which put themselves (and their descendants) into a namespace
static NAMESPACE_TAGS: phf::Map<&'static str, Namespace> = phf_map! {
    "svg" => Namespace::Svg,
    "math" => Namespace::MathMl,
};

/// Foreign elements whose content is HTML again
static SVG_INTEGRATION_POINTS: phf::Set<&'static str> = phf_set! {
    "foreignObject", "desc", "title"
};

static MATHML_INTEGRATION_POINTS: phf::Set<&'static str> = phf_set! {
    "annotation-xml"
};

#[inline]
pub fn is_void_tag(tag_name: &str) -> bool {
    VOID_TAGS.contains(tag_name.to_ascii_lowercase().as_str())
}

/// The namespace a tag fixes for itself, regardless of its parent
#[inline]
pub fn fixed_namespace(tag_name: &str) -> Option<Namespace> {
    NAMESPACE_TAGS.get(tag_name).copied()
}

/// Namespace of an element named `tag_name` which is placed inside `parent`
pub fn element_namespace(tag_name: &str, parent: Namespace) -> Namespace {
    fixed_namespace(tag_name).unwrap_or(parent)
}

/// Namespace which children of the element inherit.
/// HTML integration points (e.g. `<foreignObject>`) switch back to XHTML.
pub fn children_namespace(tag_name: &str, element_namespace: Namespace) -> Namespace {
    match element_namespace {
        Namespace::Svg if SVG_INTEGRATION_POINTS.contains(tag_name) => Namespace::Xhtml,
        Namespace::MathMl if MATHML_INTEGRATION_POINTS.contains(tag_name) => Namespace::Xhtml,
        ns => ns,
    }
}

/// Whether the tag is an HTML integration point in any foreign namespace
#[inline]
pub fn is_integration_point(tag_name: &str) -> bool {
    SVG_INTEGRATION_POINTS.contains(tag_name) || MATHML_INTEGRATION_POINTS.contains(tag_name)
}

/// Dashed names of built-in SVG and MathML elements, never components
static RESERVED_DASHED_TAGS: phf::Set<&'static str> = phf_set! {
    "annotation-xml", "color-profile", "font-face", "font-face-src",
    "font-face-uri", "font-face-format", "font-face-name", "missing-glyph"
};

/// Whether a tag name denotes a component candidate
#[inline]
pub fn is_component_tag(tag_name: &str) -> bool {
    tag_name.contains('-') && !RESERVED_DASHED_TAGS.contains(tag_name)
}
