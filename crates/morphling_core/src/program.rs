//! Compiled form of a template.
//!
//! A [`TemplateProgram`] is static and side-effect free: it is created once per
//! template and reused for every render. It describes
//! 1. how to build the static node structure (`build`), and
//! 2. which dynamic sites to hydrate afterwards (`sites`), each addressed
//!    by a [`NodePath`] from the root of the built structure.

use std::sync::Arc;

use flagset::{flags, FlagSet};
use smallvec::SmallVec;
use strum_macros::{AsRefStr, IntoStaticStr};

use crate::{HashPair, Namespace, Param, SubExpression};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateProgram {
    pub build: Vec<BuildOp>,
    pub sites: Vec<Site>,
    /// Block bodies and inverses, referenced by index from [`Site`]s
    pub children: Vec<Arc<TemplateProgram>>,
    pub block_params: SmallVec<[String; 2]>,
    pub features: ProgramFeatures,
}

impl TemplateProgram {
    /// A program without any dynamic site does not need hydration
    #[inline]
    pub fn is_static(&self) -> bool {
        self.features.is_empty()
    }

    #[inline]
    pub fn child(&self, index: usize) -> Option<&Arc<TemplateProgram>> {
        self.children.get(index)
    }
}

/// Instructions for building the static structure, top-down.
///
/// `OpenElement` creates an element and makes it the current parent
/// until the matching `CloseElement`.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildOp {
    OpenElement {
        tag_name: String,
        /// `None` when the namespace is inherited from the render root
        namespace: Option<Namespace>,
    },
    SetAttribute {
        name: String,
        value: String,
    },
    CloseElement,
    Text(String),
    Comment(String),
    /// Empty text node which anchors a morph
    Placeholder,
}

/// Child indices leading from the root fragment to a node
pub type NodePath = SmallVec<[u32; 4]>;

/// A dynamic site registered by the compiler
#[derive(Debug, Clone, PartialEq)]
pub enum Site {
    /// `{{mustache}}` or `{{{mustache}}}`
    Content {
        path: NodePath,
        call: SubExpression,
        escaped: bool,
    },
    /// `{{#block}}...{{else}}...{{/block}}`
    Block {
        path: NodePath,
        call: SubExpression,
        program: usize,
        inverse: Option<usize>,
    },
    /// `<x-component attr="...">...</x-component>`
    Component {
        path: NodePath,
        tag_name: String,
        hash: Vec<HashPair>,
        program: usize,
    },
    /// `<div attr={{value}}>` (`quoted: false`) or `<div attr="a {{b}}">` (`quoted: true`)
    Attribute {
        path: NodePath,
        name: String,
        quoted: bool,
        parts: SmallVec<[Param; 2]>,
    },
    /// `<div {{modifier}}>`
    Modifier { path: NodePath, call: SubExpression },
}

impl Site {
    #[inline]
    pub fn path(&self) -> &NodePath {
        match self {
            Site::Content { path, .. }
            | Site::Block { path, .. }
            | Site::Component { path, .. }
            | Site::Attribute { path, .. }
            | Site::Modifier { path, .. } => path,
        }
    }

    #[inline]
    pub fn kind(&self) -> SiteKind {
        match self {
            Site::Content { .. } => SiteKind::Content,
            Site::Block { .. } => SiteKind::Block,
            Site::Component { .. } => SiteKind::Component,
            Site::Attribute { .. } => SiteKind::Attribute,
            Site::Modifier { .. } => SiteKind::Modifier,
        }
    }
}

flags! {
    /// Which kinds of dynamic sites a program uses
    #[derive(AsRefStr, IntoStaticStr)]
    pub enum SiteKind: u8 {
        Content,
        Block,
        Component,
        Attribute,
        Modifier,
        Partial,
    }
}

pub type ProgramFeatures = FlagSet<SiteKind>;
