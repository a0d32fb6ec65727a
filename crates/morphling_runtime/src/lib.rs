pub mod dom;
mod environment;
pub mod helpers;
pub mod hooks;
pub mod morph;
pub mod render;
mod scope;
mod value;

pub use dom::{DomHelper, NodeId, NodeKind, SimpleDom};
pub use environment::Environment;
pub use helpers::{BuiltinHelper, Hash, Helper, HelperFn, HelperOptions, HelperRegistry};
pub use hooks::{hydration_hooks, HookOverrides, Hooks};
pub use morph::{Morph, MorphHandle};
pub use render::{render, RenderResult, Rendered};
pub use scope::Scope;
pub use value::{Object, Value};
