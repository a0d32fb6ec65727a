use std::{fmt, rc::Rc, sync::Arc};

use fxhash::FxHashMap;
use morphling_core::{ParamType, SubExpression, TemplateProgram};
use phf::phf_map;
use smallvec::SmallVec;
use strum_macros::{AsRefStr, IntoStaticStr};
use tracing::warn;

use crate::{dom::NodeId, morph::MorphHandle, render::render, Environment, Scope, Value};

/// Evaluated hash arguments of a call
pub type Hash = FxHashMap<String, Value>;

/// Signature of a user helper: `(this, params, hash, options, env)`
pub type HelperFn = Rc<dyn Fn(&Scope, &[Value], &Hash, &HelperOptions, &Environment) -> Value>;

#[derive(Clone)]
pub enum Helper {
    Builtin(BuiltinHelper),
    Custom(HelperFn),
}

/// Helpers which are always available unless overridden
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum BuiltinHelper {
    /// `<div {{attribute "name" "a" b}}>`: sets an attribute from a modifier
    Attribute,
    /// `{{partial "name"}}`
    Partial,
    /// Joins its params, used for quoted attribute values
    Concat,
}

static BUILTIN_HELPERS: phf::Map<&'static str, BuiltinHelper> = phf_map! {
    "attribute" => BuiltinHelper::Attribute,
    "partial" => BuiltinHelper::Partial,
    "concat" => BuiltinHelper::Concat,
};

impl BuiltinHelper {
    #[inline]
    pub fn lookup(name: &str) -> Option<BuiltinHelper> {
        BUILTIN_HELPERS.get(name).copied()
    }

    fn call(
        self,
        scope: &Scope,
        params: &[Value],
        hash: &Hash,
        options: &HelperOptions,
        env: &Environment,
    ) -> Value {
        match self {
            BuiltinHelper::Concat => Value::String(params.iter().map(|p| p.to_str()).collect()),

            BuiltinHelper::Partial => (env.hooks.partial)(&env.hooks, scope, params, hash, options, env),

            BuiltinHelper::Attribute => {
                let (Some(element), Some((name, rest))) = (options.element, params.split_first())
                else {
                    warn!("`attribute` helper needs an element and an attribute name");
                    return Value::Undefined;
                };

                let value: String = rest.iter().map(|p| p.to_str()).collect();
                env.dom().set_attribute(element, &name.to_str(), &value);
                Value::Undefined
            }
        }
    }
}

impl Helper {
    pub fn custom<F>(f: F) -> Helper
    where
        F: Fn(&Scope, &[Value], &Hash, &HelperOptions, &Environment) -> Value + 'static,
    {
        Helper::Custom(Rc::new(f))
    }

    pub fn call(
        &self,
        scope: &Scope,
        params: &[Value],
        hash: &Hash,
        options: &HelperOptions,
        env: &Environment,
    ) -> Value {
        match self {
            Helper::Builtin(builtin) => builtin.call(scope, params, hash, options, env),
            Helper::Custom(f) => f(scope, params, hash, options, env),
        }
    }
}

impl fmt::Debug for Helper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Helper::Builtin(builtin) => f.debug_tuple("Builtin").field(builtin).finish(),
            Helper::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Named helpers of an [`Environment`]
#[derive(Debug, Clone, Default)]
pub struct HelperRegistry {
    helpers: FxHashMap<String, Helper>,
}

impl HelperRegistry {
    pub fn register(&mut self, name: impl Into<String>, helper: Helper) {
        self.helpers.insert(name.into(), helper);
    }

    pub fn register_fn<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&Scope, &[Value], &Hash, &HelperOptions, &Environment) -> Value + 'static,
    {
        self.register(name, Helper::custom(f));
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&Helper> {
        self.helpers.get(name)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.helpers.contains_key(name)
    }
}

/// Everything a helper may need besides its arguments
#[derive(Debug, Clone, Default)]
pub struct HelperOptions {
    /// Morph of the content site, `None` for attributes and modifiers
    pub morph: Option<MorphHandle>,
    /// Element of a modifier or of an attribute
    pub element: Option<NodeId>,
    pub param_types: SmallVec<[ParamType; 4]>,
    pub hash_types: Vec<(String, ParamType)>,
    /// Number of block params the body declares, `None` when it declares none
    pub block_params: Option<usize>,
    /// The callee is a literal, e.g. `{{"text"}}`
    pub is_literal: bool,
    /// Element which renders of the body are placed into
    pub contextual_element: Option<NodeId>,
    pub(crate) scope: Scope,
    pub(crate) template: Option<Arc<TemplateProgram>>,
    pub(crate) inverse_template: Option<Arc<TemplateProgram>>,
}

impl HelperOptions {
    pub fn new(scope: Scope) -> Self {
        HelperOptions {
            scope,
            ..Default::default()
        }
    }

    /// Options describing a call site
    pub fn for_call(call: &SubExpression, scope: &Scope) -> Self {
        HelperOptions {
            param_types: call.param_types(),
            hash_types: call.hash_types(),
            is_literal: call.literal.is_some(),
            ..HelperOptions::new(scope.clone())
        }
    }

    pub fn hash_type(&self, key: &str) -> Option<ParamType> {
        self.hash_types
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, param_type)| *param_type)
    }

    #[inline]
    pub fn has_block(&self) -> bool {
        self.template.is_some()
    }

    #[inline]
    pub fn has_inverse(&self) -> bool {
        self.inverse_template.is_some()
    }

    /// Renders the block body with `context` as `this` and `block_args`
    /// bound to its block params. Returns the rendered fragment (or element),
    /// `Undefined` when there is no body.
    pub fn render(
        &self,
        context: Value,
        env: &Environment,
        contextual_element: Option<NodeId>,
        block_args: &[Value],
    ) -> Value {
        self.render_template(
            self.template.as_ref(),
            context,
            env,
            contextual_element,
            block_args,
        )
    }

    /// Same as [`HelperOptions::render`] for the `{{else}}` part
    pub fn inverse(
        &self,
        context: Value,
        env: &Environment,
        contextual_element: Option<NodeId>,
        block_args: &[Value],
    ) -> Value {
        self.render_template(
            self.inverse_template.as_ref(),
            context,
            env,
            contextual_element,
            block_args,
        )
    }

    fn render_template(
        &self,
        template: Option<&Arc<TemplateProgram>>,
        context: Value,
        env: &Environment,
        contextual_element: Option<NodeId>,
        block_args: &[Value],
    ) -> Value {
        let Some(template) = template else {
            return Value::Undefined;
        };

        let scope = self
            .scope
            .with_context(context)
            .bind(&template.block_params, block_args);

        let rendered = render(
            template,
            &scope,
            env,
            contextual_element.or(self.contextual_element),
        );

        Value::Node(rendered.root.node())
    }
}
