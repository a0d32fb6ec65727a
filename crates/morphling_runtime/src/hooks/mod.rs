//! The hook table: every dynamic site of a template is hydrated by calling
//! one of these hooks. Embedders replace single hooks through
//! [`HookOverrides`], the rest keep the behavior from [`defaults`].

use std::{fmt, rc::Rc};

use morphling_core::{HashPair, Param, SubExpression};
use smallvec::SmallVec;

use crate::{
    dom::NodeId,
    helpers::{Hash, Helper, HelperOptions},
    morph::MorphHandle,
    Environment, Scope, Value,
};

pub mod defaults;

pub type LookupHelperHook = Rc<dyn Fn(&Hooks, &str, &Scope, &Environment) -> Option<Helper>>;
pub type SimpleHook = Rc<dyn Fn(&Hooks, &Scope, &str, &Environment) -> Value>;
pub type ContentHook = Rc<
    dyn Fn(&Hooks, &MorphHandle, &str, &Scope, &[Value], &Hash, &HelperOptions, &Environment),
>;
pub type ComponentHook =
    Rc<dyn Fn(&Hooks, &MorphHandle, &str, &Scope, &[HashPair], &HelperOptions, &Environment)>;
pub type ComponentFallbackHook = Rc<
    dyn Fn(&Hooks, &MorphHandle, &str, &Scope, &[HashPair], &HelperOptions, &Environment) -> Value,
>;
pub type ElementHook =
    Rc<dyn Fn(&Hooks, NodeId, &str, &Scope, &[Value], &Hash, &HelperOptions, &Environment)>;
pub type AttributeHook =
    Rc<dyn Fn(&Hooks, NodeId, &str, bool, &Scope, &[Value], &HelperOptions, &Environment)>;
pub type ConcatHook = Rc<dyn Fn(&Hooks, &Scope, &[Value], &HelperOptions, &Environment) -> Value>;
pub type SubexprHook =
    Rc<dyn Fn(&Hooks, &str, &Scope, &[Value], &Hash, &HelperOptions, &Environment) -> Value>;
pub type PartialHook =
    Rc<dyn Fn(&Hooks, &Scope, &[Value], &Hash, &HelperOptions, &Environment) -> Value>;
pub type SetHook = Rc<dyn Fn(&Hooks, &Scope, &str, Value, &Environment)>;

/// The hook dispatch table.
///
/// Each hook gets the table itself as its first argument,
/// so that hooks can call each other (including overridden ones).
#[derive(Clone)]
pub struct Hooks {
    pub lookup_helper: LookupHelperHook,
    pub simple: SimpleHook,
    pub content: ContentHook,
    pub component: ComponentHook,
    pub component_fallback: ComponentFallbackHook,
    pub element: ElementHook,
    pub attribute: AttributeHook,
    pub concat: ConcatHook,
    pub subexpr: SubexprHook,
    pub partial: PartialHook,
    pub set: SetHook,
}

impl Default for Hooks {
    fn default() -> Self {
        hydration_hooks(HookOverrides::default())
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks").finish_non_exhaustive()
    }
}

/// Replacements for some of the hooks, see [`hydration_hooks`]
#[derive(Clone, Default)]
pub struct HookOverrides {
    pub lookup_helper: Option<LookupHelperHook>,
    pub simple: Option<SimpleHook>,
    pub content: Option<ContentHook>,
    pub component: Option<ComponentHook>,
    pub component_fallback: Option<ComponentFallbackHook>,
    pub element: Option<ElementHook>,
    pub attribute: Option<AttributeHook>,
    pub concat: Option<ConcatHook>,
    pub subexpr: Option<SubexprHook>,
    pub partial: Option<PartialHook>,
    pub set: Option<SetHook>,
}

impl HookOverrides {
    pub fn new() -> Self {
        HookOverrides::default()
    }

    pub fn lookup_helper<F>(mut self, f: F) -> Self
    where
        F: Fn(&Hooks, &str, &Scope, &Environment) -> Option<Helper> + 'static,
    {
        self.lookup_helper = Some(Rc::new(f));
        self
    }

    pub fn simple<F>(mut self, f: F) -> Self
    where
        F: Fn(&Hooks, &Scope, &str, &Environment) -> Value + 'static,
    {
        self.simple = Some(Rc::new(f));
        self
    }

    pub fn content<F>(mut self, f: F) -> Self
    where
        F: Fn(&Hooks, &MorphHandle, &str, &Scope, &[Value], &Hash, &HelperOptions, &Environment)
            + 'static,
    {
        self.content = Some(Rc::new(f));
        self
    }

    pub fn component<F>(mut self, f: F) -> Self
    where
        F: Fn(&Hooks, &MorphHandle, &str, &Scope, &[HashPair], &HelperOptions, &Environment)
            + 'static,
    {
        self.component = Some(Rc::new(f));
        self
    }

    pub fn component_fallback<F>(mut self, f: F) -> Self
    where
        F: Fn(
                &Hooks,
                &MorphHandle,
                &str,
                &Scope,
                &[HashPair],
                &HelperOptions,
                &Environment,
            ) -> Value
            + 'static,
    {
        self.component_fallback = Some(Rc::new(f));
        self
    }

    pub fn element<F>(mut self, f: F) -> Self
    where
        F: Fn(&Hooks, NodeId, &str, &Scope, &[Value], &Hash, &HelperOptions, &Environment)
            + 'static,
    {
        self.element = Some(Rc::new(f));
        self
    }

    pub fn attribute<F>(mut self, f: F) -> Self
    where
        F: Fn(&Hooks, NodeId, &str, bool, &Scope, &[Value], &HelperOptions, &Environment)
            + 'static,
    {
        self.attribute = Some(Rc::new(f));
        self
    }

    pub fn concat<F>(mut self, f: F) -> Self
    where
        F: Fn(&Hooks, &Scope, &[Value], &HelperOptions, &Environment) -> Value + 'static,
    {
        self.concat = Some(Rc::new(f));
        self
    }

    pub fn subexpr<F>(mut self, f: F) -> Self
    where
        F: Fn(&Hooks, &str, &Scope, &[Value], &Hash, &HelperOptions, &Environment) -> Value
            + 'static,
    {
        self.subexpr = Some(Rc::new(f));
        self
    }

    pub fn partial<F>(mut self, f: F) -> Self
    where
        F: Fn(&Hooks, &Scope, &[Value], &Hash, &HelperOptions, &Environment) -> Value + 'static,
    {
        self.partial = Some(Rc::new(f));
        self
    }

    pub fn set<F>(mut self, f: F) -> Self
    where
        F: Fn(&Hooks, &Scope, &str, Value, &Environment) + 'static,
    {
        self.set = Some(Rc::new(f));
        self
    }
}

/// Builds the hook table: the overrides which are set, the defaults for the rest
pub fn hydration_hooks(overrides: HookOverrides) -> Hooks {
    Hooks {
        lookup_helper: overrides
            .lookup_helper
            .unwrap_or_else(|| Rc::new(defaults::lookup_helper)),
        simple: overrides.simple.unwrap_or_else(|| Rc::new(defaults::simple)),
        content: overrides.content.unwrap_or_else(|| Rc::new(defaults::content)),
        component: overrides
            .component
            .unwrap_or_else(|| Rc::new(defaults::component)),
        component_fallback: overrides
            .component_fallback
            .unwrap_or_else(|| Rc::new(defaults::component_fallback)),
        element: overrides.element.unwrap_or_else(|| Rc::new(defaults::element)),
        attribute: overrides
            .attribute
            .unwrap_or_else(|| Rc::new(defaults::attribute)),
        concat: overrides.concat.unwrap_or_else(|| Rc::new(defaults::concat)),
        subexpr: overrides.subexpr.unwrap_or_else(|| Rc::new(defaults::subexpr)),
        partial: overrides.partial.unwrap_or_else(|| Rc::new(defaults::partial)),
        set: overrides.set.unwrap_or_else(|| Rc::new(defaults::set)),
    }
}

/// Value of a literal param. Ids and sub-expressions yield their source name.
pub fn literal_value(param: &Param) -> Value {
    match param {
        Param::String(s) | Param::Id(s) => Value::from(s.as_str()),
        Param::Number(n) => Value::Number(*n),
        Param::Boolean(b) => Value::Bool(*b),
        Param::SubExpr(sexpr) => Value::from(sexpr.path.as_str()),
    }
}

/// Ids resolve through `simple`, sub-expressions through `subexpr`, literals are kept
pub fn evaluate_param(hooks: &Hooks, scope: &Scope, param: &Param, env: &Environment) -> Value {
    match param {
        Param::Id(path) => (hooks.simple)(hooks, scope, path, env),
        Param::SubExpr(sexpr) => evaluate_subexpr(hooks, scope, sexpr, env),
        literal => literal_value(literal),
    }
}

pub fn resolve_hash(hooks: &Hooks, scope: &Scope, pairs: &[HashPair], env: &Environment) -> Hash {
    pairs
        .iter()
        .map(|pair| {
            (
                pair.key.to_owned(),
                evaluate_param(hooks, scope, &pair.value, env),
            )
        })
        .collect()
}

/// Evaluated params and hash of a call
pub fn evaluate_arguments(
    hooks: &Hooks,
    scope: &Scope,
    call: &SubExpression,
    env: &Environment,
) -> (SmallVec<[Value; 2]>, Hash) {
    let params = call
        .params
        .iter()
        .map(|param| evaluate_param(hooks, scope, param, env))
        .collect();

    (params, resolve_hash(hooks, scope, &call.hash, env))
}

pub fn evaluate_subexpr(
    hooks: &Hooks,
    scope: &Scope,
    sexpr: &SubExpression,
    env: &Environment,
) -> Value {
    if let Some(ref literal) = sexpr.literal {
        return literal_value(literal);
    }

    let (params, hash) = evaluate_arguments(hooks, scope, sexpr, env);
    let options = HelperOptions::for_call(sexpr, scope);

    (hooks.subexpr)(hooks, &sexpr.path, scope, &params, &hash, &options, env)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Object;

    fn call(path: &str, params: Vec<Param>) -> SubExpression {
        let mut call = SubExpression::new(path);
        call.params.extend(params);
        call
    }

    #[test]
    fn it_evaluates_params_by_type() {
        let env = Environment::default();
        let context: Object = [("name", "Alice")].into_iter().collect();
        let scope = Scope::new(context);

        assert_eq!(
            Value::from("Alice"),
            evaluate_param(&env.hooks, &scope, &Param::Id("name".into()), &env)
        );
        assert_eq!(
            Value::from("name"),
            evaluate_param(&env.hooks, &scope, &Param::String("name".into()), &env)
        );
        assert_eq!(
            Value::Number(1.0),
            evaluate_param(&env.hooks, &scope, &Param::Number(1.0), &env)
        );
    }

    #[test]
    fn it_evaluates_nested_sub_expressions() {
        let mut env = Environment::default();
        env.register_helper("wrap", |_, params, _, _, _| {
            Value::from(format!("({})", params[0]))
        });

        let inner = call("wrap", vec![Param::Id("name".into())]);
        let outer = call(
            "concat",
            vec![Param::SubExpr(Box::new(inner)), Param::String("!".into())],
        );

        let context: Object = [("name", "x")].into_iter().collect();
        let value = evaluate_subexpr(&env.hooks, &Scope::new(context), &outer, &env);
        assert_eq!(Value::from("(x)!"), value);
    }

    #[test]
    fn it_merges_overrides() {
        let hooks = hydration_hooks(
            HookOverrides::new().simple(|_, _, path, _| Value::from(path.to_uppercase())),
        );
        let env = Environment::default().with_hooks(hooks);
        let scope = Scope::default();

        assert_eq!(Value::from("NAME"), (env.hooks.simple)(&env.hooks, &scope, "name", &env));

        // Unknown helpers fall back to the overridden `simple`
        let value = evaluate_subexpr(&env.hooks, &scope, &call("missing", vec![]), &env);
        assert_eq!(Value::from("MISSING"), value);
    }
}
