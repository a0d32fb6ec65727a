//! Default hook implementations.
//!
//! These are public so that overriding hooks can delegate to them.

use morphling_core::{element_namespace, HashPair, ParamType};
use tracing::{debug, warn};

use super::{evaluate_param, resolve_hash, Hooks};
use crate::{
    dom::{children_namespace_of, NodeId},
    helpers::{BuiltinHelper, Hash, Helper, HelperOptions},
    morph::MorphHandle,
    render::render,
    Environment, Scope, Value,
};

/// Registered helpers first, then the builtins
pub fn lookup_helper(
    _hooks: &Hooks,
    name: &str,
    _scope: &Scope,
    env: &Environment,
) -> Option<Helper> {
    env.helpers
        .get(name)
        .cloned()
        .or_else(|| BuiltinHelper::lookup(name).map(Helper::Builtin))
}

pub fn simple(_hooks: &Hooks, scope: &Scope, path: &str, _env: &Environment) -> Value {
    scope.lookup(path)
}

#[allow(clippy::too_many_arguments)]
pub fn content(
    hooks: &Hooks,
    morph: &MorphHandle,
    path: &str,
    scope: &Scope,
    params: &[Value],
    hash: &Hash,
    options: &HelperOptions,
    env: &Environment,
) {
    let value = match (hooks.lookup_helper)(hooks, path, scope, env) {
        Some(helper) => helper.call(scope, params, hash, options, env),
        None if options.is_literal => Value::from(path),
        None => (hooks.simple)(hooks, scope, path, env),
    };

    morph.borrow_mut().update(env, value);
}

pub fn component(
    hooks: &Hooks,
    morph: &MorphHandle,
    tag_name: &str,
    scope: &Scope,
    hash: &[HashPair],
    options: &HelperOptions,
    env: &Environment,
) {
    let value = match (hooks.lookup_helper)(hooks, tag_name, scope, env) {
        Some(helper) => {
            let hash = resolve_hash(hooks, scope, hash, env);
            helper.call(scope, &[], &hash, options, env)
        }
        None => (hooks.component_fallback)(hooks, morph, tag_name, scope, hash, options, env),
    };

    morph.borrow_mut().update(env, value);
}

/// Renders an unknown component as a plain element:
/// hash pairs become attributes and the body becomes its children
pub fn component_fallback(
    hooks: &Hooks,
    morph: &MorphHandle,
    tag_name: &str,
    scope: &Scope,
    hash: &[HashPair],
    options: &HelperOptions,
    env: &Environment,
) -> Value {
    let contextual_element = morph.borrow().contextual_element;

    let element = {
        let mut dom = env.dom();
        let namespace = element_namespace(
            tag_name,
            children_namespace_of(&*dom, contextual_element),
        );
        dom.create_element(tag_name, namespace)
    };

    for pair in hash.iter() {
        let value = evaluate_param(hooks, scope, &pair.value, env);
        if !value.is_nullish() {
            env.dom()
                .set_attribute(element, &pair.key, &value.to_str());
        }
    }

    if let Value::Node(body) = options.render(scope.context().clone(), env, Some(element), &[]) {
        env.dom().append_child(element, body);
    }

    Value::Node(element)
}

#[allow(clippy::too_many_arguments)]
pub fn element(
    hooks: &Hooks,
    element: NodeId,
    path: &str,
    scope: &Scope,
    params: &[Value],
    hash: &Hash,
    options: &HelperOptions,
    env: &Environment,
) {
    match (hooks.lookup_helper)(hooks, path, scope, env) {
        Some(helper) => {
            let options = HelperOptions {
                element: Some(element),
                ..options.clone()
            };
            helper.call(scope, params, hash, &options, env);
        }
        None => debug!(path, "No helper for element modifier"),
    }
}

/// Quoted values are concatenated, an unquoted value is taken as is.
/// A nullish value removes the attribute.
#[allow(clippy::too_many_arguments)]
pub fn attribute(
    hooks: &Hooks,
    element: NodeId,
    name: &str,
    quoted: bool,
    scope: &Scope,
    parts: &[Value],
    options: &HelperOptions,
    env: &Environment,
) {
    let value = if quoted {
        (hooks.concat)(hooks, scope, parts, options, env)
    } else {
        match (parts.first(), options.param_types.first()) {
            (Some(part), Some(ParamType::Id)) => (hooks.simple)(hooks, scope, &part.to_str(), env),
            (Some(part), _) => part.clone(),
            (None, _) => Value::Undefined,
        }
    };

    let mut dom = env.dom();
    if value.is_nullish() {
        dom.remove_attribute(element, name);
    } else {
        dom.set_attribute(element, name, &value.to_str());
    }
}

/// Joins the parts, `id` parts are resolved first
pub fn concat(
    hooks: &Hooks,
    scope: &Scope,
    parts: &[Value],
    options: &HelperOptions,
    env: &Environment,
) -> Value {
    let joined: String = parts
        .iter()
        .enumerate()
        .map(|(idx, part)| match options.param_types.get(idx) {
            Some(ParamType::Id) => (hooks.simple)(hooks, scope, &part.to_str(), env)
                .to_str()
                .into_owned(),
            _ => part.to_str().into_owned(),
        })
        .collect();

    Value::String(joined)
}

pub fn subexpr(
    hooks: &Hooks,
    path: &str,
    scope: &Scope,
    params: &[Value],
    hash: &Hash,
    options: &HelperOptions,
    env: &Environment,
) -> Value {
    match (hooks.lookup_helper)(hooks, path, scope, env) {
        Some(helper) => helper.call(scope, params, hash, options, env),
        None => (hooks.simple)(hooks, scope, path, env),
    }
}

/// Renders the partial named by the first param against the current scope
pub fn partial(
    _hooks: &Hooks,
    scope: &Scope,
    params: &[Value],
    _hash: &Hash,
    options: &HelperOptions,
    env: &Environment,
) -> Value {
    let name = params.first().map(|p| p.to_str()).unwrap_or_default();

    let Some(template) = env.partials.get(&*name) else {
        warn!(%name, "Partial is not registered");
        return Value::Undefined;
    };

    let contextual_element = options
        .morph
        .as_ref()
        .and_then(|morph| morph.borrow().contextual_element)
        .or(options.contextual_element);

    let rendered = render(template, scope, env, contextual_element);
    Value::Node(rendered.root.node())
}

/// Writes into the context object, other contexts are left alone
pub fn set(_hooks: &Hooks, scope: &Scope, name: &str, value: Value, _env: &Environment) {
    if let Value::Object(object) = scope.context() {
        object.set(name, value);
    }
}

#[cfg(test)]
mod tests {
    use morphling_core::Namespace;

    use super::*;
    use crate::Object;

    #[test]
    fn it_applies_the_attribute_null_policy() {
        let env = Environment::default();
        let div = env.dom().create_element("div", Namespace::Xhtml);
        let context: Object = [("name", Value::Null)].into_iter().collect();
        let scope = Scope::new(context);
        let options = HelperOptions {
            param_types: [ParamType::Id].into_iter().collect(),
            ..HelperOptions::new(scope.clone())
        };
        let parts = [Value::from("name")];

        attribute(&env.hooks, div, "class", true, &scope, &parts, &options, &env);
        assert_eq!(Some("null"), env.dom().get_attribute(div, "class"));

        attribute(&env.hooks, div, "class", false, &scope, &parts, &options, &env);
        assert_eq!(None, env.dom().get_attribute(div, "class"));
    }

    #[test]
    fn it_writes_into_the_context() {
        let env = Environment::default();
        let context = Object::new();
        let scope = Scope::new(context.clone());

        set(&env.hooks, &scope, "title", Value::from("set"), &env);
        assert_eq!(Value::from("set"), context.get("title"));

        // Non-objects are left alone
        set(&env.hooks, &Scope::new("text"), "title", Value::Null, &env);
    }

    #[test]
    fn it_prefers_registered_helpers() {
        let mut env = Environment::default();
        assert!(matches!(
            lookup_helper(&env.hooks, "concat", &Scope::default(), &env),
            Some(Helper::Builtin(BuiltinHelper::Concat))
        ));

        env.register_helper("concat", |_, _, _, _, _| Value::from("custom"));
        assert!(matches!(
            lookup_helper(&env.hooks, "concat", &Scope::default(), &env),
            Some(Helper::Custom(_))
        ));
        assert!(lookup_helper(&env.hooks, "nothing", &Scope::default(), &env).is_none());
    }
}
