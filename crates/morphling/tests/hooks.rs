mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{assert_html, compiles_to};
use morphling::hooks::defaults;
use morphling::{hydration_hooks, Environment, HookOverrides, Object, Value};

type Callback = Rc<RefCell<Option<Box<dyn Fn(&Environment)>>>>;

fn empty() -> Object {
    Object::new()
}

fn invoke(callback: &Callback, env: &Environment) {
    if let Some(callback) = callback.borrow().as_ref() {
        callback(env);
    }
}

#[test]
fn it_overrides_path_lookups() {
    let hooks = hydration_hooks(HookOverrides::new().simple(|hooks, scope, path, env| {
        match path {
            "foo" => Value::from("foo"),
            "foo.bar" => Value::from("foo-bar"),
            _ => defaults::simple(hooks, scope, path, env),
        }
    }));
    let env = Environment::default().with_hooks(hooks);
    let context: Object = [("zomg", "hello")].into_iter().collect();

    compiles_to(
        &env,
        "<div>{{foo}}</div><div>{{foo.bar}}</div><div>{{zomg}}</div>",
        "<div>foo</div><div>foo-bar</div><div>hello</div>",
        context,
    );
}

#[test]
fn it_rebinds_text_nodes() {
    let callback: Callback = Default::default();
    let slot = callback.clone();

    let hooks = hydration_hooks(HookOverrides::new().content(
        move |hooks, morph, path, scope, _, _, _, env| {
            let morph = morph.clone();
            let scope = scope.clone();
            let path = path.to_owned();
            let simple = hooks.simple.clone();
            let hooks = hooks.clone();

            let update = move |env: &Environment| {
                let value = simple(&hooks, &scope, &path, env);
                morph.borrow_mut().update(env, value);
            };
            update(env);
            *slot.borrow_mut() = Some(Box::new(update));
        },
    ));
    let env = Environment::default().with_hooks(hooks);
    let context: Object = [("title", "hello")].into_iter().collect();

    let rendered = compiles_to(
        &env,
        "<div>{{title}}</div>",
        "<div>hello</div>",
        context.clone(),
    );
    let node = rendered.root.node();

    context.set("title", "goodbye");
    invoke(&callback, &env);
    assert_html(&env, node, "<div>goodbye</div>");

    context.set("title", "brown cow");
    invoke(&callback, &env);
    assert_html(&env, node, "<div>brown cow</div>");
}

#[test]
fn it_rebinds_unescaped_fragments() {
    let env = Environment::default();
    let context: Object = [("title", "<p>hello</p>")].into_iter().collect();

    let rendered = compiles_to(&env, "<div>{{{title}}}</div>", "<div><p>hello</p></div>", context);
    let morph = rendered.morphs[0].clone();
    assert!(!morph.borrow().escaped);

    morph
        .borrow_mut()
        .update(&env, Value::from("<span>goodbye</span> and <b>more</b>"));
    assert_html(
        &env,
        rendered.root.node(),
        "<div><span>goodbye</span> and <b>more</b></div>",
    );

    morph.borrow_mut().update(&env, Value::from("plain"));
    assert_html(&env, rendered.root.node(), "<div>plain</div>");

    morph.borrow_mut().clear(&env);
    assert_html(&env, rendered.root.node(), "<div></div>");
}

#[test]
fn it_tells_morphs_about_escaping() {
    let escaped = Rc::new(RefCell::new(Vec::new()));
    let seen = escaped.clone();

    let hooks = hydration_hooks(HookOverrides::new().content(
        move |hooks, morph, path, scope, params, hash, options, env| {
            seen.borrow_mut().push(morph.borrow().escaped);
            defaults::content(hooks, morph, path, scope, params, hash, options, env);
        },
    ));
    let env = Environment::default().with_hooks(hooks);
    let context: Object = [("a", "<b>a</b>"), ("b", "<b>b</b>")].into_iter().collect();

    compiles_to(
        &env,
        "<div>{{{a}}}{{b}}</div>",
        "<div><b>a</b>&lt;b&gt;b&lt;/b&gt;</div>",
        context,
    );
    assert_eq!(vec![false, true], *escaped.borrow());
}

#[test]
fn it_overrides_helper_lookups() {
    let hooks = hydration_hooks(HookOverrides::new().lookup_helper(
        |hooks, name, scope, env| match name {
            "shout" => Some(morphling::Helper::custom(|_, params, _, _, _| {
                Value::from(params[0].to_str().to_uppercase())
            })),
            _ => defaults::lookup_helper(hooks, name, scope, env),
        },
    ));
    let env = Environment::default().with_hooks(hooks);
    let context: Object = [("name", "tom")].into_iter().collect();

    compiles_to(
        &env,
        "<p>{{shout name}} {{concat name \"!\"}}</p>",
        "<p>TOM tom!</p>",
        context,
    );
}

#[test]
fn it_overrides_attributes_and_partials() {
    let hooks = hydration_hooks(
        HookOverrides::new()
            .attribute(|hooks, element, name, quoted, scope, parts, options, env| {
                let name = format!("data-{}", name);
                defaults::attribute(hooks, element, &name, quoted, scope, parts, options, env);
            })
            .partial(|_, _, params, _, _, _| Value::from(format!("partial {}", params[0]))),
    );
    let env = Environment::default().with_hooks(hooks);
    let context: Object = [("kind", "big")].into_iter().collect();

    compiles_to(
        &env,
        "<div class=\"a {{kind}}\">{{partial \"box\"}}</div>",
        "<div data-class=\"a big\">partial box</div>",
        context,
    );
}

#[test]
fn it_renders_block_helpers() {
    let mut env = Environment::default();
    env.register_helper("testing", |scope, _, _, options, env| {
        options.render(scope.context().clone(), env, None, &[])
    });

    compiles_to(
        &env,
        "<div>{{#testing}}<div id=\"test\">123</div>{{/testing}}</div>",
        "<div><div id=\"test\">123</div></div>",
        empty(),
    );
    compiles_to(
        &env,
        "{{#testing}}<p>hello</p>{{/testing}}",
        "<p>hello</p>",
        empty(),
    );
}

#[test]
fn it_renders_the_inverse_of_block_helpers() {
    let mut env = Environment::default();
    env.register_helper("testing", |scope, _, _, options, env| {
        assert!(options.has_inverse());
        options.inverse(scope.context().clone(), env, None, &[])
    });
    env.register_helper("body", |scope, _, _, options, env| {
        options.render(scope.context().clone(), env, None, &[])
    });

    compiles_to(
        &env,
        "<div>{{#testing}}hello{{else}}<b>goodbye</b>{{/testing}}</div>",
        "<div><b>goodbye</b></div>",
        empty(),
    );
    compiles_to(
        &env,
        "<div>{{#body}}hello{{else}}goodbye{{/body}}</div>",
        "<div>hello</div>",
        empty(),
    );
}

#[test]
fn it_passes_a_context_to_block_bodies() {
    let mut env = Environment::default();
    env.register_helper("with", |_, params, _, options, env| {
        options.render(params.first().cloned().unwrap_or_default(), env, None, &[])
    });

    let person: Object = [("name", "Tom Dale")].into_iter().collect();
    let context: Object = [("person", person)].into_iter().collect();

    compiles_to(
        &env,
        "<div>{{#with person}}{{name}} {{this.name}}{{/with}}</div>",
        "<div>Tom Dale Tom Dale</div>",
        context,
    );
}

#[test]
fn it_delegates_blocks_to_the_default_content_hook() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let seen = calls.clone();

    let hooks = hydration_hooks(HookOverrides::new().content(
        move |hooks, morph, path, scope, params, hash, options, env| {
            seen.borrow_mut().push((path.to_owned(), options.has_block()));
            defaults::content(hooks, morph, path, scope, params, hash, options, env);
        },
    ));
    let mut env = Environment::default().with_hooks(hooks);
    env.register_helper("if", |scope, params, _, options, env| {
        if params[0].is_truthy() {
            options.render(scope.context().clone(), env, None, &[])
        } else {
            options.inverse(scope.context().clone(), env, None, &[])
        }
    });
    let context: Object = [("ok", Value::from(true)), ("name", Value::from("x"))]
        .into_iter()
        .collect();

    compiles_to(
        &env,
        "{{#if ok}}<b>{{name}}</b>{{else}}no{{/if}}",
        "<b>x</b>",
        context,
    );
    assert_eq!(
        vec![("if".to_owned(), true), ("name".to_owned(), false)],
        *calls.borrow()
    );
}

#[test]
fn it_passes_hash_arguments_to_blocks() {
    let mut env = Environment::default();
    env.register_helper("testing", |scope, _, hash, options, env| {
        if hash.get("truth").is_some_and(Value::is_truthy) {
            options.render(scope.context().clone(), env, None, &[])
        } else {
            Value::Undefined
        }
    });

    compiles_to(
        &env,
        "<div>{{#testing truth=true}}<p>Yep!</p>{{/testing}}{{#testing truth=false}}<p>Nope!</p>{{/testing}}</div>",
        "<div><p>Yep!</p></div>",
        empty(),
    );
}

fn serialized_block(
    prefix: &'static str,
    args: &'static [&'static str],
) -> impl Fn(&morphling::Scope, &[Value], &morphling::Hash, &morphling::HelperOptions, &Environment) -> Value
{
    move |scope, _, _, options, env| {
        let args: Vec<Value> = args.iter().copied().map(Value::from).collect();
        let body = options.render(scope.context().clone(), env, None, &args);

        let html = match body {
            Value::Node(node) => env.dom().serialize(node),
            _ => String::new(),
        };
        Value::from(format!("{}({})", prefix, html))
    }
}

#[test]
fn it_binds_block_params() {
    let mut env = Environment::default();
    env.register_helper("a", serialized_block("A", &["W", "X1"]));
    env.register_helper("b", serialized_block("B", &["X2", "Y"]));
    env.register_helper("c", serialized_block("C", &["Z"]));

    compiles_to(
        &env,
        "{{#a as |w x|}}{{w}},{{x}} {{#b as |x y|}}{{x}},{{y}}{{/b}} {{w}},{{x}} {{#c as |z|}}{{x}},{{z}}{{/c}}{{/a}}",
        "A(W,X1 B(X2,Y) W,X1 C(X1,Z))",
        empty(),
    );
}

#[test]
fn it_counts_block_params() {
    let mut env = Environment::default();
    env.register_helper("count-block-params", |_, _, _, options, _| {
        Value::from(format!("{:?}", options.block_params))
    });

    compiles_to(
        &env,
        "{{#count-block-params}}{{/count-block-params}}",
        "None",
        empty(),
    );
    compiles_to(
        &env,
        "{{#count-block-params as |x y z|}}{{/count-block-params}}",
        "Some(3)",
        empty(),
    );
}

#[test]
fn it_calls_element_helpers() {
    let mut env = Environment::default();
    env.register_helper("testing", |_, _, _, options, env| {
        if let Some(element) = options.element {
            env.dom().set_attribute(element, "zomg", "zomg");
        }
        Value::Undefined
    });

    compiles_to(&env, "<div {{testing}}>hello</div>", "<div zomg=\"zomg\">hello</div>", empty());
    compiles_to(
        &env,
        "<span {{testing}}></span>{{testing}}",
        "<span zomg=\"zomg\"></span>",
        empty(),
    );
    compiles_to(
        &env,
        "a<span {{testing}}></span>",
        "a<span zomg=\"zomg\"></span>",
        empty(),
    );
    compiles_to(
        &env,
        "<span {{testing}}></span><span {{testing}}></span>",
        "<span zomg=\"zomg\"></span><span zomg=\"zomg\"></span>",
        empty(),
    );

    // Unknown element helpers are ignored
    compiles_to(&env, "<div {{missing}}></div>", "<div></div>", empty());
}

#[test]
fn it_binds_attributes_from_element_helpers() {
    let callback: Callback = Default::default();
    let slot = callback.clone();

    let mut env = Environment::default();
    env.register_helper("bind-class", move |scope, _, hash, options, env| {
        let (Some(element), Some(path)) = (options.element, hash.get("path")) else {
            return Value::Undefined;
        };
        let scope = scope.clone();
        let path = path.to_str().into_owned();

        let update = move |env: &Environment| {
            let value = scope.lookup(&path);
            env.dom().set_attribute(element, "class", &value.to_str());
        };
        update(env);
        *slot.borrow_mut() = Some(Box::new(update));
        Value::Undefined
    });
    let context: Object = [("color", "red")].into_iter().collect();

    let rendered = compiles_to(
        &env,
        "<div {{bind-class path=\"color\"}}>hello</div>",
        "<div class=\"red\">hello</div>",
        context.clone(),
    );

    context.set("color", "green");
    invoke(&callback, &env);
    assert_html(&env, rendered.root.node(), "<div class=\"green\">hello</div>");
}
