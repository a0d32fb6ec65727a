mod common;

use common::compiles_to_in;
use morphling::{Environment, Namespace, NodeId, Object, RenderResult, Value};

/// First element named `tag_name` below `node`, depth first
fn find(env: &Environment, node: NodeId, tag_name: &str) -> Option<NodeId> {
    let children = env.dom().child_nodes(node);

    for child in children {
        if env.dom().tag_name(child) == Some(tag_name) {
            return Some(child);
        }
        if let Some(found) = find(env, child, tag_name) {
            return Some(found);
        }
    }

    None
}

fn namespace_of(env: &Environment, root: NodeId, tag_name: &str) -> Option<Namespace> {
    let node = find(env, root, tag_name)?;
    let dom = env.dom();
    dom.namespace(node)
}

/// Wraps the render root so that a single root element can be found too
fn render(
    env: &Environment,
    source: &str,
    context: impl Into<Value>,
    contextual_element: Option<NodeId>,
) -> NodeId {
    let template = morphling::compile(source).expect("Should compile");
    let rendered = template.render(context, env, contextual_element);

    let mut dom = env.dom();
    let wrapper = dom.create_fragment();
    let root = match rendered.root {
        RenderResult::Single(node) => node,
        RenderResult::Sequence(fragment) => {
            let holder = dom.create_element("div", Namespace::Xhtml);
            dom.append_child(holder, fragment);
            holder
        }
    };
    dom.append_child(wrapper, root);
    wrapper
}

fn testing_block(env: &mut Environment) {
    env.register_helper("testing", |scope, _, _, options, env| {
        options.render(scope.context().clone(), env, None, &[])
    });
}

#[test]
fn it_puts_svg_elements_in_the_svg_namespace() {
    let env = Environment::default();
    let root = render(
        &env,
        "<svg><path stroke=\"black\" d=\"M 0 0 L 100 100\"></path></svg>",
        Object::new(),
        None,
    );

    assert_eq!(Some(Namespace::Svg), namespace_of(&env, root, "svg"));
    assert_eq!(Some(Namespace::Svg), namespace_of(&env, root, "path"));
}

#[test]
fn it_switches_back_to_html_inside_foreign_object() {
    let env = Environment::default();
    let root = render(
        &env,
        "<svg><foreignObject><div></div></foreignObject></svg>",
        Object::new(),
        None,
    );

    assert_eq!(Some(Namespace::Svg), namespace_of(&env, root, "foreignObject"));
    assert_eq!(Some(Namespace::Xhtml), namespace_of(&env, root, "div"));
}

#[test]
fn it_pops_back_to_the_parent_namespace() {
    let env = Environment::default();
    let root = render(
        &env,
        "<svg><circle></circle></svg><span></span>",
        Object::new(),
        None,
    );

    assert_eq!(Some(Namespace::Svg), namespace_of(&env, root, "circle"));
    assert_eq!(Some(Namespace::Xhtml), namespace_of(&env, root, "span"));
}

#[test]
fn it_keeps_the_case_of_svg_tags() {
    let env = Environment::default();
    let source = "<svg><linearGradient id=\"g\"><stop offset=\"0\"></stop></linearGradient></svg>";
    let template = morphling::compile(source).expect("Should compile");
    let rendered = template.render(Object::new(), &env, None);

    let root = rendered.root.node();
    assert_eq!(source, env.dom().serialize(root));
    assert!(find(&env, root, "linearGradient").is_some());
}

#[test]
fn it_hydrates_inside_svg() {
    let env = Environment::default();
    let context: Object = [("name", "Joe"), ("shape", "<circle></circle>")]
        .into_iter()
        .collect();

    let root = render(
        &env,
        "<div><svg>{{name}}{{{shape}}}</svg></div>",
        context.clone(),
        None,
    );
    common::assert_html(&env, root, "<div><svg>Joe<circle></circle></svg></div>");
    assert_eq!(Some(Namespace::Svg), namespace_of(&env, root, "circle"));

    let root = render(&env, "<svg>{{name}}</svg>", context, None);
    common::assert_html(&env, root, "<svg>Joe</svg>");
    assert_eq!(Some(Namespace::Svg), namespace_of(&env, root, "svg"));
}

#[test]
fn it_renders_root_elements_in_the_contextual_namespace() {
    let env = Environment::default();
    let svg = env.dom().create_element("svg", Namespace::Svg);

    let root = render(&env, "<circle></circle><rect></rect>", Object::new(), Some(svg));
    assert_eq!(Some(Namespace::Svg), namespace_of(&env, root, "circle"));
    assert_eq!(Some(Namespace::Svg), namespace_of(&env, root, "rect"));

    // A root `svg` is always svg
    let root = render(&env, "<svg></svg>", Object::new(), None);
    assert_eq!(Some(Namespace::Svg), namespace_of(&env, root, "svg"));
}

#[test]
fn it_bleeds_the_namespace_into_block_bodies() {
    let mut env = Environment::default();
    testing_block(&mut env);

    let root = render(
        &env,
        "<div><svg>{{#testing}}<circle />{{/testing}}</svg></div>",
        Object::new(),
        None,
    );
    common::assert_html(&env, root, "<div><svg><circle></circle></svg></div>");
    assert_eq!(Some(Namespace::Svg), namespace_of(&env, root, "circle"));

    let root = render(
        &env,
        "<svg>{{#testing}}<circle />{{/testing}}</svg>",
        Object::new(),
        None,
    );
    assert_eq!(Some(Namespace::Svg), namespace_of(&env, root, "circle"));
}

#[test]
fn it_resets_the_namespace_inside_block_bodies() {
    let mut env = Environment::default();
    testing_block(&mut env);

    let root = render(
        &env,
        "<svg>{{#testing}}<foreignObject><div>{{#testing}}<span></span>{{/testing}}</div></foreignObject>{{/testing}}</svg>",
        Object::new(),
        None,
    );

    assert_eq!(Some(Namespace::Svg), namespace_of(&env, root, "foreignObject"));
    assert_eq!(Some(Namespace::Xhtml), namespace_of(&env, root, "div"));
    assert_eq!(Some(Namespace::Xhtml), namespace_of(&env, root, "span"));
}

#[test]
fn it_passes_the_contextual_element_to_block_renders() {
    let mut env = Environment::default();
    env.register_helper("in-svg", |scope, _, _, options, env| {
        let svg = env.dom().create_element("svg", Namespace::Svg);
        options.render(scope.context().clone(), env, Some(svg), &[])
    });

    let root = render(
        &env,
        "<div>{{#in-svg}}<circle></circle>{{/in-svg}}</div>",
        Object::new(),
        None,
    );
    assert_eq!(Some(Namespace::Svg), namespace_of(&env, root, "circle"));
}

#[test]
fn it_renders_root_foreign_object_in_an_svg_context() {
    let env = Environment::default();
    let svg = env.dom().create_element("svg", Namespace::Svg);

    let root = compiles_to_in(
        &env,
        "<foreignObject><div></div></foreignObject>",
        "<foreignObject><div></div></foreignObject>",
        Object::new(),
        Some(svg),
    )
    .root
    .node();

    let dom = env.dom();
    assert_eq!(Some(Namespace::Svg), dom.namespace(root));
    let div = dom.child_nodes(root)[0];
    assert_eq!(Some(Namespace::Xhtml), dom.namespace(div));
}

#[test]
fn it_keeps_dashed_svg_elements_as_elements() {
    let env = Environment::default();
    let source = "<svg><font-face font-family=\"a\"><font-face-src></font-face-src></font-face><missing-glyph></missing-glyph></svg>";

    let root = render(&env, source, Object::new(), None);
    common::assert_html(&env, root, source);
    assert_eq!(Some(Namespace::Svg), namespace_of(&env, root, "font-face"));
    assert_eq!(Some(Namespace::Svg), namespace_of(&env, root, "font-face-src"));
    assert_eq!(Some(Namespace::Svg), namespace_of(&env, root, "missing-glyph"));
}
