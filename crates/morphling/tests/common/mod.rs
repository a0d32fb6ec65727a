#![allow(dead_code)]

use morphling::{equal_html, Environment, NodeId, Rendered, Value};

/// Compiles and renders `source`, then checks the output against `expected`
pub fn compiles_to(
    env: &Environment,
    source: &str,
    expected: &str,
    context: impl Into<Value>,
) -> Rendered {
    compiles_to_in(env, source, expected, context, None)
}

pub fn compiles_to_in(
    env: &Environment,
    source: &str,
    expected: &str,
    context: impl Into<Value>,
    contextual_element: Option<NodeId>,
) -> Rendered {
    let template = morphling::compile(source).expect("Template should compile");
    let rendered = template.render(context, env, contextual_element);
    assert_html(env, rendered.root.node(), expected);
    rendered
}

pub fn assert_html(env: &Environment, node: NodeId, expected: &str) {
    let actual = env.dom().serialize(node);
    assert!(
        equal_html(&actual, expected),
        "Expected `{}` to be equal to `{}`",
        actual,
        expected
    );
}

/// Element children of a node, in order
pub fn elements(env: &Environment, node: NodeId) -> Vec<NodeId> {
    let dom = env.dom();
    dom.child_nodes(node)
        .into_iter()
        .filter(|child| dom.tag_name(*child).is_some())
        .collect()
}
