//! Rendering of a compiled program: build the static structure,
//! then hydrate every dynamic site through the hooks.

use morphling_core::{BuildOp, NodePath, Param, Site, TemplateProgram};
use smallvec::{smallvec, SmallVec};
use tracing::trace;

use crate::{
    dom::{children_namespace_of, DomHelper, NodeId, NodeKind},
    helpers::HelperOptions,
    hooks::{evaluate_arguments, evaluate_subexpr, literal_value},
    morph::{Morph, MorphHandle},
    Environment, Scope, Value,
};

/// Root of a render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderResult {
    /// The template produced exactly one element, detached from any fragment
    Single(NodeId),
    /// A fragment holding everything else
    Sequence(NodeId),
}

impl RenderResult {
    #[inline]
    pub fn node(&self) -> NodeId {
        match *self {
            RenderResult::Single(node) | RenderResult::Sequence(node) => node,
        }
    }
}

#[derive(Debug)]
pub struct Rendered {
    pub root: RenderResult,
    /// Morphs of the top-level program in source order.
    /// Morphs of block bodies are owned by the helpers which rendered them.
    pub morphs: Vec<MorphHandle>,
}

/// Renders `program` with `scope`.
///
/// `contextual_element` is the element the result will be inserted into.
/// It decides the namespace of root elements and the parsing context of unescaped content.
pub fn render(
    program: &TemplateProgram,
    scope: &Scope,
    env: &Environment,
    contextual_element: Option<NodeId>,
) -> Rendered {
    let fragment = build_fragment(program, &mut *env.dom(), contextual_element);
    let mut morphs = Vec::new();

    if !program.is_static() {
        // Hydrating moves nodes around, so every path is resolved beforehand
        let targets = resolve_sites(program, &*env.dom(), fragment, contextual_element);

        for (site, target) in program.sites.iter().zip(targets) {
            hydrate_site(program, site, target, scope, env, &mut morphs);
        }
    }

    let root = normalize_root(&mut *env.dom(), fragment);
    Rendered { root, morphs }
}

fn build_fragment(
    program: &TemplateProgram,
    dom: &mut dyn DomHelper,
    contextual_element: Option<NodeId>,
) -> NodeId {
    let root_namespace = children_namespace_of(&*dom, contextual_element);
    let fragment = dom.create_fragment();
    let mut stack: SmallVec<[NodeId; 8]> = smallvec![fragment];

    for op in program.build.iter() {
        let parent = stack.last().copied().unwrap_or(fragment);

        match op {
            BuildOp::OpenElement {
                tag_name,
                namespace,
            } => {
                let element = dom.create_element(tag_name, namespace.unwrap_or(root_namespace));
                dom.append_child(parent, element);
                stack.push(element);
            }
            BuildOp::SetAttribute { name, value } => dom.set_attribute(parent, name, value),
            BuildOp::CloseElement => {
                if stack.len() > 1 {
                    stack.pop();
                }
            }
            BuildOp::Text(text) => {
                let text = dom.create_text(text);
                dom.append_child(parent, text);
            }
            BuildOp::Comment(comment) => {
                let comment = dom.create_comment(comment);
                dom.append_child(parent, comment);
            }
            BuildOp::Placeholder => {
                let placeholder = dom.create_text("");
                dom.append_child(parent, placeholder);
            }
        }
    }

    fragment
}

/// Live node of a site plus the contextual element of a morph anchored there
#[derive(Debug, Clone, Copy)]
struct SiteTarget {
    node: NodeId,
    contextual_element: Option<NodeId>,
}

fn resolve_sites(
    program: &TemplateProgram,
    dom: &dyn DomHelper,
    fragment: NodeId,
    contextual_element: Option<NodeId>,
) -> Vec<SiteTarget> {
    program
        .sites
        .iter()
        .map(|site| {
            let (node, parent) = resolve_path(dom, fragment, site.path());
            SiteTarget {
                node,
                contextual_element: if parent == fragment {
                    contextual_element
                } else {
                    Some(parent)
                },
            }
        })
        .collect()
}

/// Follows child indices from the fragment, returns the node and its parent
fn resolve_path(dom: &dyn DomHelper, fragment: NodeId, path: &NodePath) -> (NodeId, NodeId) {
    let mut parent = fragment;
    let mut node = fragment;

    for idx in path.iter() {
        match dom.child_nodes(node).get(*idx as usize) {
            Some(child) => {
                parent = node;
                node = *child;
            }
            None => break,
        }
    }

    (node, parent)
}

fn hydrate_site(
    program: &TemplateProgram,
    site: &Site,
    target: SiteTarget,
    scope: &Scope,
    env: &Environment,
    morphs: &mut Vec<MorphHandle>,
) {
    let hooks = &env.hooks;
    let kind: &'static str = site.kind().into();
    trace!(kind, path = ?site.path(), "Hydrating site");

    match site {
        Site::Content { call, escaped, .. } => {
            let morph = Morph::new(target.node, *escaped, target.contextual_element).into_handle();
            let (params, hash) = evaluate_arguments(hooks, scope, call, env);
            let options = HelperOptions {
                morph: Some(morph.clone()),
                contextual_element: target.contextual_element,
                ..HelperOptions::for_call(call, scope)
            };

            (hooks.content)(hooks, &morph, &call.path, scope, &params, &hash, &options, env);
            morphs.push(morph);
        }

        Site::Block {
            call,
            program: body,
            inverse,
            ..
        } => {
            let morph = Morph::new(target.node, true, target.contextual_element).into_handle();
            let (params, hash) = evaluate_arguments(hooks, scope, call, env);
            let template = program.child(*body).cloned();
            let block_params = template
                .as_ref()
                .filter(|template| !template.block_params.is_empty())
                .map(|template| template.block_params.len());

            let options = HelperOptions {
                morph: Some(morph.clone()),
                contextual_element: target.contextual_element,
                block_params,
                template,
                inverse_template: inverse.and_then(|inverse| program.child(inverse).cloned()),
                ..HelperOptions::for_call(call, scope)
            };

            (hooks.content)(hooks, &morph, &call.path, scope, &params, &hash, &options, env);
            morphs.push(morph);
        }

        Site::Component {
            tag_name,
            hash,
            program: body,
            ..
        } => {
            let morph = Morph::new(target.node, true, target.contextual_element).into_handle();
            let options = HelperOptions {
                morph: Some(morph.clone()),
                contextual_element: target.contextual_element,
                hash_types: hash
                    .iter()
                    .map(|pair| (pair.key.to_owned(), pair.value.param_type()))
                    .collect(),
                template: program.child(*body).cloned(),
                ..HelperOptions::new(scope.clone())
            };

            (hooks.component)(hooks, &morph, tag_name, scope, hash, &options, env);
            morphs.push(morph);
        }

        Site::Attribute {
            name,
            quoted,
            parts,
            ..
        } => {
            let values: SmallVec<[Value; 2]> = parts
                .iter()
                .map(|part| match part {
                    // Ids are resolved by the hook itself
                    Param::Id(path) => Value::from(path.as_str()),
                    Param::SubExpr(sexpr) => evaluate_subexpr(hooks, scope, sexpr, env),
                    literal => literal_value(literal),
                })
                .collect();

            let options = HelperOptions {
                element: Some(target.node),
                param_types: parts.iter().map(Param::param_type).collect(),
                ..HelperOptions::new(scope.clone())
            };

            (hooks.attribute)(
                hooks,
                target.node,
                name,
                *quoted,
                scope,
                &values,
                &options,
                env,
            );
        }

        Site::Modifier { call, .. } => {
            let (params, hash) = evaluate_arguments(hooks, scope, call, env);
            let options = HelperOptions {
                element: Some(target.node),
                ..HelperOptions::for_call(call, scope)
            };

            (hooks.element)(
                hooks,
                target.node,
                &call.path,
                scope,
                &params,
                &hash,
                &options,
                env,
            );
        }
    }
}

/// A single root element is returned on its own
fn normalize_root(dom: &mut dyn DomHelper, fragment: NodeId) -> RenderResult {
    let children = dom.child_nodes(fragment);

    match children[..] {
        [only] if dom.kind(only) == NodeKind::Element => {
            dom.remove_child(fragment, only);
            RenderResult::Single(only)
        }
        _ => RenderResult::Sequence(fragment),
    }
}
