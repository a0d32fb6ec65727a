use morphling_core::{
    children_namespace, fixed_namespace, is_integration_point, AttributeValue, BuildOp,
    ElementNode, Namespace, Site,
};

use crate::context::CompilerContext;

impl CompilerContext {
    /// Emits the element, its static attributes, then its sites
    /// (modifiers first, then dynamic attributes) and finally its children.
    pub fn compile_element(&mut self, element: &ElementNode) {
        let tag_name = element.tag_name.as_str();

        // `None` means the namespace is decided by where the result gets rendered
        let namespace = fixed_namespace(tag_name).or(self.namespace);

        self.push_op(BuildOp::OpenElement {
            tag_name: tag_name.to_owned(),
            namespace,
        });

        for attribute in element.attributes.iter() {
            if let AttributeValue::Static(ref value) = attribute.value {
                self.push_op(BuildOp::SetAttribute {
                    name: attribute.name.to_owned(),
                    value: value.to_owned(),
                });
            }
        }

        for modifier in element.modifiers.iter() {
            self.register_site(Site::Modifier {
                path: self.path.clone(),
                call: modifier.clone(),
            });
        }

        for attribute in element.attributes.iter() {
            self.compile_dynamic_attribute(attribute);
        }

        let children_ns = match namespace {
            Some(ns) => Some(children_namespace(tag_name, ns)),
            None if is_integration_point(tag_name) => Some(Namespace::Xhtml),
            None => None,
        };

        let parent_ns = std::mem::replace(&mut self.namespace, children_ns);
        self.compile_children(&element.children);
        self.namespace = parent_ns;

        self.push_op(BuildOp::CloseElement);
    }
}
