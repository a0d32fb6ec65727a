use morphling_core::{
    BlockNode, BuildOp, ComponentNode, HashPair, MustacheNode, Site, SiteKind,
};

use crate::{attributes::attribute_param, compile_program, context::CompilerContext};

/// Name of the helper which renders another template in place
pub const PARTIAL_HELPER: &str = "partial";

impl CompilerContext {
    pub fn compile_mustache(&mut self, mustache: &MustacheNode) {
        self.push_op(BuildOp::Placeholder);

        if mustache.call.path == PARTIAL_HELPER && mustache.call.literal.is_none() {
            self.program.features |= SiteKind::Partial;
        }

        self.register_site(Site::Content {
            path: self.path.clone(),
            call: mustache.call.clone(),
            escaped: mustache.escaped,
        });
    }

    pub fn compile_block(&mut self, block: &BlockNode) {
        self.push_op(BuildOp::Placeholder);

        let program = self.add_child(compile_program(&block.program));
        let inverse = block
            .inverse
            .as_ref()
            .map(|inverse| self.add_child(compile_program(inverse)));

        self.register_site(Site::Block {
            path: self.path.clone(),
            call: block.call.clone(),
            program,
            inverse,
        });
    }

    pub fn compile_component(&mut self, component: &ComponentNode) {
        self.push_op(BuildOp::Placeholder);

        let hash = component
            .attributes
            .iter()
            .map(|attribute| HashPair {
                key: attribute.name.to_owned(),
                value: attribute_param(&attribute.value),
            })
            .collect();

        let program = self.add_child(compile_program(&component.program));

        self.register_site(Site::Component {
            path: self.path.clone(),
            tag_name: component.tag_name.to_owned(),
            hash,
            program,
        });
    }
}

#[cfg(test)]
mod tests {
    use morphling_core::{BuildOp, Param, Site, SiteKind};

    use crate::test_utils::compile;

    #[test]
    fn it_anchors_mustaches_at_placeholders() {
        let program = compile("<p>a{{b}}c{{{d}}}</p>");

        assert_eq!(
            vec![
                BuildOp::OpenElement {
                    tag_name: "p".into(),
                    namespace: None
                },
                BuildOp::Text("a".into()),
                BuildOp::Placeholder,
                BuildOp::Text("c".into()),
                BuildOp::Placeholder,
                BuildOp::CloseElement,
            ],
            program.build
        );

        let Site::Content {
            ref path, escaped, ..
        } = program.sites[0]
        else {
            panic!("Not a content site")
        };
        assert_eq!(&[0, 1], path.as_slice());
        assert!(escaped);

        let Site::Content {
            ref path, escaped, ..
        } = program.sites[1]
        else {
            panic!("Not a content site")
        };
        assert_eq!(&[0, 3], path.as_slice());
        assert!(!escaped);
    }

    #[test]
    fn it_compiles_block_bodies_into_children() {
        let program = compile("{{#each list as |item|}}<li>{{item}}</li>{{else}}empty{{/each}}");

        assert_eq!(vec![BuildOp::Placeholder], program.build);
        assert_eq!(2, program.children.len());

        let Site::Block {
            program: body,
            inverse,
            ..
        } = program.sites[0]
        else {
            panic!("Not a block site")
        };
        assert_eq!(Some(1), inverse);

        let body = &program.children[body];
        assert_eq!(vec!["item"], body.block_params.to_vec());
        assert!(body.features.contains(SiteKind::Content));
        assert!(program.children[1].is_static());
    }

    #[test]
    fn it_turns_component_attributes_into_hash() {
        let program = compile(
            "<x-card title=\"Hi\" count={{n}} label={{format n}} href=\"/{{slug}}\">body</x-card>",
        );

        let Site::Component {
            ref tag_name,
            ref hash,
            program: body,
            ..
        } = program.sites[0]
        else {
            panic!("Not a component site")
        };

        assert_eq!("x-card", tag_name.as_str());
        assert_eq!(Param::String("Hi".into()), hash[0].value);
        assert_eq!(Param::Id("n".into()), hash[1].value);
        assert!(matches!(&hash[2].value, Param::SubExpr(call) if call.path == "format"));
        assert!(matches!(
            &hash[3].value,
            Param::SubExpr(call) if call.path == "concat" && call.params.len() == 2
        ));
        assert_eq!(
            vec![BuildOp::Text("body".into())],
            program.children[body].build
        );
    }
}
