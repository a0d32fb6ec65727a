use morphling_core::{
    AttributeNode, AttributePart, AttributeValue, MustacheNode, Param, Site, SubExpression,
};
use smallvec::{smallvec, SmallVec};

use crate::context::CompilerContext;

/// Name of the helper which joins attribute parts
pub const CONCAT_HELPER: &str = "concat";

impl CompilerContext {
    /// Registers an attribute site unless the value is static
    pub fn compile_dynamic_attribute(&mut self, attribute: &AttributeNode) {
        let (quoted, parts): (bool, SmallVec<[Param; 2]>) = match attribute.value {
            AttributeValue::Static(_) => return,
            AttributeValue::Mustache(ref mustache) => {
                (false, smallvec![mustache_param(mustache)])
            }
            AttributeValue::Concat(ref parts) => (true, parts.iter().map(part_param).collect()),
        };

        self.register_site(Site::Attribute {
            path: self.path.clone(),
            name: attribute.name.to_owned(),
            quoted,
            parts,
        });
    }
}

/// `{{path}}` is passed by name, anything else is a sub-expression
pub fn mustache_param(mustache: &MustacheNode) -> Param {
    if mustache.call.is_simple_path() {
        Param::Id(mustache.call.path.to_owned())
    } else {
        Param::SubExpr(Box::new(mustache.call.clone()))
    }
}

fn part_param(part: &AttributePart) -> Param {
    match part {
        AttributePart::Text(text) => Param::String(text.to_owned()),
        AttributePart::Mustache(mustache) => mustache_param(mustache),
    }
}

/// Converts an attribute into a hash value of a component invocation
pub fn attribute_param(value: &AttributeValue) -> Param {
    match value {
        AttributeValue::Static(text) => Param::String(text.to_owned()),
        AttributeValue::Mustache(mustache) => mustache_param(mustache),
        AttributeValue::Concat(parts) => {
            let mut concat = SubExpression::new(CONCAT_HELPER);
            concat.params = parts.iter().map(part_param).collect();
            Param::SubExpr(Box::new(concat))
        }
    }
}
