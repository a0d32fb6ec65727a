use std::rc::Rc;

use smallvec::SmallVec;

use crate::Value;

/// Lexical scope of a render: the context value plus the block parameters
/// bound by enclosing blocks.
///
/// Scopes are immutable, binding creates a new scope which shares its parent frames.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    context: Value,
    locals: Option<Rc<LocalFrame>>,
}

#[derive(Debug)]
struct LocalFrame {
    bindings: SmallVec<[(String, Value); 2]>,
    parent: Option<Rc<LocalFrame>>,
}

impl Scope {
    pub fn new(context: impl Into<Value>) -> Self {
        Scope {
            context: context.into(),
            locals: None,
        }
    }

    #[inline]
    pub fn context(&self) -> &Value {
        &self.context
    }

    /// Same block parameters, different context
    pub fn with_context(&self, context: Value) -> Scope {
        Scope {
            context,
            locals: self.locals.clone(),
        }
    }

    /// Binds `values` to `names` positionally on top of this scope.
    /// Names without a value are bound to `Undefined`.
    pub fn bind<S: AsRef<str>>(&self, names: &[S], values: &[Value]) -> Scope {
        if names.is_empty() {
            return self.clone();
        }

        let bindings = names
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                (
                    name.as_ref().to_owned(),
                    values.get(idx).cloned().unwrap_or_default(),
                )
            })
            .collect();

        Scope {
            context: self.context.clone(),
            locals: Some(Rc::new(LocalFrame {
                bindings,
                parent: self.locals.clone(),
            })),
        }
    }

    /// Innermost binding of a block parameter
    pub fn local(&self, name: &str) -> Option<&Value> {
        let mut frame = self.locals.as_deref();

        while let Some(current) = frame {
            if let Some((_, value)) = current.bindings.iter().find(|(n, _)| n == name) {
                return Some(value);
            }
            frame = current.parent.as_deref();
        }

        None
    }

    /// Resolves a dotted path.
    /// The head is looked up in block parameters first, then in the context.
    /// `this` stands for the context itself.
    pub fn lookup(&self, path: &str) -> Value {
        let mut segments = path.split('.');
        let head = segments.next().unwrap_or_default();

        let mut value = match head {
            "this" | "" => self.context.clone(),
            name => match self.local(name) {
                Some(local) => local.clone(),
                None => self.context.get(name),
            },
        };

        for segment in segments {
            if value.is_nullish() {
                return Value::Undefined;
            }
            value = value.get(segment);
        }

        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Object;

    fn context() -> Value {
        let person: Object = [("name", "Alice")].into_iter().collect();
        let context = Object::new();
        context.set("title", "hello");
        context.set("person", person);
        Value::from(context)
    }

    #[test]
    fn it_resolves_paths_against_the_context() {
        let scope = Scope::new(context());

        assert_eq!(Value::from("hello"), scope.lookup("title"));
        assert_eq!(Value::from("Alice"), scope.lookup("person.name"));
        assert_eq!(Value::from("Alice"), scope.lookup("this.person.name"));
        assert_eq!(scope.context().clone(), scope.lookup("this"));
        assert_eq!(Value::Undefined, scope.lookup("person.missing.deeper"));
    }

    #[test]
    fn it_shadows_with_block_params() {
        let outer = Scope::new(context()).bind(&["w", "x"], &["W".into(), "X1".into()]);
        let inner = outer.bind(&["x", "y"], &["X2".into()]);

        assert_eq!(Value::from("W"), inner.lookup("w"));
        assert_eq!(Value::from("X2"), inner.lookup("x"));
        assert_eq!(Value::Undefined, inner.lookup("y"));
        assert_eq!(Value::from("X1"), outer.lookup("x"));

        // Block params win over context properties
        let shadowing = outer.bind(&["title"], &["local".into()]);
        assert_eq!(Value::from("local"), shadowing.lookup("title"));
    }

    #[test]
    fn it_keeps_block_params_when_switching_context() {
        let scope = Scope::new(context()).bind(&["item"], &["I".into()]);
        let switched = scope.with_context(Value::Null);

        assert_eq!(Value::from("I"), switched.lookup("item"));
        assert_eq!(Value::Undefined, switched.lookup("title"));
    }
}
