//! Record and schema factories.
//!
//! A factory wraps a *template*: a closure from `N` type arguments to a body
//! mapping. Applying the factory yields a lazily expanded [`Instance`];
//! expanding it literally substitutes the arguments into the template.
//!
//! ```
//! use json_adt::{fields, number, schema, Type};
//!
//! let list = schema("List", |this, [a]: &[Type; 1]| {
//!     Ok(fields([
//!         ("Nil", Type::unit()),
//!         ("Cons", fields([("head", a.clone()), ("tail", this.apply(vec![a.clone()])?)]).into()),
//!     ]))
//! });
//! let numbers = list.apply(vec![number()]).unwrap();
//! assert_eq!(numbers.to_string(), "List(number)");
//! ```
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::DefinitionError;
use crate::ty::{Fields, Type, write_fields};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// product type: every field required
    Record,
    /// sum type: exactly one named variant
    Schema,
}

impl Kind {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Record => "record",
            Self::Schema => "schema",
        }
    }
}

type Body = dyn Fn(&Factory, &[Type]) -> Result<Fields, DefinitionError> + Send + Sync;

struct Template {
    name: String,
    arity: usize,
    kind: Kind,
    body: Box<Body>,
}

/// Shared handle to a template. Identity is the template allocation, not its name.
#[derive(Clone)]
pub struct Factory(Arc<Template>);

/// Define a tagged-union template. The argument array length is the arity;
/// `this` is the factory being defined, for self-reference.
pub fn schema<const N: usize, F>(name: impl Into<String>, body: F) -> Factory
where
    F: Fn(&Factory, &[Type; N]) -> Result<Fields, DefinitionError> + Send + Sync + 'static,
{
    Factory::new(Kind::Schema, name.into(), body)
}

/// Define a fixed-field template. See [`schema`].
pub fn record<const N: usize, F>(name: impl Into<String>, body: F) -> Factory
where
    F: Fn(&Factory, &[Type; N]) -> Result<Fields, DefinitionError> + Send + Sync + 'static,
{
    Factory::new(Kind::Record, name.into(), body)
}

impl Factory {
    fn new<const N: usize, F>(kind: Kind, name: String, body: F) -> Self
    where
        F: Fn(&Factory, &[Type; N]) -> Result<Fields, DefinitionError> + Send + Sync + 'static,
    {
        let erased = move |this: &Factory, args: &[Type]| {
            let args = <&[Type; N]>::try_from(args)
                .map_err(|_| DefinitionError::arity(this.name(), N, args.len()))?;
            body(this, args)
        };
        Self(Arc::new(Template { name, arity: N, kind, body: Box::new(erased) }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn arity(&self) -> usize {
        self.0.arity
    }

    pub fn kind(&self) -> Kind {
        self.0.kind
    }

    /// Bind type arguments. Fails with `ArityMismatch` on a count mismatch;
    /// the body itself is not run until the instance is expanded.
    pub fn apply(&self, args: Vec<Type>) -> Result<Type, DefinitionError> {
        self.instantiate(args).map(Type::Instance)
    }

    pub fn instantiate(&self, args: Vec<Type>) -> Result<Instance, DefinitionError> {
        if args.len() != self.arity() {
            return Err(DefinitionError::arity(self.name(), self.arity(), args.len()));
        }
        Ok(Instance { factory: self.clone(), args })
    }
}

impl PartialEq for Factory {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Factory {}

impl Hash for Factory {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.0).hash(state);
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory")
            .field("name", &self.0.name)
            .field("arity", &self.0.arity)
            .field("kind", &self.0.kind)
            .finish_non_exhaustive()
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INSTANCES
// ————————————————————————————————————————————————————————————————————————————

/// A factory together with exactly `arity` type arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Instance {
    factory: Factory,
    args: Vec<Type>,
}

impl Instance {
    pub fn factory(&self) -> &Factory {
        &self.factory
    }

    pub fn args(&self) -> &[Type] {
        &self.args
    }

    pub fn kind(&self) -> Kind {
        self.factory.kind()
    }

    /// Run the template against the bound arguments.
    pub fn describe(&self) -> Result<Description, DefinitionError> {
        let entries = (self.factory.0.body)(&self.factory, &self.args)?;
        Ok(Description { name: self.to_string(), kind: self.kind(), entries })
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.factory.name())?;
        if self.args.is_empty() {
            return Ok(());
        }
        f.write_str("(")?;
        for (ix, arg) in self.args.iter().enumerate() {
            if ix > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{arg}")?;
        }
        f.write_str(")")
    }
}

/// An instantiated type description: variant or field name → resolved type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Description {
    pub name: String,
    pub kind: Kind,
    pub entries: Fields,
}

impl Description {
    pub fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} = ", self.kind.keyword(), self.name)?;
        match self.kind {
            Kind::Record => write_fields(f, &self.entries),
            Kind::Schema => {
                for (ix, (variant, ty)) in self.entries.iter().enumerate() {
                    if ix > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{variant} {ty}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::ty::{fields, number, string};

    fn pair() -> Factory {
        record("Pair", |_, [a, b]: &[Type; 2]| Ok(fields([("fst", a.clone()), ("snd", b.clone())])))
    }

    #[test]
    fn apply_checks_arity() {
        let pair = pair();
        assert_eq!(pair.arity(), 2);
        assert_eq!(pair.kind(), Kind::Record);
        for args in [vec![number()], vec![number(), number(), number()]] {
            assert_eq!(pair.apply(args).unwrap_err().kind(), ErrorKind::ArityMismatch);
        }
    }

    #[test]
    fn describe_substitutes_arguments() {
        let inst = pair().instantiate(vec![number(), string()]).unwrap();
        let d = inst.describe().unwrap();
        assert_eq!(d.name, "Pair(number, string)");
        assert_eq!(d.entries["fst"], number());
        assert_eq!(d.entries["snd"], string());
        assert_eq!(d.to_string(), "record Pair(number, string) = { fst: number, snd: string }");
    }

    #[test]
    fn identity_is_per_template() {
        let (a, b) = (pair(), pair());
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        let x = a.apply(vec![number(), number()]).unwrap();
        let y = a.apply(vec![number(), number()]).unwrap();
        let z = b.apply(vec![number(), number()]).unwrap();
        assert_eq!(x, y);
        assert_ne!(x, z);
    }

    #[test]
    fn bad_application_inside_body_surfaces_on_expansion() {
        let pair = pair();
        let broken = schema("Broken", move |_, [a]: &[Type; 1]| {
            Ok(fields([("Only", pair.apply(vec![a.clone()])?)]))
        });
        // binding succeeds, expansion does not
        let inst = broken.instantiate(vec![number()]).unwrap();
        let err = inst.describe().unwrap_err();
        assert_eq!(err, DefinitionError::arity("Pair", 2, 1));
    }
}
