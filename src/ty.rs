//! Type expressions: the static description of an expected shape.
//!
//! No serde_json::Value in the model itself; values only meet types in `check`.
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::DefinitionError;
use crate::factory::{Factory, Instance};

// ————————————————————————————————————————————————————————————————————————————
// PRIMITIVES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Number,
    String,
    Boolean,
    Object,
}

impl Primitive {
    pub const ALL: [Primitive; 4] = [Self::Number, Self::String, Self::Boolean, Self::Object];

    pub fn name(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Object => "object",
        }
    }

    pub fn matches(self, value: &Value) -> bool {
        runtime_kind(value) == self.name()
    }
}

impl FromStr for Primitive {
    type Err = DefinitionError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == name)
            .ok_or_else(|| {
                DefinitionError::invalid_type(name, "expected one of number, string, boolean, object")
            })
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Runtime kind of a JSON value, in primitive-name terms.
///
/// Sequences and dictionaries are both `object`; `null` is reported as
/// `null` but is treated as absent by the checker before kinds are compared.
pub fn runtime_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) | Value::Object(_) => "object",
    }
}

// ————————————————————————————————————————————————————————————————————————————
// BUILTIN GENERICS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Optional,
    Repeated,
    Map,
}

impl Builtin {
    /// Every builtin takes exactly one type argument.
    pub const ARITY: usize = 1;
    pub const ALL: [Builtin; 3] = [Self::Optional, Self::Repeated, Self::Map];

    pub fn name(self) -> &'static str {
        match self {
            Self::Optional => "Optional",
            Self::Repeated => "Repeated",
            Self::Map => "Map",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TYPE EXPRESSIONS
// ————————————————————————————————————————————————————————————————————————————

/// Field (or variant) name → type, in declaration order.
pub type Fields = IndexMap<String, Type>;

/// Opaque stand-in for the i-th type argument while a definition is walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placeholder(usize);

impl Placeholder {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match u8::try_from(self.0) {
            Ok(ix) if ix < 26 => write!(f, "{}", char::from(b'a' + ix)),
            _ => write!(f, "t{}", self.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Primitive(Primitive),
    /// `Optional⟨T⟩`, `Repeated⟨T⟩`, `Map⟨T⟩`; the single argument is enforced by construction.
    Generic(Builtin, Box<Type>),
    /// Anonymous record-like mapping, e.g. a variant payload `{ head: a, tail: List(a) }`.
    Fields(Fields),
    /// A record or schema factory applied to type arguments. Expanded on demand.
    Instance(Instance),
    /// Only produced by the definition validator; matches no data.
    Param(Placeholder),
}

pub fn number() -> Type {
    Type::Primitive(Primitive::Number)
}

pub fn string() -> Type {
    Type::Primitive(Primitive::String)
}

pub fn boolean() -> Type {
    Type::Primitive(Primitive::Boolean)
}

pub fn object() -> Type {
    Type::Primitive(Primitive::Object)
}

/// Primitive by name; anything outside the closed set is `InvalidType`.
pub fn primitive(name: &str) -> Result<Type, DefinitionError> {
    name.parse().map(Type::Primitive)
}

pub fn optional(ty: Type) -> Type {
    Type::Generic(Builtin::Optional, Box::new(ty))
}

pub fn repeated(ty: Type) -> Type {
    Type::Generic(Builtin::Repeated, Box::new(ty))
}

pub fn map(ty: Type) -> Type {
    Type::Generic(Builtin::Map, Box::new(ty))
}

/// Build a field mapping from `(name, type)` pairs.
pub fn fields<I, K>(entries: I) -> Fields
where
    I: IntoIterator<Item = (K, Type)>,
    K: Into<String>,
{
    entries.into_iter().map(|(k, ty)| (k.into(), ty)).collect()
}

impl Type {
    /// Dynamic form of `optional`/`repeated`/`map`.
    pub fn generic(kind: Builtin, args: Vec<Type>) -> Result<Type, DefinitionError> {
        let got = args.len();
        let mut args = args.into_iter();
        match (args.next(), args.next()) {
            (Some(arg), None) => Ok(Type::Generic(kind, Box::new(arg))),
            _ => Err(DefinitionError::arity(kind.name(), Builtin::ARITY, got)),
        }
    }

    /// The empty payload `{}`.
    pub fn unit() -> Type {
        Type::Fields(Fields::new())
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, Type::Generic(Builtin::Optional, _))
    }

    /// Factories this expression applies, outermost first, without duplicates.
    /// Does not expand instances.
    pub fn factories(&self) -> Vec<Factory> {
        fn go(ty: &Type, out: &mut Vec<Factory>) {
            match ty {
                Type::Primitive(_) | Type::Param(_) => {}
                Type::Generic(_, arg) => go(arg, out),
                Type::Fields(fields) => fields.values().for_each(|t| go(t, out)),
                Type::Instance(inst) => {
                    if !out.contains(inst.factory()) {
                        out.push(inst.factory().clone());
                    }
                    inst.args().iter().for_each(|t| go(t, out));
                }
            }
        }
        let mut out = Vec::new();
        go(self, &mut out);
        out
    }
}

impl From<Primitive> for Type {
    fn from(p: Primitive) -> Self {
        Type::Primitive(p)
    }
}

impl From<Fields> for Type {
    fn from(fields: Fields) -> Self {
        Type::Fields(fields)
    }
}

impl Hash for Type {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Type::Primitive(p) => p.hash(state),
            Type::Generic(kind, arg) => {
                kind.hash(state);
                arg.hash(state);
            }
            // IndexMap equality ignores order; hash only what order can't change
            Type::Fields(fields) => fields.len().hash(state),
            Type::Instance(inst) => inst.hash(state),
            Type::Param(p) => p.hash(state),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(p) => write!(f, "{p}"),
            Type::Generic(kind, arg) => write!(f, "{}({arg})", kind.name()),
            Type::Fields(fields) => write_fields(f, fields),
            Type::Instance(inst) => write!(f, "{inst}"),
            Type::Param(p) => write!(f, "{p}"),
        }
    }
}

pub(crate) fn write_fields(f: &mut fmt::Formatter<'_>, fields: &Fields) -> fmt::Result {
    if fields.is_empty() {
        return f.write_str("{}");
    }
    f.write_str("{ ")?;
    for (ix, (name, ty)) in fields.iter().enumerate() {
        if ix > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{name}: {ty}")?;
    }
    f.write_str(" }")
}
