//! Qualifier-based schemas: every field is `required`, `optional` or `repeated`.
//!
//! A thin, lenient adapter over the core checker. Unlike core records, it
//! ignores undeclared fields and lets optional fields be missing entirely.
//!
//! ```
//! use json_adt::qualified::{QualifiedSchema, optional, repeated, required};
//! use json_adt::{number, string};
//! use serde_json::json;
//!
//! let student = QualifiedSchema::new("student", |this| {
//!     vec![
//!         ("name", required(string())),
//!         ("age", required(number())),
//!         ("parent", optional(this)),
//!         ("friends", repeated(this)),
//!     ]
//! })
//! .unwrap();
//! assert!(student.valid(&json!({ "name": "Peter", "age": 14, "friends": [] })));
//! ```
use std::sync::Arc;

use serde_json::Value;

use crate::check::Validator;
use crate::error::{DefinitionError, Error, Reason, Segment};
use crate::ty::{Type, runtime_kind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Qualifier {
    /// present and not null
    Required,
    /// may be missing or null
    Optional,
    /// a (possibly empty) array
    Repeated,
}

/// Marker handed to the field builder; stands for the schema being defined.
#[derive(Debug, Clone, Copy)]
pub struct This(());

#[derive(Debug, Clone)]
pub enum Target {
    Type(Type),
    Schema(QualifiedSchema),
    This,
}

impl From<Type> for Target {
    fn from(ty: Type) -> Self {
        Target::Type(ty)
    }
}

impl From<QualifiedSchema> for Target {
    fn from(schema: QualifiedSchema) -> Self {
        Target::Schema(schema)
    }
}

impl From<&QualifiedSchema> for Target {
    fn from(schema: &QualifiedSchema) -> Self {
        Target::Schema(schema.clone())
    }
}

impl From<This> for Target {
    fn from(_: This) -> Self {
        Target::This
    }
}

#[derive(Debug, Clone)]
pub struct Qualified {
    pub qualifier: Qualifier,
    pub target: Target,
}

pub fn required(target: impl Into<Target>) -> Qualified {
    Qualified { qualifier: Qualifier::Required, target: target.into() }
}

pub fn optional(target: impl Into<Target>) -> Qualified {
    Qualified { qualifier: Qualifier::Optional, target: target.into() }
}

pub fn repeated(target: impl Into<Target>) -> Qualified {
    Qualified { qualifier: Qualifier::Repeated, target: target.into() }
}

#[derive(Debug)]
struct Inner {
    name: String,
    fields: Vec<(String, Qualified)>,
}

#[derive(Debug, Clone)]
pub struct QualifiedSchema(Arc<Inner>);

impl QualifiedSchema {
    /// Build and validate. A `required` self-reference can never be satisfied
    /// by a finite value and is rejected.
    pub fn new<F, K>(name: impl Into<String>, build: F) -> Result<Self, DefinitionError>
    where
        F: FnOnce(This) -> Vec<(K, Qualified)>,
        K: Into<String>,
    {
        let name = name.into();
        let fields: Vec<(String, Qualified)> =
            build(This(())).into_iter().map(|(k, q)| (k.into(), q)).collect();
        for (field, q) in &fields {
            if q.qualifier == Qualifier::Required && matches!(q.target, Target::This) {
                return Err(DefinitionError::invalid_type(
                    format!("{name}.{field}"),
                    "required fields can not be used recursively",
                ));
            }
        }
        Ok(Self(Arc::new(Inner { name, fields })))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn check<'v>(&self, value: &'v Value) -> Result<&'v Value, Error> {
        self.check_with(&Validator::default(), value)
    }

    pub fn check_with<'v>(&self, validator: &Validator, value: &'v Value) -> Result<&'v Value, Error> {
        self.check_object(validator, value).map(|()| value)
    }

    pub fn valid(&self, value: &Value) -> bool {
        self.check(value).is_ok()
    }

    fn check_object(&self, validator: &Validator, value: &Value) -> Result<(), Error> {
        let Value::Object(object) = value else {
            return Err(Reason::TypeMismatch {
                expected: self.name().to_string(),
                actual: runtime_kind(value).to_string(),
            }
            .into());
        };
        for (field, q) in &self.0.fields {
            let slot = object.get(field).filter(|v| !v.is_null());
            self.check_field(validator, q, slot)
                .map_err(|e| e.within(Segment::Field(field.clone())))?;
        }
        Ok(())
    }

    fn check_field(&self, validator: &Validator, q: &Qualified, slot: Option<&Value>) -> Result<(), Error> {
        match (q.qualifier, slot) {
            (Qualifier::Optional, None) => Ok(()),
            (Qualifier::Required | Qualifier::Repeated, None) => {
                Err(Reason::UndefinedNull { field: None }.into())
            }
            (Qualifier::Required | Qualifier::Optional, Some(value)) => {
                self.check_target(validator, &q.target, value)
            }
            (Qualifier::Repeated, Some(Value::Array(items))) => {
                items.iter().enumerate().try_for_each(|(ix, item)| {
                    self.check_target(validator, &q.target, item)
                        .map_err(|e| e.within(Segment::Index(ix)))
                })
            }
            (Qualifier::Repeated, Some(other)) => Err(Reason::Expected {
                expected: "array".to_string(),
                actual: runtime_kind(other).to_string(),
            }
            .into()),
        }
    }

    fn check_target(&self, validator: &Validator, target: &Target, value: &Value) -> Result<(), Error> {
        match target {
            Target::Type(ty) => validator.check_slot(ty, Some(value)),
            Target::Schema(schema) => schema.check_object(validator, value),
            Target::This => self.check_object(validator, value),
        }
    }
}
