//! Structural checking of JSON values against type expressions.
//!
//! One exhaustive match over [`Type`]; recursion depth follows the nesting of
//! the *value*, since every extra frame consumes one level of data. Nothing is
//! memoized and nothing is mutated, so a [`Validator`] can be shared freely
//! across threads.
use serde_json::{Map, Value};

use crate::config::Config;
use crate::definition;
use crate::error::{DefinitionError, Error, Reason, Segment};
use crate::factory::{Description, Factory, Instance, Kind};
use crate::ty::{Builtin, Fields, Type, runtime_kind};

#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: Config,
}

impl Validator {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the value itself when it matches; the first failure otherwise.
    pub fn check<'v>(&self, ty: &Type, value: &'v Value) -> Result<&'v Value, Error> {
        match self.check_slot(ty, Some(value)) {
            Ok(()) => Ok(value),
            Err(err) => {
                if self.config.debug {
                    tracing::debug!(ty = %ty, kind = %err.kind(), "{err}");
                }
                Err(err)
            }
        }
    }

    pub fn valid(&self, ty: &Type, value: &Value) -> bool {
        self.check(ty, value).is_ok()
    }

    pub fn validate_definition(&self, factory: &Factory) -> Result<Description, DefinitionError> {
        definition::validate(factory, &self.config)
    }

    /// `None` and JSON `null` both mean absent.
    pub(crate) fn check_slot(&self, ty: &Type, value: Option<&Value>) -> Result<(), Error> {
        let value = value.filter(|v| !v.is_null());
        match ty {
            Type::Primitive(p) => {
                let value = present(value, None)?;
                if !p.matches(value) {
                    return Err(mismatch(p.name(), value).into());
                }
                Ok(())
            }
            Type::Generic(Builtin::Optional, arg) => match value {
                None => Ok(()),
                Some(value) => self.check_slot(arg, Some(value)),
            },
            Type::Generic(Builtin::Repeated, arg) => {
                let Value::Array(items) = present(value, None)? else {
                    return Err(expected("array", value).into());
                };
                items.iter().enumerate().try_for_each(|(ix, item)| {
                    self.check_slot(arg, Some(item)).map_err(|e| e.within(Segment::Index(ix)))
                })
            }
            Type::Generic(Builtin::Map, arg) => {
                let entries = keyed(present(value, None)?)?;
                entries.iter().try_for_each(|(key, item)| {
                    self.check_slot(arg, Some(item)).map_err(|e| e.within(Segment::Key(key.clone())))
                })
            }
            Type::Fields(fields) => self.check_fields(fields, value),
            Type::Instance(inst) => self.check_instance(inst, value),
            Type::Param(p) => {
                let value = present(value, None)?;
                Err(mismatch(&p.to_string(), value).into())
            }
        }
    }

    fn check_instance(&self, inst: &Instance, value: Option<&Value>) -> Result<(), Error> {
        if self.config.debug {
            tracing::trace!(instance = %inst, "expanding for check");
        }
        let description = inst.describe()?;
        match description.kind {
            Kind::Record => self.check_fields(&description.entries, value),
            Kind::Schema => self.check_variant(&description, value),
        }
    }

    /// Exact field set; `null` only where the declared type is `Optional`.
    fn check_fields(&self, fields: &Fields, value: Option<&Value>) -> Result<(), Error> {
        let object = keyed(present(value, None)?)?;
        let same_keys = object.len() == fields.len() && fields.keys().all(|k| object.contains_key(k));
        if !same_keys {
            return Err(Reason::ExpectedFields {
                expected: fields.keys().cloned().collect(),
                got: object.keys().cloned().collect(),
            }
            .into());
        }
        for (name, ty) in fields {
            let field = object.get(name).filter(|v| !v.is_null());
            if field.is_none() && !ty.is_optional() {
                return Err(Reason::UndefinedNull { field: Some(name.clone()) }.into());
            }
            self.check_slot(ty, field)
                .map_err(|e| e.within(Segment::Field(name.clone())))?;
        }
        Ok(())
    }

    /// `{ <discriminator>: "<Variant>", "<Variant>": payload }` and nothing else.
    fn check_variant(&self, description: &Description, value: Option<&Value>) -> Result<(), Error> {
        let object = keyed(present(value, None)?)?;
        let discriminator = self.config.discriminator.as_str();

        let tag = present(object.get(discriminator), Some(discriminator))?;
        let Value::String(constr) = tag else {
            return Err(Error::from(mismatch("string", tag))
                .within(Segment::Field(discriminator.to_string())));
        };
        let Some(shape) = description.entries.get(constr) else {
            return Err(Reason::InvalidConstrField {
                constr: constr.clone(),
                valid: description.names(),
            }
            .into());
        };
        if object.len() != 2 || !object.contains_key(constr) {
            return Err(Reason::ExpectedFields {
                expected: vec![discriminator.to_string(), constr.clone()],
                got: object.keys().cloned().collect(),
            }
            .into());
        }
        let payload = present(object.get(constr), Some(constr))?;
        self.check_slot(shape, Some(payload))
            .map_err(|e| e.within(Segment::Variant(constr.clone())))
    }
}

// ————————————————————————————————————————————————————————————————————————————
// HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn present<'v>(value: Option<&'v Value>, field: Option<&str>) -> Result<&'v Value, Reason> {
    value
        .filter(|v| !v.is_null())
        .ok_or_else(|| Reason::UndefinedNull { field: field.map(str::to_string) })
}

/// Plain keyed structure; a sequence is the wrong container, a scalar the wrong kind.
fn keyed(value: &Value) -> Result<&Map<String, Value>, Reason> {
    match value {
        Value::Object(object) => Ok(object),
        Value::Array(_) => Err(expected("object", Some(value))),
        other => Err(mismatch("object", other)),
    }
}

fn mismatch(expected: &str, value: &Value) -> Reason {
    Reason::TypeMismatch { expected: expected.to_string(), actual: runtime_kind(value).to_string() }
}

fn expected(container: &str, value: Option<&Value>) -> Reason {
    let actual = match value {
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
        Some(other) => runtime_kind(other),
        None => "null",
    };
    Reason::Expected { expected: container.to_string(), actual: actual.to_string() }
}
