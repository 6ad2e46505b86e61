//! Runtime structural types for JSON.
//!
//! Build type expressions from primitives, the builtin generics and
//! record/schema factories, validate each factory's definition once, then
//! check any number of values against the instantiated types.
//!
//! ```
//! use json_adt::prelude::LIST;
//! use json_adt::{ErrorKind, check, number, valid, validate_definition};
//! use serde_json::json;
//!
//! validate_definition(&LIST).unwrap();
//! let numbers = LIST.apply(vec![number()]).unwrap();
//!
//! let nil = json!({ "constr": "Nil", "Nil": {} });
//! let one = json!({ "constr": "Cons", "Cons": { "head": 1, "tail": nil } });
//! assert!(valid(&numbers, &one));
//!
//! let bogus = json!({ "constr": "Bogus", "Bogus": {} });
//! assert_eq!(check(&numbers, &bogus).unwrap_err().kind(), ErrorKind::InvalidConstrField);
//! ```
pub mod check;
pub mod config;
mod definition;
pub mod error;
pub mod factory;
pub mod prelude;
pub mod qualified;
pub mod ty;
pub mod type_expr;

use serde_json::Value;

pub use check::Validator;
pub use config::Config;
pub use error::{DefinitionError, Error, ErrorKind, Path, Reason, Segment, ValidationError};
pub use factory::{Description, Factory, Instance, Kind, record, schema};
pub use ty::{
    Builtin, Fields, Primitive, Type, boolean, fields, map, number, object, optional, primitive,
    repeated, string,
};

/// Check with the default configuration.
pub fn check<'v>(ty: &Type, value: &'v Value) -> Result<&'v Value, Error> {
    Validator::default().check(ty, value)
}

/// `check`, without the detail.
pub fn valid(ty: &Type, value: &Value) -> bool {
    Validator::default().valid(ty, value)
}

/// Validate a factory's definition with the default configuration.
pub fn validate_definition(factory: &Factory) -> Result<Description, DefinitionError> {
    Validator::default().validate_definition(factory)
}
