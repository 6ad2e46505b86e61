//! Failure taxonomy.
//!
//! Two disjoint classes:
//! - [`DefinitionError`]: the type description itself is malformed (author mistake).
//! - [`ValidationError`]: a value does not match an otherwise well-formed type.
//!
//! [`Error`] joins both for the checker, which expands definitions lazily and
//! can therefore still trip over a malformed template body.
use std::fmt;
use thiserror::Error;

// ————————————————————————————————————————————————————————————————————————————
// KIND TAGS
// ————————————————————————————————————————————————————————————————————————————

/// Stable, closed set of error tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidType,
    ArityMismatch,
    Internal,
    UndefinedNull,
    TypeMismatch,
    ExpectedFields,
    InvalidConstrField,
    Expected,
}

impl ErrorKind {
    pub fn is_definition(self) -> bool {
        matches!(self, Self::InvalidType | Self::ArityMismatch | Self::Internal)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// DEFINITION ERRORS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("invalid type '{name}': {reason}")]
    InvalidType { name: String, reason: String },

    #[error("'{name}' expects {expected} type argument(s), got {got}")]
    ArityMismatch { name: String, expected: usize, got: usize },

    #[error("INTERNAL: {0}")]
    Internal(String),
}

impl DefinitionError {
    pub fn invalid_type(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidType { name: name.into(), reason: reason.into() }
    }

    pub fn arity(name: impl Into<String>, expected: usize, got: usize) -> Self {
        Self::ArityMismatch { name: name.into(), expected, got }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidType { .. } => ErrorKind::InvalidType,
            Self::ArityMismatch { .. } => ErrorKind::ArityMismatch,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// VALIDATION ERRORS
// ————————————————————————————————————————————————————————————————————————————

/// What went wrong at the failing location.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Reason {
    #[error("{}", undefined_null(.field))]
    UndefinedNull { field: Option<String> },

    #[error("type mismatch: expected '{expected}', got '{actual}'")]
    TypeMismatch { expected: String, actual: String },

    #[error("expected fields: ({}), got ({})", .expected.join(", "), .got.join(", "))]
    ExpectedFields { expected: Vec<String>, got: Vec<String> },

    #[error("invalid constr field '{constr}', expected one of {}", .valid.join(", "))]
    InvalidConstrField { constr: String, valid: Vec<String> },

    #[error("'{expected}' expected, got '{actual}'")]
    Expected { expected: String, actual: String },
}

fn undefined_null(field: &Option<String>) -> String {
    match field {
        Some(name) => format!("'{name}' field is undefined/null"),
        None => "undefined/null value".to_string(),
    }
}

impl Reason {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UndefinedNull { .. } => ErrorKind::UndefinedNull,
            Self::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Self::ExpectedFields { .. } => ErrorKind::ExpectedFields,
            Self::InvalidConstrField { .. } => ErrorKind::InvalidConstrField,
            Self::Expected { .. } => ErrorKind::Expected,
        }
    }
}

/// One step from an enclosing value into a nested one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// record field
    Field(String),
    /// tagged-union payload
    Variant(String),
    /// sequence element
    Index(usize),
    /// dictionary entry
    Key(String),
}

/// Location of a failure, rooted at the checked value (`$`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path {
    // innermost first; segments are pushed while the failure unwinds
    rev: Vec<Segment>,
}

impl Path {
    pub fn root() -> Self {
        Self::default()
    }

    /// Segments from the root downwards.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.rev.iter().rev()
    }

    fn push_outer(&mut self, segment: Segment) {
        self.rev.push(segment);
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in self.segments() {
            match segment {
                Segment::Field(name) | Segment::Variant(name) | Segment::Key(name) => {
                    write!(f, ".{name}")?
                }
                Segment::Index(ix) => write!(f, "[{ix}]")?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("at {path}: {reason}")]
pub struct ValidationError {
    pub path: Path,
    pub reason: Reason,
}

impl ValidationError {
    pub fn kind(&self) -> ErrorKind {
        self.reason.kind()
    }

    /// Re-root the failure one level further out.
    pub fn within(mut self, segment: Segment) -> Self {
        self.path.push_outer(segment);
        self
    }
}

impl From<Reason> for ValidationError {
    fn from(reason: Reason) -> Self {
        Self { path: Path::root(), reason }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// COMBINED
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Definition(#[from] DefinitionError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Definition(e) => e.kind(),
            Self::Validation(e) => e.kind(),
        }
    }

    pub fn within(self, segment: Segment) -> Self {
        match self {
            Self::Validation(e) => Self::Validation(e.within(segment)),
            definition => definition,
        }
    }

    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(e) => Some(e),
            Self::Definition(_) => None,
        }
    }
}

impl From<Reason> for Error {
    fn from(reason: Reason) -> Self {
        Self::Validation(reason.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_renders_root_to_leaf() {
        let err = ValidationError::from(Reason::TypeMismatch {
            expected: "number".into(),
            actual: "string".into(),
        })
        .within(Segment::Field("head".into()))
        .within(Segment::Variant("Cons".into()))
        .within(Segment::Index(2))
        .within(Segment::Key("xs".into()));
        assert_eq!(err.path.to_string(), "$.xs[2].Cons.head");
        assert_eq!(
            err.to_string(),
            "at $.xs[2].Cons.head: type mismatch: expected 'number', got 'string'"
        );
    }

    #[test]
    fn definition_errors_are_not_rerooted() {
        let err = Error::from(DefinitionError::arity("Pair", 2, 1)).within(Segment::Index(0));
        assert_eq!(err, Error::Definition(DefinitionError::arity("Pair", 2, 1)));
        assert!(err.kind().is_definition());
    }

    #[test]
    fn messages_list_names() {
        let reason = Reason::ExpectedFields {
            expected: vec!["constr".into(), "Cons".into()],
            got: vec!["constr".into()],
        };
        assert_eq!(reason.to_string(), "expected fields: (constr, Cons), got (constr)");
        let reason = Reason::UndefinedNull { field: Some("age".into()) };
        assert_eq!(reason.to_string(), "'age' field is undefined/null");
        assert_eq!(reason.kind(), ErrorKind::UndefinedNull);
    }
}
