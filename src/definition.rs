//! Definition validation: is a template well-formed before any data is seen?
//!
//! The template is applied to placeholder arguments `a, b, ..` and the body is
//! walked. A finished instance is not expanded again while every open instance
//! is behind a guard. An instance already on the walk stack terminates that
//! branch, which is what makes `List(a)` with a `tail: List(a)` field definable.
//!
//! A *record* path may not reach its own in-progress instance without passing
//! through a guard: a builtin container or a schema variant. Such a value could
//! never be finite. Productivity of schemas is not proven; a schema is assumed
//! to offer a non-recursive variant.
use std::collections::HashSet;

use crate::config::Config;
use crate::error::DefinitionError;
use crate::factory::{Description, Factory, Instance, Kind};
use crate::ty::{Placeholder, Type};

pub(crate) fn validate(factory: &Factory, config: &Config) -> Result<Description, DefinitionError> {
    let params = (0..factory.arity())
        .map(|ix| Type::Param(Placeholder::new(ix)))
        .collect();
    let root = factory.instantiate(params)?;
    let mut walk = Walk {
        root: &root,
        config,
        stack: Vec::new(),
        finished: HashSet::new(),
        guard: 0,
    };
    let description = walk.expand(&root)?;
    if config.debug {
        tracing::debug!(definition = %description, "definition is well-formed");
    }
    Ok(description)
}

/// State of one top-level validation. Never shared between calls.
struct Walk<'a> {
    root: &'a Instance,
    config: &'a Config,
    /// instances currently being expanded, outermost first
    stack: Vec<Instance>,
    finished: HashSet<Instance>,
    /// stack entries below this index are separated from the current position by a guard
    guard: usize,
}

impl Walk<'_> {
    fn expand(&mut self, inst: &Instance) -> Result<Description, DefinitionError> {
        if self.stack.len() >= self.config.max_definition_depth {
            return Err(DefinitionError::invalid_type(
                self.root.to_string(),
                format!(
                    "expansion nests deeper than {} instantiations (at {inst}); \
                     recursion must reuse the same type arguments",
                    self.config.max_definition_depth
                ),
            ));
        }
        if self.config.debug {
            tracing::debug!(instance = %inst, depth = self.stack.len(), "expanding");
        }
        let description = inst.describe()?;
        self.stack.push(inst.clone());
        let saved = self.guard;
        if description.kind == Kind::Schema {
            // variants are disjoint alternatives
            self.guard = self.stack.len();
        }
        let walked = description.entries.values().try_for_each(|ty| self.walk(ty));
        self.guard = saved;
        self.stack.pop();
        walked?;
        self.finished.insert(inst.clone());
        Ok(description)
    }

    fn walk(&mut self, ty: &Type) -> Result<(), DefinitionError> {
        match ty {
            Type::Primitive(_) => Ok(()),
            Type::Generic(_, arg) => {
                let saved = self.guard;
                self.guard = self.stack.len();
                let walked = self.walk(arg);
                self.guard = saved;
                walked
            }
            Type::Fields(fields) => fields.values().try_for_each(|t| self.walk(t)),
            Type::Param(p) if p.index() < self.root.args().len() => Ok(()),
            Type::Param(p) => Err(DefinitionError::Internal(format!(
                "type parameter '{p}' escaped its definition (walking {})",
                self.root
            ))),
            Type::Instance(inst) => {
                if let Some(pos) = self.stack.iter().position(|open| open == inst) {
                    if pos >= self.guard {
                        return Err(DefinitionError::invalid_type(
                            inst.to_string(),
                            "required field recurses into its own record with no \
                             Optional/Repeated/Map or schema variant in between",
                        ));
                    }
                    if self.config.debug {
                        tracing::debug!(instance = %inst, "already in progress");
                    }
                    return Ok(());
                }
                // a finished instance may only be skipped when every open
                // instance is already behind a guard
                if self.guard == self.stack.len() && self.finished.contains(inst) {
                    return Ok(());
                }
                self.expand(inst).map(drop)
            }
        }
    }
}
