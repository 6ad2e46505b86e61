//! Ready-made definitions and a name → factory registry.
//!
//! The statics reference each other freely (`ROSE` uses `LIST`): a factory body
//! only runs when an instance is expanded, long after every `Lazy` is set up.
use indexmap::IndexMap;
use once_cell::sync::Lazy;

use crate::factory::{Factory, record, schema};
use crate::ty::{Type, fields, optional};

/// `Nil {} | Cons { head: a, tail: List(a) }`
pub static LIST: Lazy<Factory> = Lazy::new(|| {
    schema("List", |this, [a]: &[Type; 1]| {
        Ok(fields([
            ("Nil", Type::unit()),
            ("Cons", fields([("head", a.clone()), ("tail", this.apply(vec![a.clone()])?)]).into()),
        ]))
    })
});

/// `Nothing {} | Just { fromJust: a }`
pub static MAYBE: Lazy<Factory> = Lazy::new(|| {
    schema("Maybe", |_, [a]: &[Type; 1]| {
        Ok(fields([
            ("Nothing", Type::unit()),
            ("Just", fields([("fromJust", a.clone())]).into()),
        ]))
    })
});

/// `Left a | Right b`
pub static EITHER: Lazy<Factory> = Lazy::new(|| {
    schema("Either", |_, [a, b]: &[Type; 2]| {
        Ok(fields([("Left", a.clone()), ("Right", b.clone())]))
    })
});

/// `Leaf a | Branch { leftBranch: BinTree(a), rightBranch: BinTree(a) }`
pub static BIN_TREE: Lazy<Factory> = Lazy::new(|| {
    schema("BinTree", |this, [a]: &[Type; 1]| {
        let subtree = this.apply(vec![a.clone()])?;
        Ok(fields([
            ("Leaf", a.clone()),
            ("Branch", fields([("leftBranch", subtree.clone()), ("rightBranch", subtree)]).into()),
        ]))
    })
});

/// `{ fst: a, snd: b }`
pub static PAIR: Lazy<Factory> = Lazy::new(|| {
    record("Pair", |_, [a, b]: &[Type; 2]| {
        Ok(fields([("fst", a.clone()), ("snd", b.clone())]))
    })
});

/// `{ hey: Optional(Rec) }`
pub static REC: Lazy<Factory> = Lazy::new(|| {
    record("Rec", |this, []: &[Type; 0]| {
        Ok(fields([("hey", optional(this.apply(vec![])?))]))
    })
});

/// `{ label: a, children: List(Rose(a)) }`
pub static ROSE: Lazy<Factory> = Lazy::new(|| {
    record("Rose", |this, [a]: &[Type; 1]| {
        let child = this.apply(vec![a.clone()])?;
        Ok(fields([("label", a.clone()), ("children", LIST.apply(vec![child])?)]))
    })
});

// ————————————————————————————————————————————————————————————————————————————
// REGISTRY
// ————————————————————————————————————————————————————————————————————————————

/// Factories addressable by name, in registration order.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    factories: IndexMap<String, Factory>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prelude() -> Self {
        let mut registry = Self::new();
        for factory in [&LIST, &MAYBE, &EITHER, &BIN_TREE, &PAIR, &REC, &ROSE] {
            registry.register(Factory::clone(factory));
        }
        registry
    }

    /// Returns the factory previously registered under the same name, if any.
    pub fn register(&mut self, factory: Factory) -> Option<Factory> {
        self.factories.insert(factory.name().to_string(), factory)
    }

    pub fn get(&self, name: &str) -> Option<&Factory> {
        self.factories.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Factory> {
        self.factories.values()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}
