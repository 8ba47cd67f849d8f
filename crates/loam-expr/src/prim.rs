//! Primitive function table.
//!
//! The optimizer only needs to know, per primitive, whether calling it can be
//! observed and how many arguments it takes. The table is read-only while a
//! pass runs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimInfo {
    pub pure: bool,
    pub arity: usize,
}

impl PrimInfo {
    pub fn pure(arity: usize) -> Self {
        Self { pure: true, arity }
    }

    pub fn effectful(arity: usize) -> Self {
        Self { pure: false, arity }
    }
}

pub trait PrimTable {
    fn lookup(&self, name: &str) -> Option<PrimInfo>;

    /// Unknown primitives are treated as effectful.
    fn is_pure(&self, name: &str) -> bool {
        self.lookup(name).is_some_and(|info| info.pure)
    }
}

/// A primitive table backed by an ordered map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticPrimTable {
    entries: BTreeMap<String, PrimInfo>,
}

impl StaticPrimTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with the arithmetic, comparison, string and I/O primitives every
    /// program links against.
    pub fn with_builtins() -> Self {
        let mut table = Self::new();
        for name in ["add", "sub", "mul", "div", "mod", "neg"] {
            let arity = if name == "neg" { 1 } else { 2 };
            table.insert(name, PrimInfo::pure(arity));
        }
        for name in ["eq", "lt", "le", "cmp"] {
            table.insert(name, PrimInfo::pure(2));
        }
        table.insert("cat", PrimInfo::pure(2));
        table.insert("len", PrimInfo::pure(1));
        table.insert("print", PrimInfo::effectful(1));
        table.insert("panic", PrimInfo::effectful(1));
        table.insert("read", PrimInfo::effectful(1));
        table.insert("write", PrimInfo::effectful(2));
        table
    }

    pub fn insert(&mut self, name: impl Into<String>, info: PrimInfo) -> Option<PrimInfo> {
        self.entries.insert(name.into(), info)
    }

    pub fn extend(&mut self, other: StaticPrimTable) {
        self.entries.extend(other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PrimTable for StaticPrimTable {
    fn lookup(&self, name: &str) -> Option<PrimInfo> {
        self.entries.get(name).copied()
    }
}
