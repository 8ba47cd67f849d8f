//! Arena-allocated expression nodes.

use std::collections::BTreeMap;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::meta::{Flags, Literal, Purity};

/// Stable handle of a node in an [`ExprArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExprId(pub u32);

impl ExprId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A sum type as seen by constructors and eliminators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SumRef {
    pub name: String,
    pub members: Vec<String>,
}

impl SumRef {
    pub fn member_name(&self, member: usize) -> &str {
        self.members.get(member).map(String::as_str).unwrap_or("?")
    }
}

/// What a variable reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarTarget {
    /// Positional slot, counted backward from the innermost binding.
    Index(usize),
    /// A function binding addressed by identity; immune to renumbering.
    Binding(ExprId),
}

/// A group of bindings sharing one body.
#[derive(Debug, Clone, PartialEq)]
pub struct DefBinding {
    /// Non-recursive values, evaluated in the enclosing scope.
    pub values: Vec<ExprId>,
    /// Mutually recursive closures, addressed by identity.
    pub functions: Vec<ExprId>,
    /// Declared name to current index; values come first, then functions.
    pub order: BTreeMap<String, usize>,
    pub body: ExprId,
}

impl DefBinding {
    /// Names indexed by binding position, as recorded in the order map.
    pub fn names_by_index(&self) -> Vec<Option<&str>> {
        let mut names = vec![None; self.values.len() + self.functions.len()];
        for (name, &index) in &self.order {
            if let Some(slot) = names.get_mut(index) {
                *slot = Some(name.as_str());
            }
        }
        names
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Literal(Literal),
    /// Builds `sum.members[member]` from the arguments on the stack.
    Construct {
        sum: SumRef,
        member: usize,
    },
    /// Eliminates the tuple at slot 0 with the handlers at slots 1..=n.
    Destruct {
        sum: SumRef,
    },
    /// Reads field `field` of the `member` value at slot 0.
    Get {
        sum: SumRef,
        member: usize,
        field: usize,
    },
    Prim {
        name: String,
        arity: usize,
    },
    VarRef {
        name: String,
        target: VarTarget,
    },
    App {
        func: ExprId,
        arg: ExprId,
    },
    Lambda {
        name: String,
        body: ExprId,
    },
    DefBinding(DefBinding),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub flags: Flags,
    pub meta: Purity,
}

impl Expr {
    pub fn new(kind: ExprKind) -> Self {
        Self {
            kind,
            flags: Flags::EMPTY,
            meta: Purity::NONE,
        }
    }

    pub fn with_flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    pub fn is_pure(&self) -> bool {
        self.flags.contains(Flags::PURE)
    }

    pub fn is_used(&self) -> bool {
        self.flags.contains(Flags::USED)
    }

    /// Direct children in evaluation-independent order.
    pub fn children(&self) -> Vec<ExprId> {
        match &self.kind {
            ExprKind::App { func, arg } => vec![*func, *arg],
            ExprKind::Lambda { body, .. } => vec![*body],
            ExprKind::DefBinding(def) => def
                .values
                .iter()
                .chain(def.functions.iter())
                .copied()
                .chain(std::iter::once(def.body))
                .collect(),
            ExprKind::Literal(_)
            | ExprKind::Construct { .. }
            | ExprKind::Destruct { .. }
            | ExprKind::Get { .. }
            | ExprKind::Prim { .. }
            | ExprKind::VarRef { .. } => Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Arena
// ---------------------------------------------------------------------------

/// Owner of every node of one expression tree.
///
/// Released nodes leave a hole so that handles held elsewhere stay stable.
#[derive(Debug, Clone, Default)]
pub struct ExprArena {
    nodes: Vec<Option<Expr>>,
}

impl ExprArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, expr: Expr) -> ExprId {
        let id = ExprId(self.nodes.len() as u32);
        self.nodes.push(Some(expr));
        id
    }

    /// Allocate a placeholder to be replaced with [`ExprArena::fill`].
    ///
    /// Recursive function bindings need their handle before their body exists.
    pub fn reserve(&mut self) -> ExprId {
        self.alloc(Expr::new(ExprKind::Literal(Literal::Unit)))
    }

    pub fn fill(&mut self, id: ExprId, kind: ExprKind) {
        self[id].kind = kind;
    }

    pub fn get(&self, id: ExprId) -> Option<&Expr> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: ExprId) -> Option<&mut Expr> {
        self.nodes.get_mut(id.index()).and_then(Option::as_mut)
    }

    pub fn contains(&self, id: ExprId) -> bool {
        self.get(id).is_some()
    }

    /// Drop a node and its entire subtree.
    pub fn release(&mut self, id: ExprId) -> usize {
        let mut released = 0;
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            if let Some(expr) = self.nodes.get_mut(next.index()).and_then(Option::take) {
                pending.extend(expr.children());
                released += 1;
            }
        }
        released
    }

    /// Number of nodes that have not been released.
    pub fn live_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_some()).count()
    }

    // -- builders --

    pub fn literal(&mut self, value: Literal) -> ExprId {
        self.alloc(Expr::new(ExprKind::Literal(value)))
    }

    pub fn var(&mut self, name: impl Into<String>, index: usize) -> ExprId {
        self.alloc(Expr::new(ExprKind::VarRef {
            name: name.into(),
            target: VarTarget::Index(index),
        }))
    }

    pub fn fn_ref(&mut self, name: impl Into<String>, target: ExprId, recursive: bool) -> ExprId {
        let flags = if recursive {
            Flags::RECURSIVE
        } else {
            Flags::EMPTY
        };
        self.alloc(
            Expr::new(ExprKind::VarRef {
                name: name.into(),
                target: VarTarget::Binding(target),
            })
            .with_flags(flags),
        )
    }

    pub fn app(&mut self, func: ExprId, arg: ExprId) -> ExprId {
        self.alloc(Expr::new(ExprKind::App { func, arg }))
    }

    pub fn lambda(&mut self, name: impl Into<String>, body: ExprId) -> ExprId {
        self.alloc(Expr::new(ExprKind::Lambda {
            name: name.into(),
            body,
        }))
    }

    pub fn prim(&mut self, name: impl Into<String>, arity: usize) -> ExprId {
        self.alloc(Expr::new(ExprKind::Prim {
            name: name.into(),
            arity,
        }))
    }

    pub fn construct(&mut self, sum: SumRef, member: usize) -> ExprId {
        self.alloc(Expr::new(ExprKind::Construct { sum, member }))
    }

    pub fn destruct(&mut self, sum: SumRef) -> ExprId {
        self.alloc(Expr::new(ExprKind::Destruct { sum }))
    }

    pub fn get_field(&mut self, sum: SumRef, member: usize, field: usize) -> ExprId {
        self.alloc(Expr::new(ExprKind::Get { sum, member, field }))
    }

    /// Build a binding group; the order map follows declaration order.
    pub fn def(
        &mut self,
        values: Vec<(String, ExprId)>,
        functions: Vec<(String, ExprId)>,
        body: ExprId,
    ) -> ExprId {
        let kind = ExprKind::DefBinding(def_binding(values, functions, body));
        self.alloc(Expr::new(kind))
    }
}

pub(crate) fn def_binding(
    values: Vec<(String, ExprId)>,
    functions: Vec<(String, ExprId)>,
    body: ExprId,
) -> DefBinding {
    let mut order = BTreeMap::new();
    for (index, (name, _)) in values.iter().chain(functions.iter()).enumerate() {
        order.insert(name.clone(), index);
    }
    DefBinding {
        values: values.into_iter().map(|(_, id)| id).collect(),
        functions: functions.into_iter().map(|(_, id)| id).collect(),
        order,
        body,
    }
}

impl Index<ExprId> for ExprArena {
    type Output = Expr;

    fn index(&self, id: ExprId) -> &Expr {
        match self.get(id) {
            Some(expr) => expr,
            None => panic!("expression {} is not live in this arena", id.0),
        }
    }
}

impl IndexMut<ExprId> for ExprArena {
    fn index_mut(&mut self, id: ExprId) -> &mut Expr {
        match self.get_mut(id) {
            Some(expr) => expr,
            None => panic!("expression {} is not live in this arena", id.0),
        }
    }
}

/// An arena together with the root of the tree it holds.
#[derive(Debug, Clone)]
pub struct ExprTree {
    pub arena: ExprArena,
    pub root: ExprId,
}

impl ExprTree {
    pub fn display(&self) -> String {
        self.arena.display(self.root)
    }
}
