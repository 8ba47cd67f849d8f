//! The environment chain: one frame per enclosing binder.
//!
//! Frames live on the Rust call stack of whichever pass is walking the tree;
//! each frame borrows its parent, so the chain never outlives the traversal.

use crate::arena::{ExprArena, ExprId, ExprKind, VarTarget};

#[derive(Debug, Clone, Copy)]
pub struct Stack<'a> {
    /// The `Lambda` or `DefBinding` that introduces this frame.
    pub expr: ExprId,
    pub next: Option<&'a Stack<'a>>,
}

impl<'a> Stack<'a> {
    pub fn new(expr: ExprId, next: Option<&'a Stack<'a>>) -> Self {
        Self { expr, next }
    }

    /// Positional slots this frame contributes.
    pub fn size(&self, arena: &ExprArena) -> usize {
        match &arena[self.expr].kind {
            ExprKind::Lambda { .. } => 1,
            ExprKind::DefBinding(def) => def.values.len(),
            _ => 0,
        }
    }

    /// The expression bound at positional slot `index`.
    ///
    /// Returns `None` for lambda arguments (their value is unknown) and for
    /// indices that run past the outermost frame.
    pub fn index(&self, arena: &ExprArena, index: usize) -> Option<ExprId> {
        let mut frame = self;
        let mut idx = index;
        loop {
            let size = frame.size(arena);
            if idx < size {
                break;
            }
            idx -= size;
            frame = frame.next?;
        }
        match &arena[frame.expr].kind {
            ExprKind::DefBinding(def) => def.values.get(idx).copied(),
            _ => None,
        }
    }
}

/// Resolve a reference against an optional chain.
///
/// Identity references bypass the chain entirely.
pub fn resolve(arena: &ExprArena, stack: Option<&Stack<'_>>, target: VarTarget) -> Option<ExprId> {
    match target {
        VarTarget::Binding(id) => arena.contains(id).then_some(id),
        VarTarget::Index(index) => stack?.index(arena, index),
    }
}
