//! Forward purity propagation.
//!
//! One top-down walk computes the purity mask of every node from the masks of
//! its children and of the bindings its references resolve to.

use loam_expr::{ExprArena, ExprId, ExprKind, Flags, PrimTable, Purity, Stack, resolve};

/// Compute `meta` and `PURE` for `id` and its entire subtree.
pub fn propagate_purity(
    arena: &mut ExprArena,
    id: ExprId,
    stack: Option<&Stack<'_>>,
    prims: &dyn PrimTable,
) {
    let meta = match &arena[id].kind {
        ExprKind::VarRef { target, .. } => {
            // Recursive calls are assumed pure at every depth, so an unused
            // result of a non-terminating pure recursion may be dropped.
            if arena[id].flags.contains(Flags::RECURSIVE) {
                Purity::ALL
            } else {
                let target = resolve(arena, stack, *target).map_or(Purity::NONE, |t| arena[t].meta);
                Purity(target.0 | 1)
            }
        }
        ExprKind::App { func, arg } => {
            let (func, arg) = (*func, *arg);
            propagate_purity(arena, arg, stack, prims);
            propagate_purity(arena, func, stack, prims);
            arena[func].meta.apply(arena[arg].meta)
        }
        ExprKind::Lambda { body, .. } => {
            let body = *body;
            let frame = Stack::new(id, stack);
            propagate_purity(arena, body, Some(&frame), prims);
            arena[body].meta.abstraction()
        }
        ExprKind::DefBinding(def) => {
            let values = def.values.clone();
            let functions = def.functions.clone();
            let body = def.body;
            let frame = Stack::new(id, stack);
            for &value in &values {
                propagate_purity(arena, value, stack, prims);
            }
            for &function in &functions {
                propagate_purity(arena, function, Some(&frame), prims);
            }
            propagate_purity(arena, body, Some(&frame), prims);
            // Functions only matter once called, so they stay out of the meet.
            values
                .iter()
                .fold(arena[body].meta, |meta, &value| meta & arena[value].meta)
        }
        ExprKind::Destruct { sum } => {
            let handlers = sum.members.len();
            let mut isect = Purity::ALL;
            for member in 0..handlers {
                let handler = stack.and_then(|s| s.index(arena, member + 1));
                isect = isect & handler.map_or(Purity::EVAL, |h| arena[h].meta);
            }
            let tuple = stack
                .and_then(|s| s.index(arena, 0))
                .map_or(Purity::NONE, |t| arena[t].meta);
            isect.apply(tuple)
        }
        ExprKind::Prim { name, .. } => {
            if prims.is_pure(name) {
                Purity::EVAL
            } else {
                Purity::NONE
            }
        }
        ExprKind::Literal(_) | ExprKind::Construct { .. } | ExprKind::Get { .. } => Purity::EVAL,
    };

    let expr = &mut arena[id];
    expr.meta = meta;
    expr.flags.set(Flags::PURE, meta.is_pure());
}
