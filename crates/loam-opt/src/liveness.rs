//! Liveness marking.
//!
//! Marks every binding the surviving program needs. Binding groups are
//! visited body first, then functions and values in reverse declaration
//! order, so a binding is only explored once something live has named it.
//! Functions are expected in callee-before-caller order: a live function can
//! revive one declared earlier, never one declared later.
//! [`loam_expr::lower_surface`] rejects groups that break this order.

use loam_expr::{ExprArena, ExprId, ExprKind, Flags, Stack, resolve};

/// Set `USED` on every binding reachable from `id`.
///
/// Requires purity to have been propagated: impure values are kept even when
/// nothing reads them.
pub fn mark_usage(arena: &mut ExprArena, id: ExprId, stack: Option<&Stack<'_>>) {
    match &arena[id].kind {
        ExprKind::VarRef { target, .. } => {
            if let Some(target) = resolve(arena, stack, *target) {
                arena[target].flags.set(Flags::USED, true);
            }
        }
        ExprKind::App { func, arg } => {
            let (func, arg) = (*func, *arg);
            mark_usage(arena, func, stack);
            mark_usage(arena, arg, stack);
        }
        ExprKind::Lambda { body, .. } => {
            let body = *body;
            let frame = Stack::new(id, stack);
            mark_usage(arena, body, Some(&frame));
        }
        ExprKind::DefBinding(def) => {
            let values = def.values.clone();
            let functions = def.functions.clone();
            let body = def.body;
            let frame = Stack::new(id, stack);

            for &binding in values.iter().chain(&functions) {
                arena[binding].flags.set(Flags::USED, false);
            }

            mark_usage(arena, body, Some(&frame));

            for &function in functions.iter().rev() {
                if arena[function].is_used() {
                    mark_usage(arena, function, Some(&frame));
                }
            }

            for &value in values.iter().rev() {
                if !arena[value].is_pure() {
                    arena[value].flags.set(Flags::USED, true);
                }
                if arena[value].is_used() {
                    // values are evaluated outside their own group
                    mark_usage(arena, value, stack);
                }
            }
        }
        ExprKind::Literal(_)
        | ExprKind::Construct { .. }
        | ExprKind::Destruct { .. }
        | ExprKind::Get { .. }
        | ExprKind::Prim { .. } => {}
    }
}
