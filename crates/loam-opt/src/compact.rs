//! Index compaction.
//!
//! Drops unused bindings and renumbers positional references to match.
//! `compress` mirrors the environment chain one entry per positional slot:
//! entry `k` counts the live slots among the outermost `k`, so the distance
//! between two entries is the number of surviving slots between them.

use std::collections::BTreeMap;

use loam_expr::{ExprArena, ExprId, ExprKind, VarTarget};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompactStats {
    pub removed_values: usize,
    pub removed_functions: usize,
    pub released_nodes: usize,
}

/// Rewrite positional indices below `id` and drop bindings not marked `USED`.
///
/// `compress` must hold at least one entry; the outermost entry is zero.
pub fn compact(
    arena: &mut ExprArena,
    id: ExprId,
    compress: &mut Vec<usize>,
    stats: &mut CompactStats,
) {
    match &arena[id].kind {
        ExprKind::VarRef {
            target: VarTarget::Index(old),
            ..
        } => {
            let new = renumber(compress, *old);
            if let ExprKind::VarRef { target, .. } = &mut arena[id].kind {
                *target = VarTarget::Index(new);
            }
        }
        ExprKind::VarRef {
            target: VarTarget::Binding(_),
            ..
        } => {}
        ExprKind::App { func, arg } => {
            let (func, arg) = (*func, *arg);
            compact(arena, arg, compress, stats);
            compact(arena, func, compress, stats);
        }
        ExprKind::Lambda { body, .. } => {
            let body = *body;
            let top = live_slots(compress);
            compress.push(top + 1);
            compact(arena, body, compress, stats);
            compress.pop();
        }
        ExprKind::DefBinding(def) => {
            let values = def.values.clone();
            let functions = def.functions.clone();
            let body = def.body;
            let names: Vec<Option<String>> = def
                .names_by_index()
                .into_iter()
                .map(|name| name.map(str::to_string))
                .collect();

            for &value in &values {
                if arena[value].is_used() {
                    compact(arena, value, compress, stats);
                }
            }
            // the first value ends up innermost, at index 0
            for &value in values.iter().rev() {
                let top = live_slots(compress);
                compress.push(top + usize::from(arena[value].is_used()));
            }

            let mut order = BTreeMap::new();
            let mut kept = 0;
            let mut kept_values = Vec::with_capacity(values.len());
            let mut kept_functions = Vec::with_capacity(functions.len());
            let bindings = values
                .iter()
                .map(|&value| (value, false))
                .chain(functions.iter().map(|&function| (function, true)));
            for (index, (binding, is_function)) in bindings.enumerate() {
                if arena[binding].is_used() {
                    if let Some(Some(name)) = names.get(index) {
                        order.insert(name.clone(), kept);
                    }
                    kept += 1;
                    if is_function {
                        compact(arena, binding, compress, stats);
                        kept_functions.push(binding);
                    } else {
                        kept_values.push(binding);
                    }
                } else {
                    if is_function {
                        stats.removed_functions += 1;
                    } else {
                        stats.removed_values += 1;
                    }
                    stats.released_nodes += arena.release(binding);
                }
            }

            compact(arena, body, compress, stats);
            compress.truncate(compress.len() - values.len());

            if let ExprKind::DefBinding(def) = &mut arena[id].kind {
                def.values = kept_values;
                def.functions = kept_functions;
                def.order = order;
            }
        }
        ExprKind::Literal(_)
        | ExprKind::Construct { .. }
        | ExprKind::Destruct { .. }
        | ExprKind::Get { .. }
        | ExprKind::Prim { .. } => {}
    }
}

fn live_slots(compress: &[usize]) -> usize {
    compress.last().copied().unwrap_or_default()
}

/// New index of a reference that skipped `old` slots.
///
/// References past the outermost slot point outside the tree; they keep
/// their distance beyond it.
fn renumber(compress: &[usize], old: usize) -> usize {
    let depth = compress.len().saturating_sub(1);
    let top = live_slots(compress);
    if old <= depth {
        top - compress[depth - old]
    } else {
        top + (old - depth)
    }
}
