//! Dead-code elimination over the loam expression tree.
//!
//! Three passes run once each, in order:
//!
//! 1. [`propagate_purity`] computes the purity mask of every node;
//! 2. [`mark_usage`] marks the bindings the program needs, keeping every
//!    impure value;
//! 3. [`compact`] drops the rest and renumbers positional references.
//!
//! Each pass reads what the previous one wrote, so none of them iterates to a
//! fixed point.

pub mod compact;
pub mod liveness;
pub mod purity;

#[cfg(test)]
mod prop_tests;

use loam_expr::{ExprTree, PrimTable};

pub use compact::{CompactStats, compact};
pub use liveness::mark_usage;
pub use purity::propagate_purity;

/// What a dead-code run removed.
pub type DeadcodeStats = CompactStats;

/// Remove unused pure bindings from `tree`, in place.
pub fn optimize_deadcode(tree: &mut ExprTree, prims: &dyn PrimTable) -> DeadcodeStats {
    let root = tree.root;
    propagate_purity(&mut tree.arena, root, None, prims);
    mark_usage(&mut tree.arena, root, None);

    let mut compress = vec![0];
    let mut stats = CompactStats::default();
    compact(&mut tree.arena, root, &mut compress, &mut stats);

    tracing::debug!(
        removed_values = stats.removed_values,
        removed_functions = stats.removed_functions,
        released_nodes = stats.released_nodes,
        live_nodes = tree.arena.live_count(),
        "dead-code elimination finished"
    );
    stats
}
