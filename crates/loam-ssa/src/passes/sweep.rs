//! Dead-term sweep.

use crate::scope::TargetScope;
use crate::source_map::{INVALID, SourceMap};
use crate::term::{FunBlock, Term, TermKind};

/// Drop every term without `USED` and renumber the survivors. Returns the
/// number of terms removed, counting terms nested in removed blocks.
pub fn pass_sweep(root: &mut Term) -> usize {
    let TermKind::Fun(block) = &mut root.kind else {
        return 0;
    };
    let mut scope = TargetScope::new();
    let mut map = SourceMap::identity(1);
    let mut swept = 0;
    scope.push(Term::fun(Vec::new(), 0));
    sweep_block(block, &mut scope, &mut map, &mut swept);
    tracing::debug!(swept, remaining = block.size(), "sweep pass finished");
    swept
}

/// Rebuild `block`, whose own term sits at the top of `scope` with the entry
/// for it already in `map`.
fn sweep_block(
    block: &mut FunBlock,
    scope: &mut TargetScope,
    map: &mut SourceMap,
    swept: &mut usize,
) {
    let start = scope.len();
    for mut term in std::mem::take(&mut block.terms) {
        if !term.is_used() {
            *swept += term.size();
            map.push(INVALID);
            continue;
        }
        if let TermKind::Fun(inner) = &mut term.kind {
            let mut inner = std::mem::take(inner);
            let id = scope.push(term);
            map.push(id);
            let base = map.len();
            sweep_block(&mut inner, scope, map, swept);
            map.truncate(base);
            if let Some(Term {
                kind: TermKind::Fun(slot),
                ..
            }) = scope.get_mut(id)
            {
                *slot = inner;
            }
        } else {
            term.update(map);
            let id = scope.push(term);
            map.push(id);
        }
    }
    block.output = map.get(block.output);
    block.terms = scope.unwind(start);
}
