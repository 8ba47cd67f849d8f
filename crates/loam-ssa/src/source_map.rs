//! Id remapping after terms are dropped, moved, or copied.

use crate::term::{Term, TermId, TermKind};

/// Marks an id whose term no longer exists.
pub const INVALID: TermId = usize::MAX;

/// Old scope position to new scope position.
///
/// Maps are built as a stack in scope order: the entry for a term is pushed
/// after the terms before it, and a nested block's entries are truncated
/// away once the block is done.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceMap {
    targets: Vec<TermId>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map every id below `len` to itself.
    pub fn identity(len: usize) -> Self {
        SourceMap {
            targets: (0..len).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn push(&mut self, new: TermId) {
        self.targets.push(new);
    }

    pub fn truncate(&mut self, len: usize) {
        self.targets.truncate(len);
    }

    /// New id for `old`, or [`INVALID`] if it was dropped or never mapped.
    pub fn get(&self, old: TermId) -> TermId {
        self.targets.get(old).copied().unwrap_or(INVALID)
    }
}

/// Move `term` to scope position `new_id`, rewriting everything it holds.
///
/// `map.len()` must equal the term's old id. On return the term's own entry
/// has been pushed.
pub fn relocate(term: &mut Term, new_id: TermId, map: &mut SourceMap) {
    let base = map.len();
    if let TermKind::Fun(block) = &mut term.kind {
        map.push(new_id);
        for (j, inner) in block.terms.iter_mut().enumerate() {
            relocate(inner, new_id + 1 + j, map);
        }
        term.update(map);
        map.truncate(base);
    } else {
        term.update(map);
    }
    map.push(new_id);
}
