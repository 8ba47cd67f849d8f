//! Scope tracking for passes that rebuild or inspect blocks.

use crate::term::{Term, TermId};

/// Flat list of the terms being emitted, indexed by their new ids.
///
/// A pass rebuilding a nested block pushes the block's own term first (with
/// its terms moved out), appends the rebuilt terms after it, and finally
/// unwinds them back into the block.
#[derive(Debug, Default)]
pub struct TargetScope {
    terms: Vec<Term>,
}

impl TargetScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Append `term` and return its id.
    pub fn push(&mut self, term: Term) -> TermId {
        self.terms.push(term);
        self.terms.len() - 1
    }

    pub fn get(&self, id: TermId) -> Option<&Term> {
        self.terms.get(id)
    }

    pub fn get_mut(&mut self, id: TermId) -> Option<&mut Term> {
        self.terms.get_mut(id)
    }

    /// Detach every term from `new_end` on, in order.
    pub fn unwind(&mut self, new_end: usize) -> Vec<Term> {
        if new_end >= self.terms.len() {
            return Vec::new();
        }
        self.terms.split_off(new_end)
    }
}

/// Terms visible at a point, indexed by id.
///
/// Built by pushing the term lists of enclosing blocks outermost first; a
/// pass entering a nested block truncates back to the block's own id before
/// pushing the nested terms.
#[derive(Debug, Default)]
pub struct ScopeAnalysis<'a> {
    scope: Vec<&'a Term>,
}

impl<'a> ScopeAnalysis<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, terms: &'a [Term]) {
        self.scope.extend(terms);
    }

    pub fn push_term(&mut self, term: &'a Term) {
        self.scope.push(term);
    }

    pub fn truncate(&mut self, len: usize) {
        self.scope.truncate(len);
    }

    pub fn len(&self) -> usize {
        self.scope.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scope.is_empty()
    }

    pub fn get(&self, id: TermId) -> Option<&'a Term> {
        self.scope.get(id).copied()
    }
}
