//! Call-site inlining.
//!
//! A saturated `App` whose callee is a function block visible at the call
//! site is replaced by a copy of the callee's body when the callee is small
//! and does not refer to itself. Arguments of the copy become the call's
//! actual operands and every later use of the call reads the copy's output
//! instead. A callee whose output is one of its arguments inlines to nothing
//! at all. Callees left unused are removed by the next sweep.

use crate::scope::TargetScope;
use crate::source_map::{INVALID, SourceMap, relocate};
use crate::term::{FunBlock, Term, TermId, TermKind};

/// Inline eligible calls under `root`. `limit` bounds the number of
/// non-argument terms a callee may have. Returns the number of calls
/// inlined.
pub fn pass_inline(root: &mut Term, limit: usize) -> usize {
    let TermKind::Fun(block) = &mut root.kind else {
        return 0;
    };
    let mut inliner = Inliner {
        scope: TargetScope::new(),
        map: SourceMap::identity(1),
        open: vec![0],
        limit,
        inlined: 0,
    };
    inliner.scope.push(Term::fun(Vec::new(), 0));
    inliner.rebuild(block);
    tracing::debug!(inlined = inliner.inlined, limit, "inline pass finished");
    inliner.inlined
}

struct Inliner {
    scope: TargetScope,
    map: SourceMap,
    /// Blocks currently being rebuilt; their terms are not in `scope`.
    open: Vec<TermId>,
    limit: usize,
    inlined: usize,
}

impl Inliner {
    fn rebuild(&mut self, block: &mut FunBlock) {
        let start = self.scope.len();
        for mut term in std::mem::take(&mut block.terms) {
            if let TermKind::Fun(inner) = &mut term.kind {
                let mut inner = std::mem::take(inner);
                let id = self.scope.push(term);
                self.map.push(id);
                let base = self.map.len();
                self.open.push(id);
                self.rebuild(&mut inner);
                self.open.pop();
                self.map.truncate(base);
                if let Some(Term {
                    kind: TermKind::Fun(slot),
                    ..
                }) = self.scope.get_mut(id)
                {
                    *slot = inner;
                }
                continue;
            }

            term.update(&self.map);
            match self.expand(&term) {
                Some(result) => {
                    tracing::trace!(result, "inlined call");
                    self.inlined += 1;
                    self.map.push(result);
                }
                None => {
                    let id = self.scope.push(term);
                    self.map.push(id);
                }
            }
        }
        block.output = self.map.get(block.output);
        block.terms = self.scope.unwind(start);
    }

    /// Copy the callee of `term` into the scope and return the id its result
    /// now has, or `None` if the call is not eligible.
    ///
    /// The callee is read from the rebuilt scope, so calls inside its body
    /// have already been inlined when it is copied.
    fn expand(&mut self, term: &Term) -> Option<TermId> {
        let TermKind::App { args } = &term.kind else {
            return None;
        };
        let (&callee_id, actuals) = args.split_first()?;
        if self.open.contains(&callee_id) {
            return None;
        }
        let TermKind::Fun(callee) = &self.scope.get(callee_id)?.kind else {
            return None;
        };
        if !self.eligible(callee, callee_id, actuals.len()) {
            return None;
        }
        let callee = callee.clone();

        // ids below the callee are shared with the call site
        let mut map = SourceMap::identity(callee_id);
        map.push(INVALID);
        let mut actuals = actuals.iter().copied();
        for mut body_term in callee.terms {
            if body_term.is_arg() {
                map.push(actuals.next().unwrap_or(INVALID));
                continue;
            }
            let id = self.scope.len();
            relocate(&mut body_term, id, &mut map);
            self.scope.push(body_term);
        }
        Some(map.get(callee.output))
    }

    fn eligible(&self, callee: &FunBlock, callee_id: TermId, supplied: usize) -> bool {
        let arity = callee.arity();
        arity == supplied
            && callee.size() - arity <= self.limit
            && callee.output <= callee_id + callee.terms.len()
            && !callee.mentions(callee_id)
    }
}
