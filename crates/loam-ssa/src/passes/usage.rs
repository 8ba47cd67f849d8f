//! Usage marking over SSA terms.
//!
//! Each block is scanned backward from its output. Impure terms and block
//! arguments are live no matter what reads them; a live function block has
//! its own body scanned, which may revive terms of enclosing blocks that
//! the enclosing scan has not reached yet.

use loam_expr::Flags;

use crate::term::{FunBlock, Term, TermId, TermKind};

/// Set `USED` on every term that the output of `root` needs. Requires
/// [`crate::passes::pass_purity`] to have run.
pub fn pass_usage(root: &mut Term) {
    let mut used = vec![true];
    if let TermKind::Fun(block) = &mut root.kind {
        block_usage(block, &mut used);
    }
    root.flags.set(Flags::USED, true);
}

fn mark(used: &mut [bool], id: TermId) {
    if let Some(slot) = used.get_mut(id) {
        *slot = true;
    }
}

/// `used` holds one entry per id up to and including the block's own id.
fn block_usage(block: &mut FunBlock, used: &mut Vec<bool>) {
    let base = used.len();
    used.resize(base + block.terms.len(), false);
    mark(used, block.output);

    for (j, term) in block.terms.iter_mut().enumerate().rev() {
        let id = base + j;
        if term.is_arg() || !term.is_pure() {
            used[id] = true;
        }
        if used[id] {
            if let TermKind::Fun(inner) = &mut term.kind {
                let later = used.split_off(id + 1);
                block_usage(inner, used);
                used.truncate(id + 1);
                used.extend(later);
            } else {
                for &operand in term.operands() {
                    mark(used, operand);
                }
            }
        }
        term.flags.set(Flags::USED, used[id]);
    }
}
