//! Purity over SSA terms.
//!
//! Same lattice as the expression tree: a function block of arity `k` is
//! pure to construct and to partially apply, and its `k`th layer is the
//! purity of running its body. While a block's body is analyzed, references
//! to the block itself are assumed pure at every depth.

use loam_expr::{Flags, PrimTable, Purity};

use crate::term::{FunBlock, Term, TermId, TermKind};

/// Compute `meta` and `PURE` for `root` (id 0) and every term under it.
pub fn pass_purity(root: &mut Term, prims: &dyn PrimTable) {
    let mut metas = Vec::new();
    let meta = term_purity(root, &mut metas, prims);
    set_meta(root, meta);
}

fn set_meta(term: &mut Term, meta: Purity) {
    term.meta = meta;
    term.flags.set(Flags::PURE, meta.is_pure());
}

fn lookup(metas: &[Purity], id: TermId) -> Purity {
    metas.get(id).copied().unwrap_or(Purity::NONE)
}

/// `metas` holds one entry per id below the term's own id.
fn term_purity(term: &mut Term, metas: &mut Vec<Purity>, prims: &dyn PrimTable) -> Purity {
    match &mut term.kind {
        TermKind::Arg | TermKind::Lit(_) | TermKind::Get { .. } | TermKind::Con { .. } => {
            Purity::EVAL
        }
        TermKind::App { args } => {
            let mut operands = args.iter().map(|&id| lookup(metas, id));
            let func = operands.next().unwrap_or(Purity::NONE);
            operands.fold(func, Purity::apply)
        }
        TermKind::Prim { name, .. } => {
            if prims.is_pure(name) {
                Purity::EVAL
            } else {
                Purity::NONE
            }
        }
        TermKind::Des { args } => match args.split_last() {
            Some((&scrutinee, handlers)) => handlers
                .iter()
                .fold(Purity::ALL, |meet, &handler| meet & lookup(metas, handler))
                .apply(lookup(metas, scrutinee)),
            None => Purity::NONE,
        },
        TermKind::Fun(block) => {
            let own = metas.len();
            metas.push(Purity::ALL);
            let meta = block_purity(block, metas, prims);
            metas.truncate(own);
            meta
        }
    }
}

fn block_purity(block: &mut FunBlock, metas: &mut Vec<Purity>, prims: &dyn PrimTable) -> Purity {
    let mut body_pure = true;
    let mut arity = 0;
    for term in &mut block.terms {
        let meta = term_purity(term, metas, prims);
        set_meta(term, meta);
        if term.is_arg() {
            arity += 1;
        } else {
            body_pure &= meta.is_pure();
        }
        metas.push(meta);
    }
    let result = lookup(metas, block.output).with_eval(body_pure);
    (0..arity).fold(result, |meta, _| meta.abstraction())
}
