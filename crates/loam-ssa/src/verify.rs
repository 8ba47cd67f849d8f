//! Strict-ordering verifier.
//!
//! Reports the same conditions the dump flags with ` !!!`, as diagnostics.

use loam_diag::{Category, Diagnostic, IrLocation};

use crate::scope::ScopeAnalysis;
use crate::term::{FunBlock, Term, TermId, TermKind};

/// Check every operand and block output under `root`, whose id is 0.
pub fn verify_block(root: &Term) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut scope = ScopeAnalysis::new();
    scope.push_term(root);
    if let TermKind::Fun(block) = &root.kind {
        verify_fun(block, 0, &mut scope, &mut diagnostics);
    }
    diagnostics
}

fn verify_fun<'a>(
    block: &'a FunBlock,
    block_id: TermId,
    scope: &mut ScopeAnalysis<'a>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let end = block_id + block.terms.len();
    if block.output > end {
        diagnostics.push(
            Diagnostic::error(
                Category::OutputOutOfRange,
                format!(
                    "output {} of block {block_id} lies past its last term {end}",
                    block.output
                ),
            )
            .at(IrLocation {
                block: block_id,
                term: block_id,
            }),
        );
    }

    scope.truncate(block_id + 1);
    scope.push(&block.terms);
    for (j, term) in block.terms.iter().enumerate() {
        let id = block_id + 1 + j;
        let location = IrLocation {
            block: block_id,
            term: id,
        };
        for &operand in term.operands() {
            if operand >= scope.len() {
                diagnostics.push(
                    Diagnostic::error(
                        Category::UnresolvedReference,
                        format!("operand {operand} of {} is not in scope", term.kind_name()),
                    )
                    .at(location),
                );
            } else if operand >= id {
                diagnostics.push(
                    Diagnostic::error(
                        Category::OrderingViolation,
                        format!(
                            "operand {operand} of {} is not defined before its use",
                            term.kind_name()
                        ),
                    )
                    .at(location)
                    .with_help(format!("operands of term {id} must be below {id}")),
                );
            }
        }
        if let TermKind::Fun(inner) = &term.kind {
            verify_fun(inner, id, scope, diagnostics);
            scope.truncate(id + 1);
            scope.push(&block.terms[j + 1..]);
        }
    }
}
