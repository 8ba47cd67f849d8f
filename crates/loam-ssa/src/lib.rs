//! SSA term model and term optimizer for loam.
//!
//! A program is a root [`Term`] holding a [`FunBlock`]. Terms name earlier
//! terms by scope position (see [`term`]); [`format::dump`] renders a block
//! and flags ordering violations, [`verify_block`] reports them as
//! diagnostics. [`optimize_with`] runs purity, usage, sweep and inlining.

pub mod format;
pub mod passes;
pub mod scope;
pub mod source_map;
pub mod term;
pub mod verify;


use loam_expr::PrimTable;

pub use format::{TermFormat, dump};
pub use passes::{pass_inline, pass_purity, pass_sweep, pass_usage};
pub use scope::{ScopeAnalysis, TargetScope};
pub use source_map::{INVALID, SourceMap, relocate};
pub use term::{FunBlock, Term, TermId, TermKind};
pub use verify::verify_block;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum SsaError {
    #[error("root term must be a function block, found `{found}`")]
    RootNotFunction { found: &'static str },
    #[error("`{kind}` term {id} needs at least {expected} operand(s), got {actual}")]
    MissingOperands {
        id: TermId,
        kind: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("`get` term {id} takes exactly one operand, got {actual}")]
    GetArity { id: TermId, actual: usize },
    #[error("primitive `{name}` at term {id} takes {expected} operand(s), got {actual}")]
    PrimArity {
        id: TermId,
        name: String,
        expected: usize,
        actual: usize,
    },
}

/// Which optional passes run after purity and usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    pub sweep: bool,
    pub inline: bool,
    /// Largest callee, in non-argument terms, that may be inlined.
    pub inline_limit: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            sweep: true,
            inline: true,
            inline_limit: 8,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub swept: usize,
    pub inlined: usize,
}

/// Run the full pipeline with default options.
pub fn optimize(root: &mut Term, prims: &dyn PrimTable) -> Result<PipelineStats, SsaError> {
    optimize_with(root, prims, &PipelineOptions::default())
}

/// Run purity, usage, then the passes `options` enables.
///
/// Calls made dead by inlining are removed by a second purity, usage and
/// sweep round.
pub fn optimize_with(
    root: &mut Term,
    prims: &dyn PrimTable,
    options: &PipelineOptions,
) -> Result<PipelineStats, SsaError> {
    check_shapes(root, prims)?;
    let mut stats = PipelineStats::default();

    pass_purity(root, prims);
    pass_usage(root);
    if options.sweep {
        stats.swept += pass_sweep(root);
    }
    if options.inline {
        stats.inlined = pass_inline(root, options.inline_limit);
        if stats.inlined > 0 {
            pass_purity(root, prims);
            pass_usage(root);
            if options.sweep {
                stats.swept += pass_sweep(root);
            }
        }
    }

    tracing::debug!(
        swept = stats.swept,
        inlined = stats.inlined,
        terms = root.size(),
        "term pipeline finished"
    );
    Ok(stats)
}

/// Reject trees the passes cannot give a meaning to.
///
/// Calls to primitives the table knows must supply exactly their arity;
/// unknown primitives are left alone.
pub fn check_shapes(root: &Term, prims: &dyn PrimTable) -> Result<(), SsaError> {
    let TermKind::Fun(block) = &root.kind else {
        return Err(SsaError::RootNotFunction {
            found: root.kind_name(),
        });
    };
    check_block(block, 0, prims)
}

fn check_block(
    block: &FunBlock,
    block_id: TermId,
    prims: &dyn PrimTable,
) -> Result<(), SsaError> {
    for (j, term) in block.terms.iter().enumerate() {
        let id = block_id + 1 + j;
        let actual = term.operands().len();
        match &term.kind {
            TermKind::App { .. } | TermKind::Des { .. } if actual == 0 => {
                return Err(SsaError::MissingOperands {
                    id,
                    kind: term.kind_name(),
                    expected: 1,
                    actual,
                });
            }
            TermKind::Get { .. } if actual != 1 => {
                return Err(SsaError::GetArity { id, actual });
            }
            TermKind::Prim { name, .. } => match prims.lookup(name) {
                Some(info) if info.arity != actual => {
                    return Err(SsaError::PrimArity {
                        id,
                        name: name.clone(),
                        expected: info.arity,
                        actual,
                    });
                }
                _ => {}
            },
            TermKind::Fun(inner) => check_block(inner, id, prims)?,
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use loam_expr::{Literal, StaticPrimTable};

    #[test]
    fn root_must_be_a_function_block() {
        let mut root = Term::lit(Literal::Unit);
        let err = optimize(&mut root, &StaticPrimTable::with_builtins())
            .expect_err("literal root should be rejected");
        assert_eq!(err, SsaError::RootNotFunction { found: "lit" });
        assert_eq!(
            err.to_string(),
            "root term must be a function block, found `lit`"
        );
    }

    #[test]
    fn shape_errors_name_the_term() {
        let prims = StaticPrimTable::with_builtins();
        let inner = Term::fun(vec![Term::app(vec![])], 2);
        let root = Term::fun(vec![inner], 1);
        assert_eq!(
            check_shapes(&root, &prims),
            Err(SsaError::MissingOperands {
                id: 2,
                kind: "app",
                expected: 1,
                actual: 0,
            })
        );

        let two_operand_get = Term::new(TermKind::Get {
            index: 0,
            args: vec![1, 2],
        });
        let root = Term::fun(
            vec![Term::arg(), Term::prim("pair", vec![1, 1]), two_operand_get],
            3,
        );
        assert_eq!(check_shapes(&root, &prims), Err(SsaError::GetArity { id: 3, actual: 2 }));
    }

    #[test]
    fn known_primitives_must_get_their_arity() {
        // 1 = 4; 2 = neg(1 1) -> 2
        let mut root = Term::fun(
            vec![Term::lit(Literal::Integer(4)), Term::prim("neg", vec![1, 1])],
            2,
        );
        let err = optimize(&mut root, &StaticPrimTable::with_builtins())
            .expect_err("neg with two operands should be rejected");
        assert_eq!(
            err,
            SsaError::PrimArity {
                id: 2,
                name: "neg".to_string(),
                expected: 1,
                actual: 2,
            }
        );
        assert_eq!(
            err.to_string(),
            "primitive `neg` at term 2 takes 1 operand(s), got 2"
        );

        let mut table = StaticPrimTable::new();
        table.insert("neg", loam_expr::PrimInfo::pure(2));
        assert_eq!(check_shapes(&root, &table), Ok(()));
        assert_eq!(check_shapes(&root, &StaticPrimTable::new()), Ok(()));
    }

    #[test]
    fn inlined_callee_is_swept() {
        // 1 = fun { 2 = arg } -> 2; 2 = 4; 3 = App(1 2); 4 = neg(3) -> 4
        let mut root = Term::fun(
            vec![
                Term::fun(vec![Term::arg()], 2),
                Term::lit(Literal::Integer(4)),
                Term::app(vec![1, 2]),
                Term::prim("neg", vec![3]),
            ],
            4,
        );
        let stats = optimize(&mut root, &StaticPrimTable::with_builtins())
            .expect("pipeline should accept a function block");
        assert_eq!(stats, PipelineStats { swept: 2, inlined: 1 });
        assert_eq!(dump(&root), "0 [1] = FunRet:2\n    1 [1] = 4\n    2 [1] = neg(1)\n");
    }

    #[test]
    fn disabled_passes_leave_terms_in_place() {
        let mut root = Term::fun(
            vec![Term::lit(Literal::Integer(1)), Term::lit(Literal::Integer(2))],
            2,
        );
        let options = PipelineOptions {
            sweep: false,
            inline: false,
            ..PipelineOptions::default()
        };
        let stats = optimize_with(&mut root, &StaticPrimTable::with_builtins(), &options)
            .expect("pipeline should accept a function block");
        assert_eq!(stats, PipelineStats::default());
        let TermKind::Fun(block) = &root.kind else {
            panic!("expected function block");
        };
        assert_eq!(block.terms.len(), 2);
        assert!(!block.terms[0].is_used());
        assert!(block.terms[1].is_used());
    }
}
