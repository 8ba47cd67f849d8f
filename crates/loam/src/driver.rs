use std::fs;
use std::path::Path;

use loam_diag::{Diagnostic, DiagnosticError};
use loam_expr::{SurfaceExpr, lower_surface};
use loam_opt::{DeadcodeStats, optimize_deadcode};
use loam_ssa::{PipelineStats, Term, dump, optimize_with, verify_block};

use crate::{LoamError, OptimizerConfig};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExprOutcome {
    pub before: String,
    pub after: String,
    /// `None` when dead-code elimination is disabled.
    pub stats: Option<DeadcodeStats>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsaOutcome {
    pub before: String,
    pub after: String,
    pub stats: PipelineStats,
}

/// Lower a surface expression tree and remove its dead bindings.
pub fn optimize_expr_source(
    source: &str,
    config: &OptimizerConfig,
) -> Result<ExprOutcome, LoamError> {
    let surface: SurfaceExpr = serde_json::from_str(source)?;
    let mut tree = lower_surface(&surface)?;
    let before = tree.display();

    let stats = config
        .deadcode
        .then(|| optimize_deadcode(&mut tree, &config.prim_table()));

    Ok(ExprOutcome {
        before,
        after: tree.display(),
        stats,
    })
}

/// Run the term pipeline over a root function block.
///
/// The input must already respect operand ordering. With `verify` set the
/// result is checked again after the passes.
pub fn optimize_ssa_source(
    source: &str,
    config: &OptimizerConfig,
) -> Result<SsaOutcome, LoamError> {
    let mut root: Term = serde_json::from_str(source)?;
    check_ordering(&root)?;
    let before = dump(&root);

    let stats = optimize_with(&mut root, &config.prim_table(), &config.pipeline_options())?;
    if config.verify {
        check_ordering(&root)?;
    }

    Ok(SsaOutcome {
        before,
        after: dump(&root),
        stats,
    })
}

pub fn optimize_expr_file(path: &Path, config: &OptimizerConfig) -> Result<ExprOutcome, LoamError> {
    optimize_expr_source(&read_source(path)?, config)
}

pub fn optimize_ssa_file(path: &Path, config: &OptimizerConfig) -> Result<SsaOutcome, LoamError> {
    optimize_ssa_source(&read_source(path)?, config)
}

pub fn emit_diagnostics(diags: &[Diagnostic]) {
    for diag in diags {
        eprintln!("{diag}");
    }
}

fn read_source(path: &Path) -> Result<String, LoamError> {
    fs::read_to_string(path).map_err(|source| LoamError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn check_ordering(root: &Term) -> Result<(), LoamError> {
    let diagnostics = verify_block(root);
    if diagnostics.is_empty() {
        Ok(())
    } else {
        tracing::warn!(count = diagnostics.len(), "term block breaks operand ordering");
        Err(DiagnosticError::multiple(diagnostics).into())
    }
}
