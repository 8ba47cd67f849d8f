//! Optimizer driver for loam.
//!
//! Reads expression trees and SSA function blocks in their JSON forms, runs
//! the configured passes and returns printable dumps of the result.

mod config;
mod driver;

use std::path::PathBuf;

use loam_diag::DiagnosticError;
use loam_expr::LowerError;
use loam_ssa::SsaError;

pub use config::OptimizerConfig;
pub use driver::{
    ExprOutcome, SsaOutcome, emit_diagnostics, optimize_expr_file, optimize_expr_source,
    optimize_ssa_file, optimize_ssa_source,
};

#[derive(Debug, thiserror::Error)]
pub enum LoamError {
    #[error("failed to read `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("lowering failed: {0}")]
    Lower(#[from] LowerError),
    #[error("term pipeline rejected input: {0}")]
    Ssa(#[from] SsaError),
    #[error("ordering check failed: {0}")]
    Verify(#[from] DiagnosticError),
}
