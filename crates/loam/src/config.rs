use std::fs;
use std::path::Path;

use serde::Deserialize;

use loam_expr::StaticPrimTable;
use loam_ssa::PipelineOptions;

use crate::LoamError;

/// Which passes run, and which primitives exist beyond the builtins.
///
/// Every field may be omitted from a config file; missing fields take their
/// default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptimizerConfig {
    /// Run dead-code elimination on expression trees.
    pub deadcode: bool,
    pub sweep: bool,
    pub inline: bool,
    /// Check operand ordering after the term pipeline and fail on violations.
    pub verify: bool,
    pub inline_limit: usize,
    /// Added to the builtin primitive table; entries here win on a name clash.
    pub prims: StaticPrimTable,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            deadcode: true,
            sweep: true,
            inline: true,
            verify: true,
            inline_limit: PipelineOptions::default().inline_limit,
            prims: StaticPrimTable::new(),
        }
    }
}

impl OptimizerConfig {
    pub fn from_json(source: &str) -> Result<Self, LoamError> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self, LoamError> {
        let source = fs::read_to_string(path).map_err(|source| LoamError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&source)
    }

    /// Builtin primitives extended with the configured ones.
    pub fn prim_table(&self) -> StaticPrimTable {
        let mut table = StaticPrimTable::with_builtins();
        table.extend(self.prims.clone());
        table
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            sweep: self.sweep,
            inline: self.inline,
            inline_limit: self.inline_limit,
        }
    }
}
