//! Diagnostics for the loam optimizer.
//!
//! The optimizer passes never fail on well-formed input; what they can do is
//! notice that their input (or output) breaks an IR invariant. Such findings
//! are reported as structured [`Diagnostic`]s so that dumps and verifiers can
//! keep going and report every problem at once.

use std::fmt;

/// Which IR invariant a diagnostic is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// An SSA operand refers to a term at or after its user.
    OrderingViolation,
    /// A function block output lies outside the block.
    OutputOutOfRange,
    /// An operand names no term visible from its user.
    UnresolvedReference,
}

impl Category {
    pub fn code(self) -> &'static str {
        match self {
            Category::OrderingViolation => "L0001",
            Category::OutputOutOfRange => "L0002",
            Category::UnresolvedReference => "L0003",
        }
    }
}

/// Where in an SSA function a diagnostic points.
///
/// `term` is the scope-position id of the offending term; `block` is the id
/// of the function block that directly contains it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IrLocation {
    pub block: usize,
    pub term: usize,
}

impl fmt::Display for IrLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "term {} in block {}", self.term, self.block)
    }
}

/// An invariant violation found by a verifier. Every diagnostic is an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub category: Category,
    pub message: String,
    pub location: Option<IrLocation>,
    pub help: Option<String>,
}

impl Diagnostic {
    pub fn error(category: Category, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            location: None,
            help: None,
        }
    }

    pub fn at(self, location: IrLocation) -> Self {
        Self {
            location: Some(location),
            ..self
        }
    }

    pub fn with_help(self, help: impl Into<String>) -> Self {
        Self {
            help: Some(help.into()),
            ..self
        }
    }

    pub fn code(&self) -> &'static str {
        self.category.code()
    }
}

/// `error[L0001]: message (term 3 in block 0)`, then the help on its own
/// indented line.
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error[{}]: {}", self.code(), self.message)?;
        if let Some(location) = self.location {
            write!(f, " ({location})")?;
        }
        match &self.help {
            Some(help) => write!(f, "\n  help: {help}"),
            None => Ok(()),
        }
    }
}

/// A failed check, carrying every diagnostic it produced.
///
/// Displays as the first diagnostic; the rest are available through
/// [`DiagnosticError::diagnostics`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", .0.first().map(ToString::to_string).unwrap_or_else(|| "no diagnostics".to_string()))]
pub struct DiagnosticError(pub Vec<Diagnostic>);

impl DiagnosticError {
    pub fn multiple(diags: Vec<Diagnostic>) -> Self {
        Self(diags)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.0
    }
}
