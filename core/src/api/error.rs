//! Public error types for the neots API.
//!
//! Internal errors ([`CompileError`](crate::compiler::CompileError)) are
//! converted to these types at API boundaries.

use core::fmt;

use crate::compiler::CompileError;
use crate::syntax::Span;
use crate::{String, Vec};

/// Public error type for all neots operations.
#[derive(Debug)]
pub enum Error {
    /// The environment is unusable: a required builtin declaration is missing
    /// or was defined twice. Nothing can be compiled against it.
    Setup(Diagnostic),

    /// One or more declarations failed to lower.
    ///
    /// Contains one diagnostic per independent failure.
    Compilation { diagnostics: Vec<Diagnostic> },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Setup(diagnostic) => write!(f, "Setup error: {}", diagnostic.message),
            Error::Compilation { diagnostics } => {
                let error_count = diagnostics
                    .iter()
                    .filter(|d| d.severity == Severity::Error)
                    .count();
                write!(f, "Compilation failed with {} error(s)", error_count)
            }
        }
    }
}

impl core::error::Error for Error {}

/// A diagnostic message (error, warning, or info) with source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Severity level (error, warning, info).
    pub severity: Severity,

    /// Primary diagnostic message.
    pub message: String,

    /// Source location of the primary issue.
    pub span: Span,

    /// Related locations that provide additional context.
    pub related: Vec<RelatedInfo>,

    /// Optional help text suggesting how to fix the issue.
    pub help: Option<String>,

    /// Optional error code (e.g., "N001") for documentation lookup.
    pub code: Option<String>,
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Error - compilation cannot succeed.
    Error,
    /// Warning - suspicious code that might be wrong.
    Warning,
    /// Info - informational message.
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// Related information for a diagnostic (e.g., "declared here").
#[derive(Debug, Clone, PartialEq)]
pub struct RelatedInfo {
    /// Source location of the related information.
    pub span: Span,

    /// Message explaining the relevance.
    pub message: String,
}

// ============================================================================
// Conversion from internal errors
// ============================================================================

impl From<CompileError> for Error {
    fn from(err: CompileError) -> Self {
        Error::Setup(err.to_diagnostic())
    }
}

impl From<Vec<CompileError>> for Error {
    fn from(errors: Vec<CompileError>) -> Self {
        Error::Compilation {
            diagnostics: errors.iter().map(CompileError::to_diagnostic).collect(),
        }
    }
}
