//! Compilation errors.

use crate::api::{Diagnostic, Severity};
use crate::syntax::{Located, NodeId, Span};
use crate::{String, ToString, Vec, format};

/// The single error type of reduction, statement processing and scope
/// resolution: what went wrong plus the node it is attached to.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind}")]
pub struct CompileError {
    pub kind: ErrorKind,
    pub node: Option<NodeId>,
    pub span: Span,
}

/// Specific kinds of compilation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ErrorKind {
    #[error("cannot find name '{name}'")]
    UnresolvedSymbol { name: String },

    #[error("cannot resolve property '{name}'")]
    UnresolvedProperty { name: String },

    #[error("expression is not callable")]
    NotCallable,

    #[error("expression is not constructable")]
    NotConstructable,

    #[error("cannot store to {what}")]
    NotAssignable { what: String },

    #[error("duplicate definition of '{name}'")]
    DuplicateDefinition { name: String },

    #[error("unsupported {what}")]
    UnsupportedConstruct { what: String },

    #[error("invalid literal: {reason}")]
    InvalidLiteral { reason: String },

    #[error("operator '{op}' is not supported")]
    InvalidOperator { op: String },

    #[error("expected {expected} type, found {found}")]
    InvalidType { expected: String, found: String },

    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("cannot declare '{name}' in a scope that does not accept new bindings")]
    ImmutableScope { name: String },

    #[error("too many {what} (limit: 255)")]
    TooManySlots { what: &'static str },

    #[error("built in declaration '{name}' not found")]
    MissingBuiltin { name: String },

    #[error("expression nesting exceeds the limit of {limit}")]
    NestingTooDeep { limit: usize },
}

impl CompileError {
    /// An error not (yet) attached to a node.
    pub fn new(kind: ErrorKind) -> Self {
        CompileError {
            kind,
            node: None,
            span: Span::default(),
        }
    }

    pub fn at(node: &impl Located, kind: ErrorKind) -> Self {
        CompileError {
            kind,
            node: Some(node.node_id()),
            span: node.span(),
        }
    }

    /// Attaches the error to `node` unless it already points somewhere.
    pub fn or_at(mut self, node: &impl Located) -> Self {
        if self.node.is_none() {
            self.node = Some(node.node_id());
            self.span = node.span();
        }
        self
    }

    pub fn unsupported(node: &impl Located, what: &str) -> Self {
        CompileError::at(
            node,
            ErrorKind::UnsupportedConstruct {
                what: what.to_string(),
            },
        )
    }

    pub fn not_assignable(node: &impl Located, what: &str) -> Self {
        CompileError::at(
            node,
            ErrorKind::NotAssignable {
                what: what.to_string(),
            },
        )
    }

    pub fn invalid_argument(node: &impl Located, reason: &str) -> Self {
        CompileError::at(
            node,
            ErrorKind::InvalidArgument {
                reason: reason.to_string(),
            },
        )
    }

    /// Environment errors abort the whole compilation instead of a single
    /// declaration.
    pub fn is_fatal(&self) -> bool {
        matches!(self.kind, ErrorKind::MissingBuiltin { .. })
    }

    /// Convert to a Diagnostic for API boundary.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let (code, help) = match &self.kind {
            ErrorKind::UnresolvedSymbol { .. } => (
                "N001",
                Some("Make sure the name is declared before use"),
            ),
            ErrorKind::UnresolvedProperty { .. } => ("N002", None),
            ErrorKind::NotCallable => ("N003", None),
            ErrorKind::NotConstructable => ("N004", None),
            ErrorKind::NotAssignable { .. } => (
                "N005",
                Some("Only variables, parameters and writable properties can be assigned"),
            ),
            ErrorKind::DuplicateDefinition { .. } => ("N006", None),
            ErrorKind::UnsupportedConstruct { .. } => ("N007", None),
            ErrorKind::InvalidLiteral { .. } => ("N008", Some("Numeric literals must be integers")),
            ErrorKind::InvalidOperator { .. } => ("N009", None),
            ErrorKind::InvalidType { .. } => ("N010", None),
            ErrorKind::InvalidArgument { .. } => ("N011", None),
            ErrorKind::ImmutableScope { .. } => ("N012", Some("Declare variables inside a block")),
            ErrorKind::TooManySlots { .. } => ("N013", None),
            ErrorKind::MissingBuiltin { .. } => (
                "N014",
                Some("The declarations file does not match this compiler"),
            ),
            ErrorKind::NestingTooDeep { .. } => (
                "N015",
                Some("Split the expression into smaller statements"),
            ),
        };
        Diagnostic {
            severity: Severity::Error,
            message: format!("{}", self.kind),
            span: self.span,
            related: Vec::new(),
            help: help.map(String::from),
            code: Some(String::from(code)),
        }
    }
}
