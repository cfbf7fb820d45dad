//! Top-level error type: core diagnostics bound to the source text they
//! point into, reportable through `miette`.

use core::fmt::Display;
use core::ops::Range;

use miette::{LabeledSpan, SourceCode};
use neots_core::api::{self, Diagnostic, Severity};

/// Errors returned by [`crate::compile`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The declarations the engine was built from are unusable.
    #[error("setup error: {}", .0.message)]
    Setup(Diagnostic),

    /// One or more declarations of a source file failed to lower.
    #[error("{name}: compilation failed with {} error(s)", .diagnostics.len())]
    Compilation {
        name: String,
        /// Contents of the file the diagnostic spans point into.
        text: String,
        diagnostics: Vec<Diagnostic>,
    },
}

impl Error {
    /// Attaches the source file `name` with contents `source` to a core error.
    pub fn with_source(err: api::Error, name: &str, source: &str) -> Self {
        match err {
            api::Error::Setup(diagnostic) => Error::Setup(diagnostic),
            api::Error::Compilation { diagnostics } => Error::Compilation {
                name: name.to_string(),
                text: source.to_string(),
                diagnostics,
            },
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Error::Setup(diagnostic) => core::slice::from_ref(diagnostic),
            Error::Compilation { diagnostics, .. } => diagnostics,
        }
    }

    fn primary(&self) -> Option<&Diagnostic> {
        self.diagnostics().first()
    }
}

impl miette::Diagnostic for Error {
    fn code<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        let code = self.primary()?.code.as_ref()?;
        Some(Box::new(code))
    }

    fn severity(&self) -> Option<miette::Severity> {
        self.primary().map(|diagnostic| match diagnostic.severity {
            Severity::Error => miette::Severity::Error,
            Severity::Warning => miette::Severity::Warning,
            Severity::Info => miette::Severity::Advice,
        })
    }

    fn help<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        let help = self.primary()?.help.as_ref()?;
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        match self {
            Error::Setup(_) => None,
            Error::Compilation { text, .. } => Some(text as &dyn SourceCode),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let Error::Compilation { diagnostics, .. } = self else {
            return None;
        };
        Some(Box::new(diagnostics.iter().flat_map(|diagnostic| {
            let primary = LabeledSpan::new_with_span(
                Some(diagnostic.message.clone()),
                Range::from(diagnostic.span),
            );
            let related = diagnostic.related.iter().map(|related| {
                LabeledSpan::new_with_span(Some(related.message.clone()), Range::from(related.span))
            });
            core::iter::once(primary).chain(related)
        })))
    }
}
