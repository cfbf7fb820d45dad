//! neots - NeoVM code generation for a TypeScript subset
//!
//! # Overview
//!
//! neots lowers type-checked TypeScript trees into NeoVM operation sequences,
//! one per contract method. Parsing and type checking happen upstream: the
//! compiler consumes a typed tree (see [`syntax`]) and produces:
//!
//! - Contract methods with their operations, parameters and sequence points
//! - Contract events declared with `@event`
//! - Diagnostics for every declaration that could not be lowered
//!
//! # Quick Start
//!
//! ```ignore
//! use neots::{CompileOptions, Engine, StandardLibrary};
//! use neots::syntax::AstBuilder;
//! use bumpalo::Bump;
//!
//! let arena = Bump::new();
//! let b = AstBuilder::new(&arena);
//! let library = StandardLibrary::declare(&b);
//! let engine = Engine::new(&arena, CompileOptions::default(), library.unit)?;
//!
//! // `unit` is the typed tree of `contract.ts`.
//! match neots::compile(&engine, unit, "contract.ts", source) {
//!     Ok(compiled) => println!("{}", compiled.methods[0].listing()),
//!     Err(error) => neots::render_error(&error),
//! }
//! ```

mod error;
mod error_renderer;

pub use error::Error;
pub use error_renderer::{
    render_diagnostics, render_error, render_error_to, render_error_to_string,
    render_error_to_string_no_color,
};

// Re-export public API from neots_core
pub use neots_core::api::{
    CompileOptions, Diagnostic, Engine, RelatedInfo, STDLIB_HASH, Severity,
};
pub use neots_core::builtins::{self, StandardLibrary};
pub use neots_core::compiler::{
    CompiledUnit, ContractEvent, ContractMethod, MethodParameter, SequencePoint,
};
pub use neots_core::ops::{self, Operation, OperationKind};
pub use neots_core::syntax::{self, AstBuilder, SourceUnit, Span};

/// Compiles every function of `unit`.
///
/// `name` and `source` identify the text `unit` was checked from; failures
/// carry them so they can be rendered with [`render_error`] or reported
/// through `miette`.
pub fn compile<'a>(
    engine: &Engine<'a>,
    unit: &'a SourceUnit<'a>,
    name: &str,
    source: &str,
) -> Result<CompiledUnit<'a>, Error> {
    engine
        .compile(unit)
        .map_err(|err| Error::with_source(err, name, source))
}
