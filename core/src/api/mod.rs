//! Public API for the neots compiler core.
//!
//! # Example
//!
//! ```ignore
//! use neots_core::api::{CompileOptions, Engine};
//! use neots_core::builtins::StandardLibrary;
//! use neots_core::syntax::AstBuilder;
//! use bumpalo::Bump;
//!
//! let arena = Bump::new();
//! let b = AstBuilder::new(&arena);
//! let library = StandardLibrary::declare(&b);
//!
//! let engine = Engine::new(&arena, CompileOptions::default(), library.unit).unwrap();
//! let compiled = engine.compile(unit).unwrap();
//! for method in &compiled.methods {
//!     println!("{}: {} ops", method.name, method.operations.len());
//! }
//! ```

pub mod engine;
pub mod error;
pub mod options;

pub use engine::Engine;
pub use error::{Diagnostic, Error, RelatedInfo, Severity};
pub use options::{CompileOptions, STDLIB_HASH};
