//! Typed syntax tree interface.
//!
//! Parsing and type checking happen elsewhere; this module defines the shape
//! of the checked tree the compiler lowers, plus [`AstBuilder`] for building
//! one directly.

pub mod builder;
mod manager;
mod span;
mod symbol;
mod tree;
mod types;


pub use builder::AstBuilder;
pub use manager::TypeManager;
pub use span::{Located, NodeId, NodeRef, Span};
pub use symbol::Symbol;
pub use tree::*;
pub use types::Type;
