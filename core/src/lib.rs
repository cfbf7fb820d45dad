#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]

extern crate alloc;

// Re-export for convenience so other modules don't need alloc:: prefix
#[allow(unused_imports)]
pub(crate) use alloc::{boxed::Box, format, rc::Rc, string::String, string::ToString, vec, vec::Vec};

pub mod api;
pub mod builtins;
pub mod compiler;
pub mod ops;
pub mod syntax;
