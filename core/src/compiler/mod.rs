//! Lowering of typed trees into NeoVM operation sequences.
//!
//! ## Design
//!
//! - Every operation is allocated in the session arena and referenced by
//!   pointer, so jump placeholders keep their identity while sequences are
//!   cloned and concatenated.
//! - Names resolve through an immutable [`Scope`] chain of
//!   [`CompileTimeObject`]s. Defining a name yields a new scope value.
//! - Expressions reduce to lazily evaluated operation producers
//!   ([`ExpressionContext`]); statements and methods splice their output.

mod error;
pub mod expression;
pub mod method;
pub mod object;
pub mod scope;
pub mod statement;
pub mod unit;

#[cfg(test)]
mod method_test;

pub use error::{CompileError, ErrorKind};
pub use expression::{ExpressionContext, Reducer};
pub use method::{
    ContractMethod, MethodBuilder, MethodParameter, SequencePoint, parse_contract_method,
};
pub use object::{
    CompileTimeObject, CompileTimeType, GetOps, GetStoreOps, InvokeResolver, Invocation,
    PropertyMap, PropertyResolver, Receiver,
};
pub use scope::Scope;
pub use statement::{StatementProcessor, StatementScope};
pub use unit::{CompiledUnit, ContractEvent, compile_unit};

use bumpalo::Bump;
use core::cell::Cell;
use num_bigint::BigInt;

use crate::api::CompileOptions;
use crate::ops::{Integer, JumpKind, Operation, SlotKind};
use crate::syntax::Located;

/// Per-compilation state shared by every resolver closure.
///
/// Allocated in the arena so closures can capture a plain `&'a Compiler<'a>`.
pub struct Compiler<'a> {
    arena: &'a Bump,
    options: CompileOptions,
    depth: Cell<usize>,
}

impl<'a> Compiler<'a> {
    pub fn new(arena: &'a Bump, options: CompileOptions) -> &'a Self {
        arena.alloc(Compiler {
            arena,
            options,
            depth: Cell::new(0),
        })
    }

    pub fn arena(&self) -> &'a Bump {
        self.arena
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Allocates a fresh operation. Every call yields a distinct identity.
    pub fn op(&self, op: Operation<'a>) -> &'a Operation<'a> {
        self.arena.alloc(op)
    }

    /// A fresh jump landing placeholder.
    pub fn noop(&self) -> &'a Operation<'a> {
        self.op(Operation::Noop)
    }

    pub fn push_int(&self, value: impl Into<BigInt>) -> &'a Operation<'a> {
        let value = value.into();
        self.op(Operation::PushInt(Integer::new(self.arena, &value)))
    }

    pub fn push_data(&self, bytes: &[u8]) -> &'a Operation<'a> {
        self.op(Operation::PushData(self.arena.alloc_slice_copy(bytes)))
    }

    pub fn push_str(&self, text: &str) -> &'a Operation<'a> {
        self.push_data(text.as_bytes())
    }

    pub fn push_bool(&self, value: bool) -> &'a Operation<'a> {
        self.op(Operation::PushBool(value))
    }

    pub fn jump(&self, kind: JumpKind, target: &'a Operation<'a>) -> &'a Operation<'a> {
        self.op(Operation::Jump { kind, target })
    }

    pub fn syscall(&self, name: &str) -> &'a Operation<'a> {
        self.op(Operation::Syscall(self.arena.alloc_str(name)))
    }

    pub fn load(&self, slot: SlotKind, index: u8) -> &'a Operation<'a> {
        self.op(Operation::Load { slot, index })
    }

    pub fn store(&self, slot: SlotKind, index: u8) -> &'a Operation<'a> {
        self.op(Operation::Store { slot, index })
    }

    /// Records one more level of nesting below `node`.
    ///
    /// The level is released when the returned guard drops.
    pub fn enter(&self, node: &impl Located) -> Result<DepthGuard<'_>, CompileError> {
        let depth = self.depth.get() + 1;
        if depth > self.options.max_depth {
            return Err(CompileError::at(
                node,
                ErrorKind::NestingTooDeep {
                    limit: self.options.max_depth,
                },
            ));
        }
        self.depth.set(depth);
        Ok(DepthGuard { depth: &self.depth })
    }
}

pub struct DepthGuard<'c> {
    depth: &'c Cell<usize>,
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}
