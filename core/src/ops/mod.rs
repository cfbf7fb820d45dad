//! NeoVM operations emitted by the compiler.
//!
//! Operations are arena-allocated and never mutated. Jump operations refer to
//! their target by reference; the serializer turns those references into
//! offsets once a whole method has been lowered.

mod operation;

#[cfg(test)]
mod operation_test;

pub use operation::{
    CallFlags, Integer, JumpKind, MethodToken, Operation, OperationKind, Ops, SlotKind,
    StackItemType,
};
