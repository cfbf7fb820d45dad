//! The NeoVM operation set.
//!
//! # Stack Discipline
//!
//! Stack effect notation: `[..., operand1, operand2] -> [..., result]`
//!
//! # Jump Targets
//!
//! Jumps hold a reference to the operation they land on. A target is usually
//! a `Noop` placeholder created before the jump and appended to the stream
//! later; several jumps may share one placeholder. Target identity is pointer
//! identity, see [`Operation::targets`].

use bumpalo::Bump;
use core::fmt;
use num_bigint::BigInt;

use crate::Vec;
use crate::syntax::Symbol;

/// An ordered operation sequence. Elements are arena references so that
/// placeholder identity survives concatenation.
pub type Ops<'a> = Vec<&'a Operation<'a>>;

/// Arbitrary-precision integer payload of `PushInt`.
///
/// Stored as minimal two's-complement little-endian bytes, the encoding
/// NeoVM's `PUSHINT*` family uses.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Integer<'a>(&'a [u8]);

impl<'a> Integer<'a> {
    pub fn new(arena: &'a Bump, value: &BigInt) -> Self {
        Integer(arena.alloc_slice_copy(&value.to_signed_bytes_le()))
    }

    pub fn value(&self) -> BigInt {
        BigInt::from_signed_bytes_le(self.0)
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.0
    }
}

impl fmt::Debug for Integer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl fmt::Display for Integer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// NeoVM stack item types, as used by `CONVERT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StackItemType {
    Any = 0x00,
    Pointer = 0x10,
    Boolean = 0x20,
    Integer = 0x21,
    ByteString = 0x28,
    Buffer = 0x30,
    Array = 0x40,
    Struct = 0x41,
    Map = 0x48,
    InteropInterface = 0x60,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKind {
    Argument,
    Local,
    Static,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JumpKind {
    Always,
    If,
    IfNot,
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl JumpKind {
    pub fn mnemonic(self) -> &'static str {
        match self {
            JumpKind::Always => "jump",
            JumpKind::If => "jumpif",
            JumpKind::IfNot => "jumpifnot",
            JumpKind::Eq => "jumpeq",
            JumpKind::Ne => "jumpne",
            JumpKind::Gt => "jumpgt",
            JumpKind::Ge => "jumpge",
            JumpKind::Lt => "jumplt",
            JumpKind::Le => "jumple",
        }
    }
}

/// Permissions requested by a `CALLT` method token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallFlags(pub u8);

impl CallFlags {
    pub const NONE: CallFlags = CallFlags(0);
    pub const READ_STATES: CallFlags = CallFlags(0b0001);
    pub const WRITE_STATES: CallFlags = CallFlags(0b0010);
    pub const ALLOW_CALL: CallFlags = CallFlags(0b0100);
    pub const ALLOW_NOTIFY: CallFlags = CallFlags(0b1000);
    pub const STATES: CallFlags = CallFlags(0b0011);
    pub const READ_ONLY: CallFlags = CallFlags(0b0101);
    pub const ALL: CallFlags = CallFlags(0b1111);
}

/// A static call into another deployed contract (`CALLT`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodToken<'a> {
    /// Script hash of the callee, little-endian.
    pub hash: [u8; 20],
    pub method: &'a str,
    pub params: u16,
    pub has_return: bool,
    pub call_flags: CallFlags,
}

/// A single NeoVM operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operation<'a> {
    // ========================================================================
    // Constants
    // ========================================================================
    /// Stack: [...] -> [..., int]
    PushInt(Integer<'a>),
    /// Stack: [...] -> [..., bool]
    PushBool(bool),
    /// Stack: [...] -> [..., bytes]
    PushData(&'a [u8]),
    /// Stack: [...] -> [..., null]
    PushNull,

    // ========================================================================
    // Flow control
    // ========================================================================
    /// No effect. Used as a jump landing site.
    Noop,
    /// Unconditional or conditional jump to `target`.
    /// Conditional kinds pop their operands.
    Jump {
        kind: JumpKind,
        target: &'a Operation<'a>,
    },
    /// Call another method of the same contract.
    Call(Symbol<'a>),
    /// Call through a method token.
    CallToken(&'a MethodToken<'a>),
    /// Invoke an interop service by name.
    Syscall(&'a str),
    Return,
    /// Stack: [..., error] -> abort
    Throw,

    // ========================================================================
    // Stack manipulation
    // ========================================================================
    /// Stack: [..., a] -> [..., a, a]
    Duplicate,
    /// Stack: [..., a] -> [...]
    Drop,
    /// Stack: [..., a, b] -> [..., b, a]
    Swap,
    /// Stack: [..., a, b, c] -> [..., b, c, a]
    Rot,

    // ========================================================================
    // Slots
    // ========================================================================
    /// Allocate the local and argument slots of the current frame.
    InitSlot { locals: u8, params: u8 },
    /// Allocate the contract's static slots.
    InitStatic(u8),
    Load { slot: SlotKind, index: u8 },
    Store { slot: SlotKind, index: u8 },

    // ========================================================================
    // Types and compound values
    // ========================================================================
    /// Stack: [..., a] -> [..., a is null]
    IsNull,
    /// Stack: [..., a] -> [..., a as T]
    Convert(StackItemType),
    /// Stack: [..., a] -> [..., len(a)]
    Size,
    /// Stack: [..., collection, key] -> [..., collection[key]]
    PickItem,
    /// Stack: [..., collection, key, value] -> [...]
    SetItem,
    /// Stack: [..., collection, key] -> [..., key in collection]
    HasKey,
    /// Stack: [..., item_n-1, ..., item_0, n] -> [..., array]
    PackArray,
    /// Stack: [..., value_n-1, key_n-1, ..., value_0, key_0, n] -> [..., map]
    PackMap,

    // ========================================================================
    // Arithmetic, bitwise and comparison
    // ========================================================================
    Concat,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
    ShiftLeft,
    ShiftRight,
    And,
    Or,
    Xor,
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Not,
    Negate,
    Invert,
    Increment,
    Decrement,
}

/// Payload-free discriminator of [`Operation`].
///
/// This is the key the serializer sizes and encodes by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    PushInt,
    PushBool,
    PushData,
    PushNull,
    Noop,
    Jump,
    JumpIf,
    JumpIfNot,
    JumpEq,
    JumpNe,
    JumpGt,
    JumpGe,
    JumpLt,
    JumpLe,
    Call,
    CallToken,
    Syscall,
    Return,
    Throw,
    Duplicate,
    Drop,
    Swap,
    Rot,
    InitSlot,
    InitStatic,
    LoadArg,
    LoadLocal,
    LoadStatic,
    StoreArg,
    StoreLocal,
    StoreStatic,
    IsNull,
    Convert,
    Size,
    PickItem,
    SetItem,
    HasKey,
    PackArray,
    PackMap,
    Concat,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
    ShiftLeft,
    ShiftRight,
    And,
    Or,
    Xor,
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Not,
    Negate,
    Invert,
    Increment,
    Decrement,
}

impl<'a> Operation<'a> {
    pub fn kind(&self) -> OperationKind {
        use OperationKind as K;
        match self {
            Operation::PushInt(_) => K::PushInt,
            Operation::PushBool(_) => K::PushBool,
            Operation::PushData(_) => K::PushData,
            Operation::PushNull => K::PushNull,
            Operation::Noop => K::Noop,
            Operation::Jump { kind, .. } => match kind {
                JumpKind::Always => K::Jump,
                JumpKind::If => K::JumpIf,
                JumpKind::IfNot => K::JumpIfNot,
                JumpKind::Eq => K::JumpEq,
                JumpKind::Ne => K::JumpNe,
                JumpKind::Gt => K::JumpGt,
                JumpKind::Ge => K::JumpGe,
                JumpKind::Lt => K::JumpLt,
                JumpKind::Le => K::JumpLe,
            },
            Operation::Call(_) => K::Call,
            Operation::CallToken(_) => K::CallToken,
            Operation::Syscall(_) => K::Syscall,
            Operation::Return => K::Return,
            Operation::Throw => K::Throw,
            Operation::Duplicate => K::Duplicate,
            Operation::Drop => K::Drop,
            Operation::Swap => K::Swap,
            Operation::Rot => K::Rot,
            Operation::InitSlot { .. } => K::InitSlot,
            Operation::InitStatic(_) => K::InitStatic,
            Operation::Load { slot, .. } => match slot {
                SlotKind::Argument => K::LoadArg,
                SlotKind::Local => K::LoadLocal,
                SlotKind::Static => K::LoadStatic,
            },
            Operation::Store { slot, .. } => match slot {
                SlotKind::Argument => K::StoreArg,
                SlotKind::Local => K::StoreLocal,
                SlotKind::Static => K::StoreStatic,
            },
            Operation::IsNull => K::IsNull,
            Operation::Convert(_) => K::Convert,
            Operation::Size => K::Size,
            Operation::PickItem => K::PickItem,
            Operation::SetItem => K::SetItem,
            Operation::HasKey => K::HasKey,
            Operation::PackArray => K::PackArray,
            Operation::PackMap => K::PackMap,
            Operation::Concat => K::Concat,
            Operation::Add => K::Add,
            Operation::Subtract => K::Subtract,
            Operation::Multiply => K::Multiply,
            Operation::Divide => K::Divide,
            Operation::Modulo => K::Modulo,
            Operation::Power => K::Power,
            Operation::ShiftLeft => K::ShiftLeft,
            Operation::ShiftRight => K::ShiftRight,
            Operation::And => K::And,
            Operation::Or => K::Or,
            Operation::Xor => K::Xor,
            Operation::Equal => K::Equal,
            Operation::NotEqual => K::NotEqual,
            Operation::LessThan => K::LessThan,
            Operation::LessThanOrEqual => K::LessThanOrEqual,
            Operation::GreaterThan => K::GreaterThan,
            Operation::GreaterThanOrEqual => K::GreaterThanOrEqual,
            Operation::Not => K::Not,
            Operation::Negate => K::Negate,
            Operation::Invert => K::Invert,
            Operation::Increment => K::Increment,
            Operation::Decrement => K::Decrement,
        }
    }

    /// The statically known integer this operation pushes, if any.
    pub fn as_push_int(&self) -> Option<BigInt> {
        match self {
            Operation::PushInt(value) => Some(value.value()),
            _ => None,
        }
    }

    /// The statically known bytes this operation pushes, if any.
    pub fn as_push_data(&self) -> Option<&'a [u8]> {
        match self {
            Operation::PushData(bytes) => Some(*bytes),
            _ => None,
        }
    }

    pub fn jump_target(&self) -> Option<&'a Operation<'a>> {
        match self {
            Operation::Jump { target, .. } => Some(*target),
            _ => None,
        }
    }

    /// True when this is a jump landing on exactly `placeholder`.
    pub fn targets(&self, placeholder: &Operation<'a>) -> bool {
        self.jump_target()
            .is_some_and(|target| core::ptr::eq(target, placeholder))
    }
}

impl fmt::Display for Operation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::PushInt(value) => write!(f, "pushint {}", value),
            Operation::PushBool(value) => write!(f, "pushbool {}", value),
            Operation::PushData(bytes) => match core::str::from_utf8(bytes) {
                Ok(text) => write!(f, "pushdata {:?}", text),
                Err(_) => {
                    write!(f, "pushdata 0x")?;
                    for byte in bytes.iter() {
                        write!(f, "{:02x}", byte)?;
                    }
                    Ok(())
                }
            },
            Operation::PushNull => write!(f, "pushnull"),
            Operation::Noop => write!(f, "noop"),
            Operation::Jump { kind, target } => {
                write!(f, "{} -> {:p}", kind.mnemonic(), *target)
            }
            Operation::Call(symbol) => write!(f, "call {}", symbol),
            Operation::CallToken(token) => {
                write!(f, "calltoken {} ({} params)", token.method, token.params)
            }
            Operation::Syscall(name) => write!(f, "syscall {}", name),
            Operation::Return => write!(f, "return"),
            Operation::Throw => write!(f, "throw"),
            Operation::Duplicate => write!(f, "duplicate"),
            Operation::Drop => write!(f, "drop"),
            Operation::Swap => write!(f, "swap"),
            Operation::Rot => write!(f, "rot"),
            Operation::InitSlot { locals, params } => {
                write!(f, "initslot {} locals, {} params", locals, params)
            }
            Operation::InitStatic(count) => write!(f, "initstatic {}", count),
            Operation::Load { slot, index } => match slot {
                SlotKind::Argument => write!(f, "loadarg {}", index),
                SlotKind::Local => write!(f, "loadlocal {}", index),
                SlotKind::Static => write!(f, "loadstatic {}", index),
            },
            Operation::Store { slot, index } => match slot {
                SlotKind::Argument => write!(f, "storearg {}", index),
                SlotKind::Local => write!(f, "storelocal {}", index),
                SlotKind::Static => write!(f, "storestatic {}", index),
            },
            Operation::IsNull => write!(f, "isnull"),
            Operation::Convert(ty) => write!(f, "convert {:?}", ty),
            Operation::Size => write!(f, "size"),
            Operation::PickItem => write!(f, "pickitem"),
            Operation::SetItem => write!(f, "setitem"),
            Operation::HasKey => write!(f, "haskey"),
            Operation::PackArray => write!(f, "packarray"),
            Operation::PackMap => write!(f, "packmap"),
            Operation::Concat => write!(f, "concat"),
            Operation::Add => write!(f, "add"),
            Operation::Subtract => write!(f, "subtract"),
            Operation::Multiply => write!(f, "multiply"),
            Operation::Divide => write!(f, "divide"),
            Operation::Modulo => write!(f, "modulo"),
            Operation::Power => write!(f, "power"),
            Operation::ShiftLeft => write!(f, "shiftleft"),
            Operation::ShiftRight => write!(f, "shiftright"),
            Operation::And => write!(f, "and"),
            Operation::Or => write!(f, "or"),
            Operation::Xor => write!(f, "xor"),
            Operation::Equal => write!(f, "equal"),
            Operation::NotEqual => write!(f, "notequal"),
            Operation::LessThan => write!(f, "lessthan"),
            Operation::LessThanOrEqual => write!(f, "lessthanorequal"),
            Operation::GreaterThan => write!(f, "greaterthan"),
            Operation::GreaterThanOrEqual => write!(f, "greaterthanorequal"),
            Operation::Not => write!(f, "not"),
            Operation::Negate => write!(f, "negate"),
            Operation::Invert => write!(f, "invert"),
            Operation::Increment => write!(f, "increment"),
            Operation::Decrement => write!(f, "decrement"),
        }
    }
}
