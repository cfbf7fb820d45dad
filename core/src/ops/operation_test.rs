use bumpalo::Bump;
use num_bigint::BigInt;
use pretty_assertions::assert_eq;

use crate::ops::{
    CallFlags, Integer, JumpKind, MethodToken, Operation, OperationKind as K, SlotKind,
    StackItemType,
};
use crate::syntax::AstBuilder;
use crate::{ToString, vec};

#[test]
fn test_integer_encoding() {
    let arena = Bump::new();
    let cases: [(i64, &[u8]); 6] = [
        (0, &[0x00]),
        (1, &[0x01]),
        (-1, &[0xff]),
        (127, &[0x7f]),
        (128, &[0x80, 0x00]),
        (-129, &[0x7f, 0xff]),
    ];
    for (value, bytes) in cases {
        let integer = Integer::new(&arena, &BigInt::from(value));
        assert_eq!(integer.bytes(), bytes, "encoding of {}", value);
        assert_eq!(integer.value(), BigInt::from(value));
    }

    let big: BigInt = "123456789012345678901234567890".parse().unwrap();
    assert_eq!(Integer::new(&arena, &big).value(), big);
}

#[test]
fn test_kind_follows_payload() {
    let arena = Bump::new();
    let target: &Operation<'_> = arena.alloc(Operation::Noop);

    let cases = [
        (Operation::Jump { kind: JumpKind::Always, target }, K::Jump),
        (Operation::Jump { kind: JumpKind::IfNot, target }, K::JumpIfNot),
        (Operation::Jump { kind: JumpKind::Le, target }, K::JumpLe),
        (Operation::Load { slot: SlotKind::Argument, index: 0 }, K::LoadArg),
        (Operation::Load { slot: SlotKind::Static, index: 0 }, K::LoadStatic),
        (Operation::Store { slot: SlotKind::Local, index: 3 }, K::StoreLocal),
        (Operation::Convert(StackItemType::Integer), K::Convert),
        (Operation::InitSlot { locals: 1, params: 0 }, K::InitSlot),
    ];
    for (op, kind) in cases {
        assert_eq!(op.kind(), kind, "{}", op);
    }
}

#[test]
fn test_jump_targets_compare_by_identity() {
    let arena = Bump::new();
    let first: &Operation<'_> = arena.alloc(Operation::Noop);
    let second: &Operation<'_> = arena.alloc(Operation::Noop);
    let jump = Operation::Jump {
        kind: JumpKind::If,
        target: first,
    };

    assert!(jump.targets(first));
    assert!(!jump.targets(second));
    assert_eq!(*first, *second);
    assert!(jump.jump_target().is_some());
    assert!(Operation::Noop.jump_target().is_none());
    assert!(!Operation::Noop.targets(first));
}

#[test]
fn test_push_accessors() {
    let arena = Bump::new();
    let int = Operation::PushInt(Integer::new(&arena, &BigInt::from(-300)));
    let data = Operation::PushData(b"neo");

    assert_eq!(int.as_push_int(), Some(BigInt::from(-300)));
    assert_eq!(int.as_push_data(), None);
    assert_eq!(data.as_push_data(), Some(&b"neo"[..]));
    assert_eq!(data.as_push_int(), None);
    assert_eq!(Operation::PushBool(true).as_push_int(), None);
}

#[test]
fn test_display() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let token = MethodToken {
        hash: [0; 20],
        method: "itoa",
        params: 1,
        has_return: true,
        call_flags: CallFlags::ALL,
    };

    let cases = vec![
        (Operation::PushInt(Integer::new(&arena, &BigInt::from(42))), "pushint 42"),
        (Operation::PushData(b"hi"), "pushdata \"hi\""),
        (Operation::PushData(&[0xde, 0xad]), "pushdata 0xdead"),
        (Operation::PushNull, "pushnull"),
        (Operation::Call(b.symbol("transfer")), "call transfer"),
        (Operation::CallToken(&token), "calltoken itoa (1 params)"),
        (Operation::Syscall("System.Runtime.Log"), "syscall System.Runtime.Log"),
        (Operation::InitSlot { locals: 2, params: 1 }, "initslot 2 locals, 1 params"),
        (Operation::Store { slot: SlotKind::Argument, index: 4 }, "storearg 4"),
        (Operation::Convert(StackItemType::ByteString), "convert ByteString"),
        (Operation::GreaterThanOrEqual, "greaterthanorequal"),
    ];
    for (op, text) in cases {
        assert_eq!(op.to_string(), text);
    }
    assert_eq!(JumpKind::IfNot.mnemonic(), "jumpifnot");
}

#[test]
fn test_call_flags() {
    assert_eq!(
        CallFlags::READ_STATES.0 | CallFlags::WRITE_STATES.0,
        CallFlags::STATES.0
    );
    assert_eq!(
        CallFlags::STATES.0 | CallFlags::ALLOW_CALL.0 | CallFlags::ALLOW_NOTIFY.0,
        CallFlags::ALL.0
    );
    assert_eq!(StackItemType::ByteString as u8, 0x28);
}
