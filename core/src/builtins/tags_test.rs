use bumpalo::Bump;
use num_bigint::BigInt;
use pretty_assertions::assert_eq;

use crate::api::CompileOptions;
use crate::builtins::{OperationTemplate, function_object};
use crate::compiler::{CompileError, Compiler, ErrorKind};
use crate::ops::{JumpKind, Operation, OperationKind as K, StackItemType};
use crate::syntax::{AstBuilder, FunctionDecl};
use crate::{String, ToString, Vec, vec};

fn declare<'a>(b: &AstBuilder<'a>, operations: &[&str]) -> &'a FunctionDecl<'a> {
    let mut function = b.function(b.symbol("inline")).ambient();
    for text in operations {
        function = function.tag("operation", text);
    }
    function.build()
}

fn parse<'a>(
    c: &'a Compiler<'a>,
    b: &AstBuilder<'a>,
    operations: &[&str],
) -> Result<OperationTemplate<'a>, CompileError> {
    OperationTemplate::parse(c, declare(b, operations))
}

fn reason(err: CompileError) -> String {
    match err.kind {
        ErrorKind::InvalidArgument { reason } => reason,
        other => panic!("expected an invalid argument, found {:?}", other),
    }
}

#[test]
fn test_operands() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let c = Compiler::new(&arena, CompileOptions::default());

    let template = parse(
        c,
        &b,
        &[
            "pushint -12",
            "pushdata 0xbeef",
            "pushdata raw",
            "pushbool true",
            "syscall System.Runtime.Log",
            "convert ByteString",
            "CONVERT integer",
        ],
    )
    .unwrap();
    assert_eq!(template.len(), 7);

    let ops = template.instantiate(c);
    assert_eq!(ops[0].as_push_int(), Some(BigInt::from(-12)));
    assert_eq!(ops[1].as_push_data(), Some(&[0xbe, 0xef][..]));
    assert_eq!(ops[2].as_push_data(), Some(&b"raw"[..]));
    assert_eq!(
        ops[3..].iter().map(|op| **op).collect::<Vec<_>>(),
        vec![
            Operation::PushBool(true),
            Operation::Syscall("System.Runtime.Log"),
            Operation::Convert(StackItemType::ByteString),
            Operation::Convert(StackItemType::Integer),
        ]
    );
}

#[test]
fn test_mnemonics_and_aliases() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let c = Compiler::new(&arena, CompileOptions::default());

    let ops = parse(c, &b, &["dup", "Duplicate", "cat", "SUB", "pack", "shl", "inc", "isnull"])
        .unwrap()
        .instantiate(c);
    assert_eq!(
        ops.iter().map(|op| op.kind()).collect::<Vec<_>>(),
        vec![
            K::Duplicate,
            K::Duplicate,
            K::Concat,
            K::Subtract,
            K::PackArray,
            K::ShiftLeft,
            K::Increment,
            K::IsNull
        ]
    );
}

#[test]
fn test_malformed_operations() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let c = Compiler::new(&arena, CompileOptions::default());

    let cases = [
        ("", "missing mnemonic"),
        ("return", "unknown mnemonic"),
        ("add 1", "unexpected operand"),
        ("pushint", "missing operand"),
        ("pushint 1 2", "too many operands"),
        ("pushint one", "invalid integer"),
        ("pushdata 0xabc", "invalid hex data"),
        ("pushbool yes", "invalid boolean"),
        ("convert Text", "unknown stack item type"),
        ("jump ahead", "invalid jump offset"),
    ];
    for (text, expected) in cases {
        let err = parse(c, &b, &[text]).unwrap_err();
        assert_eq!(
            reason(err),
            crate::format!("@operation {}: {}", text, expected)
        );
    }
}

#[test]
fn test_jump_validation() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let c = Compiler::new(&arena, CompileOptions::default());

    let function = declare(&b, &["jump 3", "noop"]);
    let err = OperationTemplate::parse(c, function).unwrap_err();
    assert_eq!(err.node, Some(function.id));
    assert_eq!(reason(err), "jump offset out of range");

    let err = parse(c, &b, &["noop", "jump -2"]).unwrap_err();
    assert_eq!(reason(err), "@operation jump -2: jump offset out of range");

    let err = parse(c, &b, &["jumpif 1", "jump 1", "noop"]).unwrap_err();
    assert_eq!(reason(err), "jump target must not be another jump");
}

#[test]
fn test_backward_jump() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let c = Compiler::new(&arena, CompileOptions::default());

    let ops = parse(c, &b, &["dec", "dup", "jumpgt -2"])
        .unwrap()
        .instantiate(c);
    assert_eq!(ops.len(), 3);
    assert_eq!(
        *ops[2],
        Operation::Jump {
            kind: JumpKind::Gt,
            target: ops[0]
        }
    );
    assert!(ops[2].targets(ops[0]));
}

#[test]
fn test_trailing_jump_lands_on_fresh_end() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let c = Compiler::new(&arena, CompileOptions::default());

    let template = parse(c, &b, &["jumpif 2", "drop"]).unwrap();
    let first = template.instantiate(c);
    let second = template.instantiate(c);
    assert_eq!(
        first.iter().map(|op| op.kind()).collect::<Vec<_>>(),
        vec![K::JumpIf, K::Drop, K::Noop]
    );
    assert!(first[0].targets(first[2]));
    assert!(second[0].targets(second[2]));
    assert!(!first[0].targets(second[2]));
}

#[test]
fn test_function_object() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let t = b.types();
    let c = Compiler::new(&arena, CompileOptions::default());

    let plain = b.function(b.symbol("plain")).ambient().build();
    assert!(function_object(c, plain).unwrap().is_none());

    let log = b
        .function(b.symbol("log"))
        .param(b.symbol("message"), t.string())
        .ambient()
        .tag("syscall", " System.Runtime.Log ")
        .build();
    let object = function_object(c, log).unwrap().unwrap();
    assert_eq!(object.symbol, Some(log.symbol));
    assert!(object.load_ops.is_empty());
    assert!(object.call.is_some());
    assert!(object.is_read_only());

    let broken = declare(&b, &["bogus"]);
    let err = function_object(c, broken).unwrap_err();
    assert_eq!(
        err.kind,
        ErrorKind::InvalidArgument {
            reason: "@operation bogus: unknown mnemonic".to_string()
        }
    );
}
