use bumpalo::Bump;
use pretty_assertions::assert_eq;

use crate::api::CompileOptions;
use crate::compiler::{
    Compiler, ContractMethod, ErrorKind, MethodParameter, Scope, SequencePoint,
    parse_contract_method,
};
use crate::ops::{Operation, OperationKind as K, SlotKind};
use crate::syntax::{AstBuilder, Stmt};
use crate::{ToString, Vec, vec};

fn kinds(method: &ContractMethod<'_>) -> Vec<K> {
    method.operations.iter().map(|op| op.kind()).collect()
}

#[test]
fn test_empty_function_needs_no_slots() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let c = Compiler::new(&arena, CompileOptions::default());

    let function = b.function(b.symbol("noop")).body(b.block(&[])).build();
    let method = parse_contract_method(c, &Scope::root(), function).unwrap();
    assert_eq!(kinds(&method), vec![K::Noop, K::Return]);
    assert!(method.sequence_points.is_empty());
}

#[test]
fn test_returns_share_one_epilogue() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let t = b.types();
    let c = Compiler::new(&arena, CompileOptions::default());

    let flag = b.symbol("flag");
    let function = b
        .function(b.symbol("pick"))
        .param(flag, t.boolean())
        .returns(t.number())
        .body(b.block(&[
            b.if_stmt(b.ident(flag, t.boolean()), b.ret(Some(b.number(1.0))), None),
            b.ret(Some(b.number(2.0))),
        ]))
        .build();
    let method = parse_contract_method(c, &Scope::root(), function).unwrap();

    assert_eq!(
        kinds(&method),
        vec![
            K::InitSlot,
            K::LoadArg,
            K::JumpIfNot,
            K::PushInt,
            K::Jump,
            K::Noop,
            K::PushInt,
            K::Jump,
            K::Noop,
            K::Return
        ]
    );
    let ops = &method.operations;
    assert_eq!(
        *ops[0],
        Operation::InitSlot {
            locals: 0,
            params: 1
        }
    );
    assert!(ops[4].targets(ops[8]));
    assert!(ops[7].targets(ops[8]));
    assert_eq!(
        ops.iter().filter(|op| op.kind() == K::Return).count(),
        1
    );
}

#[test]
fn test_slot_counts() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let t = b.types();
    let c = Compiler::new(&arena, CompileOptions::default());

    let from = b.symbol("from");
    let amount = b.symbol("amount");
    let total = b.symbol("total");
    let function = b
        .function(b.symbol("transfer"))
        .param(from, t.string())
        .param(amount, t.number())
        .body(b.block(&[
            b.let_stmt(total, b.ident(amount, t.number())),
            b.expr_stmt(b.assign(b.ident(amount, t.number()), b.number(0.0))),
        ]))
        .build();
    let method = parse_contract_method(c, &Scope::root(), function).unwrap();

    assert_eq!(
        *method.operations[0],
        Operation::InitSlot {
            locals: 1,
            params: 2
        }
    );
    assert_eq!(
        *method.operations[1],
        Operation::Load {
            slot: SlotKind::Argument,
            index: 1
        }
    );
    assert_eq!(
        *method.operations[2],
        Operation::Store {
            slot: SlotKind::Local,
            index: 0
        }
    );
    assert_eq!(
        *method.operations[5],
        Operation::Store {
            slot: SlotKind::Argument,
            index: 1
        }
    );
}

#[test]
fn test_method_metadata() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let t = b.types();
    let c = Compiler::new(&arena, CompileOptions::default());

    let account = b.symbol("account");
    let function = b
        .function(b.symbol("balanceOf"))
        .param(account, t.string())
        .returns(t.bigint())
        .exported()
        .tag("safe", "")
        .body(b.block(&[b.ret(Some(b.number(0.0)))]))
        .build();
    let method = parse_contract_method(c, &Scope::root(), function).unwrap();

    assert_eq!(method.name, "balanceOf");
    assert_eq!(method.symbol, function.symbol);
    assert!(method.safe);
    assert!(method.public);
    assert!(core::ptr::eq(method.return_type, t.bigint()));
    assert_eq!(
        method.parameters,
        vec![MethodParameter {
            name: "account",
            ty: t.string()
        }]
    );

    let private = b
        .function(b.symbol("helper"))
        .body(b.block(&[]))
        .build();
    let method = parse_contract_method(c, &Scope::root(), private).unwrap();
    assert!(!method.safe);
    assert!(!method.public);
}

#[test]
fn test_body_must_be_a_block() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let c = Compiler::new(&arena, CompileOptions::default());

    let expression_body = b
        .function(b.symbol("arrow"))
        .body(b.expr_stmt(b.number(1.0)))
        .build();
    let errors = parse_contract_method(c, &Scope::root(), expression_body).unwrap_err();
    assert_eq!(
        errors.iter().map(|err| err.kind.clone()).collect::<Vec<_>>(),
        vec![ErrorKind::UnsupportedConstruct {
            what: "function body must be a block".to_string()
        }]
    );

    let missing = b.function(b.symbol("declared")).build();
    let errors = parse_contract_method(c, &Scope::root(), missing).unwrap_err();
    assert_eq!(errors[0].node, Some(missing.id));
}

#[test]
fn test_sequence_points_follow_the_prologue() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let t = b.types();
    let c = Compiler::new(&arena, CompileOptions::default());

    let x = b.symbol("x");
    let declaration = b.let_stmt(x, b.number(1.0));
    let ret = b.ret(Some(b.ident(x, t.number())));
    let function = b
        .function(b.symbol("f"))
        .body(b.block(&[declaration, ret]))
        .build();
    let method = parse_contract_method(c, &Scope::root(), function).unwrap();

    assert_eq!(
        method.sequence_points,
        vec![
            SequencePoint {
                index: 1,
                span: declaration.span
            },
            SequencePoint {
                index: 3,
                span: ret.span
            },
        ]
    );
}

#[test]
fn test_listing_resolves_jump_targets() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let c = Compiler::new(&arena, CompileOptions::default());

    let function = b
        .function(b.symbol("one"))
        .body(b.block(&[b.ret(Some(b.number(1.0)))]))
        .build();
    let method = parse_contract_method(c, &Scope::root(), function).unwrap();

    assert_eq!(
        method.listing(),
        "   0: pushint 1\n   1: jump 2\n   2: noop\n   3: return\n"
    );
    assert_eq!(method.index_of(method.operations[2]), Some(2));
    assert_eq!(method.index_of(c.noop()), None);
}

#[test]
fn test_too_many_locals() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let c = Compiler::new(&arena, CompileOptions::default());

    let declarations: Vec<&Stmt<'_>> = (0..256)
        .map(|i| b.let_stmt(b.symbol(&crate::format!("v{}", i)), b.number(0.0)))
        .collect();
    let function = b
        .function(b.symbol("crowded"))
        .body(b.block(&declarations))
        .build();
    let errors = parse_contract_method(c, &Scope::root(), function).unwrap_err();
    assert_eq!(
        errors.iter().map(|err| err.kind.clone()).collect::<Vec<_>>(),
        vec![ErrorKind::TooManySlots { what: "locals" }]
    );

    let fits = b
        .function(b.symbol("full"))
        .body(b.block(&declarations[..255]))
        .build();
    let method = parse_contract_method(c, &Scope::root(), fits).unwrap();
    assert_eq!(
        *method.operations[0],
        Operation::InitSlot {
            locals: 255,
            params: 0
        }
    );
}

#[test]
fn test_too_many_parameters() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let t = b.types();
    let c = Compiler::new(&arena, CompileOptions::default());

    let mut function = b.function(b.symbol("wide")).body(b.block(&[]));
    for i in 0..256 {
        function = function.param(b.symbol(&crate::format!("p{}", i)), t.number());
    }
    let function = function.build();
    let errors = parse_contract_method(c, &Scope::root(), function).unwrap_err();
    assert_eq!(
        errors,
        vec![crate::compiler::CompileError::at(
            function,
            ErrorKind::TooManySlots { what: "parameters" }
        )]
    );
}
