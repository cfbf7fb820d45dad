use bumpalo::Bump;
use num_bigint::BigInt;
use pretty_assertions::assert_eq;

use crate::api::{CompileOptions, Engine, Error, STDLIB_HASH};
use crate::builtins::{StandardLibrary, build_global_scope};
use crate::compiler::{CompileTimeObject, Compiler, ErrorKind, Reducer, Scope};
use crate::ops::{CallFlags, MethodToken, Operation, OperationKind as K, SlotKind, StackItemType};
use crate::syntax::{AstBuilder, Declaration, Expr, Symbol, Type};
use crate::test_utils::init_test_logging;
use crate::{Rc, ToString, Vec, vec};

fn kinds(ops: &[&Operation<'_>]) -> Vec<K> {
    ops.iter().map(|op| op.kind()).collect()
}

/// A reference to the library global `name`.
fn global<'a>(b: &AstBuilder<'a>, library: &StandardLibrary<'a>, name: &str) -> &'a Expr<'a> {
    let var = library.variable(name).unwrap();
    b.ident(var.symbol, var.ty)
}

/// `object.member`, typed by the member declared on `iface`.
fn member<'a>(
    b: &AstBuilder<'a>,
    library: &StandardLibrary<'a>,
    object: &'a Expr<'a>,
    iface: &str,
    name: &str,
) -> &'a Expr<'a> {
    let decl = library.member(iface, name).unwrap();
    b.property(object, decl.symbol, decl.ty)
}

/// `object.name(args)`, typed by the method declared on `iface`.
fn invoke<'a>(
    b: &AstBuilder<'a>,
    library: &StandardLibrary<'a>,
    object: &'a Expr<'a>,
    iface: &str,
    name: &str,
    args: &[&'a Expr<'a>],
) -> &'a Expr<'a> {
    let callee = member(b, library, object, iface, name);
    let ret = callee.ty.return_type().unwrap_or(b.types().void());
    b.call(callee, args, ret)
}

/// `name(args)` for a library function.
fn call_function<'a>(
    b: &AstBuilder<'a>,
    library: &StandardLibrary<'a>,
    name: &str,
    args: &[&'a Expr<'a>],
) -> &'a Expr<'a> {
    let function = library.function(name).unwrap();
    let params: Vec<&Type<'_>> = function.params.iter().map(|param| param.ty).collect();
    let ty = b.types().function(&params, function.return_type);
    b.call(b.ident(function.symbol, ty), args, function.return_type)
}

/// The global scope plus a writable argument `symbol` in slot 0.
fn with_argument<'a>(
    b: &AstBuilder<'a>,
    c: &'a Compiler<'a>,
    global: &Rc<Scope<'a>>,
    symbol: Symbol<'a>,
    ty: &'a Type<'a>,
) -> Rc<Scope<'a>> {
    let decl = b.declarator(symbol, ty, None);
    Scope::child(global)
        .define(
            CompileTimeObject::declared(&decl, symbol, vec![c.load(SlotKind::Argument, 0)])
                .with_store(vec![c.store(SlotKind::Argument, 0)]),
        )
        .unwrap()
}

// ============================================================================
// Registry
// ============================================================================

#[test]
fn test_standard_names_resolve() {
    init_test_logging();
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let c = Compiler::new(&arena, CompileOptions::default());
    let library = StandardLibrary::declare(&b);
    let scope = build_global_scope(c, library.unit).unwrap();

    for name in [
        "ByteString",
        "Storage",
        "Runtime",
        "Error",
        "StdLib",
        "Ledger",
        "ContractManagement",
        "getCallFlags",
        "getRandom",
        "concat",
        "integerOrZero",
    ] {
        assert!(scope.resolve_name(name).is_some(), "{} should resolve", name);
    }
    for name in [
        "ByteString",
        "StorageContext",
        "ReadonlyStorageContext",
        "Transaction",
        "Block",
    ] {
        let ty = library.interface(name).unwrap().ty;
        assert!(scope.resolve_type(ty).is_some(), "{} should have a type", name);
    }
    assert!(scope.resolve_name("Transaction").is_none());
}

#[test]
fn test_missing_builtin_is_fatal() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let c = Compiler::new(&arena, CompileOptions::default());

    let err = build_global_scope(c, b.unit("empty.d.ts", &[])).unwrap_err();
    assert_eq!(
        err.kind,
        ErrorKind::MissingBuiltin {
            name: "ByteString".to_string()
        }
    );
    assert!(err.is_fatal());

    let result = Engine::new(&arena, CompileOptions::default(), b.unit("empty.d.ts", &[]));
    match result {
        Err(Error::Setup(diagnostic)) => {
            assert_eq!(diagnostic.code.as_deref(), Some("N014"));
        }
        _ => panic!("expected a setup error"),
    }
}

#[test]
fn test_library_declarations_must_be_unique() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let t = b.types();
    let c = Compiler::new(&arena, CompileOptions::default());
    let library = StandardLibrary::declare(&b);

    let mut declarations: Vec<Declaration<'_>> = library.unit.declarations.to_vec();
    declarations.push(Declaration::Function(
        b.function(library.function("getRandom").unwrap().symbol)
            .returns(t.bigint())
            .ambient()
            .tag("syscall", "System.Runtime.GetRandom")
            .build(),
    ));
    let err = build_global_scope(c, b.unit("twice.d.ts", &declarations)).unwrap_err();
    assert_eq!(
        err.kind,
        ErrorKind::DuplicateDefinition {
            name: "getRandom".to_string()
        }
    );
}

#[test]
fn test_native_contract_hash_is_validated() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let t = b.types();
    let c = Compiler::new(&arena, CompileOptions::default());
    let library = StandardLibrary::declare(&b);

    let broken = b
        .interface("BrokenConstructor")
        .tag("nativeContract", "0x1234")
        .method("ping", &[], t.void(), &[])
        .build();
    let mut declarations: Vec<Declaration<'_>> = library.unit.declarations.to_vec();
    declarations.push(Declaration::Interface(broken));
    declarations.push(Declaration::Variable(b.declare_const("Broken", broken.ty, &[])));

    let err = build_global_scope(c, b.unit("broken.d.ts", &declarations)).unwrap_err();
    assert_eq!(
        err.kind,
        ErrorKind::InvalidArgument {
            reason: "'0x1234' is not a 20 byte script hash".to_string()
        }
    );
    assert_eq!(err.node, Some(broken.id));
}

// ============================================================================
// Interop services
// ============================================================================

#[test]
fn test_storage_context_methods() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let c = Compiler::new(&arena, CompileOptions::default());
    let library = StandardLibrary::declare(&b);
    let global_scope = build_global_scope(c, library.unit).unwrap();

    let key = b.symbol("key");
    let bs = library.interface("ByteString").unwrap().ty;
    let scope = with_argument(&b, c, &global_scope, key, bs);
    let reducer = Reducer::new(c, &scope);

    let storage = global(&b, &library, "Storage");
    let context = member(&b, &library, storage, "StorageConstructor", "context");
    let get = invoke(&b, &library, context, "StorageContext", "get", &[b.ident(key, bs)]);
    let ops = reducer.parse(get).unwrap();
    assert_eq!(kinds(&ops), vec![K::LoadArg, K::Syscall, K::Syscall]);
    assert_eq!(*ops[1], Operation::Syscall("System.Storage.GetContext"));
    assert_eq!(*ops[2], Operation::Syscall("System.Storage.Get"));

    let put = invoke(
        &b,
        &library,
        context,
        "StorageContext",
        "put",
        &[b.ident(key, bs), b.string("value")],
    );
    let ops = reducer.parse(put).unwrap();
    assert_eq!(
        kinds(&ops),
        vec![K::PushData, K::LoadArg, K::Syscall, K::Syscall]
    );
    assert_eq!(*ops[3], Operation::Syscall("System.Storage.Put"));

    let readonly = member(&b, &library, context, "StorageContext", "asReadonly");
    let ops = reducer.parse(readonly).unwrap();
    assert_eq!(
        ops.iter().map(|op| **op).collect::<Vec<_>>(),
        vec![
            Operation::Syscall("System.Storage.GetContext"),
            Operation::Syscall("System.Storage.AsReadOnly")
        ]
    );
}

#[test]
fn test_runtime_members() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let c = Compiler::new(&arena, CompileOptions::default());
    let library = StandardLibrary::declare(&b);
    let scope = build_global_scope(c, library.unit).unwrap();
    let reducer = Reducer::new(c, &scope);
    let runtime = global(&b, &library, "Runtime");

    let witness = invoke(
        &b,
        &library,
        runtime,
        "RuntimeConstructor",
        "checkWitness",
        &[b.string("owner")],
    );
    let ops = reducer.parse(witness).unwrap();
    assert_eq!(kinds(&ops), vec![K::PushData, K::Syscall]);
    assert_eq!(*ops[1], Operation::Syscall("System.Runtime.CheckWitness"));

    let container = member(&b, &library, runtime, "RuntimeConstructor", "scriptContainer");
    let sender = member(&b, &library, container, "Transaction", "sender");
    let ops = reducer.parse(sender).unwrap();
    assert_eq!(kinds(&ops), vec![K::Syscall, K::PushInt, K::PickItem]);
    assert_eq!(*ops[0], Operation::Syscall("System.Runtime.GetScriptContainer"));
    assert_eq!(ops[1].as_push_int(), Some(BigInt::from(3)));

    let err = reducer
        .parse_store(
            member(&b, &library, runtime, "RuntimeConstructor", "time"),
            vec![c.push_int(1)],
        )
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::NotAssignable { .. }));
}

// ============================================================================
// ByteString
// ============================================================================

#[test]
fn test_from_hex_folds_literals() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let t = b.types();
    let c = Compiler::new(&arena, CompileOptions::default());
    let library = StandardLibrary::declare(&b);
    let global_scope = build_global_scope(c, library.unit).unwrap();
    let text = b.symbol("text");
    let scope = with_argument(&b, c, &global_scope, text, t.string());
    let reducer = Reducer::new(c, &scope);
    let byte_string = global(&b, &library, "ByteString");

    let call = invoke(
        &b,
        &library,
        byte_string,
        "ByteStringConstructor",
        "fromHex",
        &[b.string("0x0aFF")],
    );
    let ops = reducer.parse(call).unwrap();
    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0].as_push_data(), Some(&[0x0a, 0xff][..]));

    let bad = b.string("zz");
    let call = invoke(&b, &library, byte_string, "ByteStringConstructor", "fromHex", &[bad]);
    let err = reducer.parse(call).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidArgument { .. }));
    assert_eq!(err.node, Some(bad.id));

    let variable = b.ident(text, t.string());
    let call = invoke(&b, &library, byte_string, "ByteStringConstructor", "fromHex", &[variable]);
    let err = reducer.parse(call).unwrap_err();
    assert_eq!(
        err.kind,
        ErrorKind::InvalidArgument {
            reason: "fromHex requires a string literal".to_string()
        }
    );
    assert_eq!(err.node, Some(variable.id));
}

#[test]
fn test_from_integer() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let t = b.types();
    let c = Compiler::new(&arena, CompileOptions::default());
    let library = StandardLibrary::declare(&b);
    let global_scope = build_global_scope(c, library.unit).unwrap();
    let n = b.symbol("n");
    let scope = with_argument(&b, c, &global_scope, n, t.number());
    let reducer = Reducer::new(c, &scope);
    let byte_string = global(&b, &library, "ByteString");
    let from_integer = |arg| {
        invoke(&b, &library, byte_string, "ByteStringConstructor", "fromInteger", &[arg])
    };

    let ops = reducer.parse(from_integer(b.number(0.0))).unwrap();
    assert_eq!(ops[0].as_push_data(), Some(&[][..]));

    let ops = reducer.parse(from_integer(b.number(256.0))).unwrap();
    assert_eq!(ops[0].as_push_data(), Some(&[0x00, 0x01][..]));

    let ops = reducer.parse(from_integer(b.number(-1.0))).unwrap();
    assert_eq!(ops[0].as_push_data(), Some(&[0xff][..]));

    let ops = reducer.parse(from_integer(b.ident(n, t.number()))).unwrap();
    assert_eq!(
        ops.iter().map(|op| **op).collect::<Vec<_>>(),
        vec![
            Operation::Load {
                slot: SlotKind::Argument,
                index: 0
            },
            Operation::Convert(StackItemType::ByteString)
        ]
    );
}

#[test]
fn test_byte_string_instances() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let c = Compiler::new(&arena, CompileOptions::default());
    let library = StandardLibrary::declare(&b);
    let scope = build_global_scope(c, library.unit).unwrap();
    let reducer = Reducer::new(c, &scope);
    let byte_string = global(&b, &library, "ByteString");

    let value = invoke(
        &b,
        &library,
        byte_string,
        "ByteStringConstructor",
        "fromString",
        &[b.string("ab")],
    );
    let ops = reducer.parse(value).unwrap();
    assert_eq!(ops[0].as_push_data(), Some(&b"ab"[..]));

    let length = member(&b, &library, value, "ByteString", "length");
    assert_eq!(kinds(&reducer.parse(length).unwrap()), vec![K::PushData, K::Size]);

    let as_integer = invoke(&b, &library, value, "ByteString", "asInteger", &[]);
    let ops = reducer.parse(as_integer).unwrap();
    assert_eq!(kinds(&ops), vec![K::PushData, K::Convert]);
    assert_eq!(*ops[1], Operation::Convert(StackItemType::Integer));
}

// ============================================================================
// Error, native contracts, free functions
// ============================================================================

#[test]
fn test_error_evaluates_to_its_message() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let c = Compiler::new(&arena, CompileOptions::default());
    let library = StandardLibrary::declare(&b);
    let scope = build_global_scope(c, library.unit).unwrap();
    let reducer = Reducer::new(c, &scope);
    let error_ty = library.interface("Error").unwrap().ty;

    let call = b.call(global(&b, &library, "Error"), &[b.string("boom")], error_ty);
    let ops = reducer.parse(call).unwrap();
    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0].as_push_data(), Some(&b"boom"[..]));

    let construct = b.new_expr(global(&b, &library, "Error"), &[], error_ty);
    let ops = reducer.parse(construct).unwrap();
    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0].as_push_data(), Some(&b""[..]));
}

#[test]
fn test_native_contract_tokens() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let c = Compiler::new(&arena, CompileOptions::default());
    let library = StandardLibrary::declare(&b);
    let scope = build_global_scope(c, library.unit).unwrap();
    let reducer = Reducer::new(c, &scope);

    let std_lib = global(&b, &library, "StdLib");
    let itoa = invoke(&b, &library, std_lib, "StdLibConstructor", "itoa", &[b.number(7.0)]);
    let ops = reducer.parse(itoa).unwrap();
    assert_eq!(kinds(&ops), vec![K::PushInt, K::CallToken]);
    assert_eq!(
        *ops[1],
        Operation::CallToken(&MethodToken {
            hash: STDLIB_HASH,
            method: "itoa",
            params: 1,
            has_return: true,
            call_flags: CallFlags::ALL,
        })
    );

    let ledger = global(&b, &library, "Ledger");
    let index = member(&b, &library, ledger, "LedgerConstructor", "currentIndex");
    let ops = reducer.parse(index).unwrap();
    let Operation::CallToken(token) = *ops[0] else {
        panic!("expected a method token, found {}", ops[0]);
    };
    assert_eq!((token.method, token.params, token.has_return), ("currentIndex", 0, true));

    let destroy = invoke(
        &b,
        &library,
        global(&b, &library, "ContractManagement"),
        "ContractManagementConstructor",
        "destroy",
        &[],
    );
    let ops = reducer.parse(destroy).unwrap();
    let Operation::CallToken(token) = *ops[0] else {
        panic!("expected a method token, found {}", ops[0]);
    };
    assert_eq!((token.method, token.params, token.has_return), ("destroy", 0, false));
}

#[test]
fn test_tagged_free_functions() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let c = Compiler::new(&arena, CompileOptions::default());
    let library = StandardLibrary::declare(&b);
    let scope = build_global_scope(c, library.unit).unwrap();
    let reducer = Reducer::new(c, &scope);

    let ops = reducer.parse(call_function(&b, &library, "getRandom", &[])).unwrap();
    assert_eq!(
        ops.iter().map(|op| **op).collect::<Vec<_>>(),
        vec![Operation::Syscall("System.Runtime.GetRandom")]
    );

    let ops = reducer
        .parse(call_function(&b, &library, "concat", &[b.string("a"), b.string("b")]))
        .unwrap();
    assert_eq!(kinds(&ops), vec![K::PushData, K::PushData, K::Concat]);
    assert_eq!(ops[0].as_push_data(), Some(&b"b"[..]));
    assert_eq!(ops[1].as_push_data(), Some(&b"a"[..]));
}

#[test]
fn test_inline_operations_get_fresh_jump_targets() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let c = Compiler::new(&arena, CompileOptions::default());
    let library = StandardLibrary::declare(&b);
    let scope = build_global_scope(c, library.unit).unwrap();
    let reducer = Reducer::new(c, &scope);

    let call = call_function(&b, &library, "integerOrZero", &[b.null()]);
    let first = reducer.parse(call).unwrap();
    assert_eq!(
        kinds(&first),
        vec![
            K::PushNull,
            K::Duplicate,
            K::IsNull,
            K::JumpIfNot,
            K::Drop,
            K::PushInt,
            K::Jump,
            K::Convert,
            K::Noop
        ]
    );
    assert!(first[3].targets(first[7]));
    assert!(first[6].targets(first[8]));

    let second = reducer.parse(call).unwrap();
    assert!(!core::ptr::eq(first[3], second[3]));
    assert!(!core::ptr::eq(first[8], second[8]));
    assert!(second[3].targets(second[7]));
}
