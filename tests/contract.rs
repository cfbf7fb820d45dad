//! Whole-unit compilation through the public facade.

use bumpalo::Bump;
use neots::syntax::{BinaryOp, Declaration, Expr, PostfixOp, PrefixOp};
use neots::{
    AstBuilder, CompileOptions, Engine, MethodParameter, Operation, OperationKind,
    StandardLibrary,
};
use pretty_assertions::assert_eq;

/// `object.name`, typed by the member declared on `iface`.
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

fn invoke<'a>(
    b: &AstBuilder<'a>,
    library: &StandardLibrary<'a>,
    object: &'a Expr<'a>,
    iface: &str,
    name: &str,
    args: &[&'a Expr<'a>],
) -> &'a Expr<'a> {
    let callee = member(b, library, object, iface, name);
    b.call(callee, args, callee.ty.return_type().unwrap())
}

fn global<'a>(b: &AstBuilder<'a>, library: &StandardLibrary<'a>, name: &str) -> &'a Expr<'a> {
    let var = library.variable(name).unwrap();
    b.ident(var.symbol, var.ty)
}

#[test]
fn test_storage_contract() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let t = b.types();
    let library = StandardLibrary::declare(&b);
    let engine = Engine::new(&arena, CompileOptions::default(), library.unit).unwrap();
    let bs = library.interface("ByteString").unwrap().ty;
    let storage = global(&b, &library, "Storage");
    let context = member(&b, &library, storage, "StorageConstructor", "context");

    // export function put(key: ByteString, value: ByteString) {
    //     Storage.context.put(key, value);
    // }
    let key = b.symbol("key");
    let value = b.symbol("value");
    let put = b
        .function(b.symbol("put"))
        .param(key, bs)
        .param(value, bs)
        .exported()
        .body(b.block(&[b.expr_stmt(invoke(
            &b,
            &library,
            context,
            "StorageContext",
            "put",
            &[b.ident(key, bs), b.ident(value, bs)],
        ))]))
        .build();

    // /** @safe */
    // export function get(key: ByteString) {
    //     return Storage.context.get(key);
    // }
    let get_key = b.symbol("key");
    let get = b
        .function(b.symbol("get"))
        .param(get_key, bs)
        .returns(t.union(&[bs, t.undefined()]))
        .exported()
        .tag("safe", "")
        .body(b.block(&[b.ret(Some(invoke(
            &b,
            &library,
            context,
            "StorageContext",
            "get",
            &[b.ident(get_key, bs)],
        )))]))
        .build();

    let unit = b.unit(
        "contract.ts",
        &[Declaration::Function(put), Declaration::Function(get)],
    );
    let compiled = neots::compile(&engine, unit, "contract.ts", "").unwrap();

    let put = compiled.method("put").unwrap();
    assert_eq!(
        put.listing(),
        concat!(
            "   0: initslot 0 locals, 2 params\n",
            "   1: loadarg 1\n",
            "   2: loadarg 0\n",
            "   3: syscall System.Storage.GetContext\n",
            "   4: syscall System.Storage.Put\n",
            "   5: noop\n",
            "   6: return\n",
        )
    );
    assert!(put.public);
    assert!(!put.safe);

    let get = compiled.method("get").unwrap();
    assert_eq!(
        get.listing(),
        concat!(
            "   0: initslot 0 locals, 1 params\n",
            "   1: loadarg 0\n",
            "   2: syscall System.Storage.GetContext\n",
            "   3: syscall System.Storage.Get\n",
            "   4: jump 5\n",
            "   5: noop\n",
            "   6: return\n",
        )
    );
    assert!(get.safe);
}

#[test]
fn test_transfer_with_witness_check_and_event() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let t = b.types();
    let library = StandardLibrary::declare(&b);
    let engine = Engine::new(&arena, CompileOptions::default(), library.unit).unwrap();
    let bs = library.interface("ByteString").unwrap().ty;

    // /** @event Transfer */
    // declare function onTransfer(from: ByteString, amount: number): void;
    let event = b
        .function(b.symbol("onTransfer"))
        .param(b.symbol("from"), bs)
        .param(b.symbol("amount"), t.number())
        .ambient()
        .tag("event", "Transfer")
        .build();

    // export function transfer(from: ByteString, amount: number) {
    //     if (!Runtime.checkWitness(from)) throw Error("no witness");
    //     onTransfer(from, amount);
    // }
    let from = b.symbol("from");
    let amount = b.symbol("amount");
    let witness = invoke(
        &b,
        &library,
        global(&b, &library, "Runtime"),
        "RuntimeConstructor",
        "checkWitness",
        &[b.ident(from, bs)],
    );
    let error_ty = library.interface("Error").unwrap().ty;
    let error = global(&b, &library, "Error");
    let reject = b.throw(b.call(error, &[b.string("no witness")], error_ty));
    let notify = b.expr_stmt(b.call(
        b.ident(event.symbol, t.function(&[bs, t.number()], t.void())),
        &[b.ident(from, bs), b.ident(amount, t.number())],
        t.void(),
    ));
    let transfer = b
        .function(b.symbol("transfer"))
        .param(from, bs)
        .param(amount, t.number())
        .exported()
        .body(b.block(&[
            b.if_stmt(b.prefix(PrefixOp::Not, witness), reject, None),
            notify,
        ]))
        .build();

    let unit = b.unit(
        "token.ts",
        &[Declaration::Function(event), Declaration::Function(transfer)],
    );
    let compiled = neots::compile(&engine, unit, "token.ts", "").unwrap();

    let transfer = compiled.method("transfer").unwrap();
    assert_eq!(
        transfer.listing(),
        concat!(
            "   0: initslot 0 locals, 2 params\n",
            "   1: loadarg 0\n",
            "   2: syscall System.Runtime.CheckWitness\n",
            "   3: not\n",
            "   4: jumpifnot 7\n",
            "   5: pushdata \"no witness\"\n",
            "   6: throw\n",
            "   7: noop\n",
            "   8: loadarg 1\n",
            "   9: loadarg 0\n",
            "  10: pushint 2\n",
            "  11: packarray\n",
            "  12: pushdata \"Transfer\"\n",
            "  13: syscall System.Runtime.Notify\n",
            "  14: noop\n",
            "  15: return\n",
        )
    );
    assert_eq!(
        transfer
            .sequence_points
            .iter()
            .map(|point| point.index)
            .collect::<Vec<_>>(),
        vec![1, 5, 8]
    );

    assert_eq!(compiled.events.len(), 1);
    assert_eq!(compiled.events[0].name, "Transfer");
    assert_eq!(
        compiled.events[0].parameters,
        vec![
            MethodParameter {
                name: "from",
                ty: bs
            },
            MethodParameter {
                name: "amount",
                ty: t.number()
            },
        ]
    );
}

#[test]
fn test_counter_loop_with_native_call() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let t = b.types();
    let library = StandardLibrary::declare(&b);
    let engine = Engine::new(&arena, CompileOptions::default(), library.unit).unwrap();

    // export function countdown(n: number): string {
    //     let text = "";
    //     while (n > 0) {
    //         text = text + n;
    //         n--;
    //     }
    //     return text;
    // }
    let n = b.symbol("n");
    let text = b.symbol("text");
    let append = b.assign(
        b.ident(text, t.string()),
        b.binary(
            BinaryOp::Add,
            b.ident(text, t.string()),
            b.ident(n, t.number()),
        ),
    );
    let countdown = b
        .function(b.symbol("countdown"))
        .param(n, t.number())
        .returns(t.string())
        .exported()
        .body(b.block(&[
            b.let_stmt(text, b.string("")),
            b.while_stmt(
                b.binary(BinaryOp::Gt, b.ident(n, t.number()), b.number(0.0)),
                b.block(&[
                    b.expr_stmt(append),
                    b.expr_stmt(b.postfix(PostfixOp::Decrement, b.ident(n, t.number()))),
                ]),
            ),
            b.ret(Some(b.ident(text, t.string()))),
        ]))
        .build();

    let unit = b.unit("countdown.ts", &[Declaration::Function(countdown)]);
    let compiled = neots::compile(&engine, unit, "countdown.ts", "").unwrap();
    let method = &compiled.methods[0];

    let kinds: Vec<OperationKind> = method.operations.iter().map(|op| op.kind()).collect();
    assert_eq!(kinds[0], OperationKind::InitSlot);
    assert_eq!(
        *method.operations[0],
        Operation::InitSlot {
            locals: 1,
            params: 1
        }
    );
    assert_eq!(
        kinds.iter().filter(|kind| **kind == OperationKind::CallToken).count(),
        1
    );
    assert_eq!(
        kinds.iter().filter(|kind| **kind == OperationKind::Return).count(),
        1
    );

    let itoa = method
        .operations
        .iter()
        .find_map(|op| match op {
            Operation::CallToken(token) => Some(*token),
            _ => None,
        })
        .unwrap();
    assert_eq!(itoa.method, "itoa");
    assert_eq!(itoa.hash, neots::STDLIB_HASH);

    // Every jump lands inside the method.
    for op in &method.operations {
        if let Some(target) = op.jump_target() {
            assert!(method.index_of(target).is_some(), "dangling {}", op);
        }
    }
}
