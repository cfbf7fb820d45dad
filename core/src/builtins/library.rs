//! The declarations file of the Neo environment, built as a typed unit.
//!
//! The registry in [`super::build_global_scope`] reads these declarations by
//! name and by doc tag; hosts with their own declarations file only need to
//! keep the names and tags the registry looks for.

use crate::syntax::{
    AstBuilder, Declaration, FunctionDecl, InterfaceDecl, MemberDecl, SourceUnit, Type,
    VariableDecl,
};

// ============================================================================
// Native contract hashes (big-endian, as displayed by Neo tooling)
// ============================================================================

pub const STDLIB: &str = "0xacce6fd80d44e1796aa0c2c625e9e4e0ce39efc0";
pub const LEDGER: &str = "0xda65b600f7124ce6c79950c1772a36403104f2be";
pub const CONTRACT_MANAGEMENT: &str = "0xfffdc93764dbaddd97c48f252a53ea4643faa3fd";

/// The standard Neo declarations.
#[derive(Debug, Clone, Copy)]
pub struct StandardLibrary<'a> {
    pub unit: &'a SourceUnit<'a>,
}

impl<'a> StandardLibrary<'a> {
    pub fn declare(b: &AstBuilder<'a>) -> Self {
        let t = b.types();
        let mut declarations = crate::Vec::new();

        // ByteString
        let byte_string = b.interface("ByteString");
        let bs = byte_string.ty();
        let byte_string = byte_string
            .property("length", t.number(), &[])
            .method("asInteger", &[], t.bigint(), &[])
            .build();
        let byte_string_constructor = b
            .interface("ByteStringConstructor")
            .method("fromHex", &[t.string()], bs, &[])
            .method("fromInteger", &[t.union(&[t.number(), t.bigint()])], bs, &[])
            .method("fromString", &[t.string()], bs, &[])
            .build();
        let byte_string_var = b.declare_const("ByteString", byte_string_constructor.ty, &[]);
        declarations.extend([
            Declaration::Interface(byte_string),
            Declaration::Interface(byte_string_constructor),
            Declaration::Variable(byte_string_var),
        ]);

        // Stack items
        let transaction = b
            .interface("Transaction")
            .tag("stackitem", "")
            .property("hash", bs, &[])
            .property("version", t.number(), &[])
            .property("nonce", t.number(), &[])
            .property("sender", bs, &[])
            .property("systemFee", t.bigint(), &[])
            .property("networkFee", t.bigint(), &[])
            .property("validUntilBlock", t.number(), &[])
            .property("script", bs, &[])
            .build();
        let block = b
            .interface("Block")
            .tag("stackitem", "")
            .property("hash", bs, &[])
            .property("version", t.number(), &[])
            .property("previousHash", bs, &[])
            .property("merkleRoot", bs, &[])
            .property("timestamp", t.bigint(), &[])
            .property("nonce", t.bigint(), &[])
            .property("index", t.number(), &[])
            .property("primaryIndex", t.number(), &[])
            .property("nextConsensus", bs, &[])
            .property("transactionsCount", t.number(), &[])
            .build();
        declarations.extend([
            Declaration::Interface(transaction),
            Declaration::Interface(block),
        ]);

        // Storage
        let maybe_bs = t.union(&[bs, t.undefined()]);
        let readonly_context = b
            .interface("ReadonlyStorageContext")
            .method("get", &[bs], maybe_bs, &[("syscall", "System.Storage.Get")])
            .method("find", &[bs, t.number()], t.any(), &[("syscall", "System.Storage.Find")])
            .build();
        let context = b
            .interface("StorageContext")
            .property(
                "asReadonly",
                readonly_context.ty,
                &[("syscall", "System.Storage.AsReadOnly")],
            )
            .method("get", &[bs], maybe_bs, &[("syscall", "System.Storage.Get")])
            .method("find", &[bs, t.number()], t.any(), &[("syscall", "System.Storage.Find")])
            .method("put", &[bs, bs], t.void(), &[("syscall", "System.Storage.Put")])
            .method("delete", &[bs], t.void(), &[("syscall", "System.Storage.Delete")])
            .build();
        let storage_constructor = b
            .interface("StorageConstructor")
            .property(
                "context",
                context.ty,
                &[("syscall", "System.Storage.GetContext")],
            )
            .property(
                "readonlyContext",
                readonly_context.ty,
                &[("syscall", "System.Storage.GetReadOnlyContext")],
            )
            .build();
        let storage = b.declare_const("Storage", storage_constructor.ty, &[]);
        declarations.extend([
            Declaration::Interface(readonly_context),
            Declaration::Interface(context),
            Declaration::Interface(storage_constructor),
            Declaration::Variable(storage),
        ]);

        // Runtime
        let runtime_constructor = b
            .interface("RuntimeConstructor")
            .property("trigger", t.number(), &[("syscall", "System.Runtime.GetTrigger")])
            .property("platform", t.string(), &[("syscall", "System.Runtime.Platform")])
            .property("network", t.number(), &[("syscall", "System.Runtime.GetNetwork")])
            .property("time", t.bigint(), &[("syscall", "System.Runtime.GetTime")])
            .property("gasLeft", t.bigint(), &[("syscall", "System.Runtime.GasLeft")])
            .property(
                "scriptContainer",
                transaction.ty,
                &[("syscall", "System.Runtime.GetScriptContainer")],
            )
            .property(
                "executingScriptHash",
                bs,
                &[("syscall", "System.Runtime.GetExecutingScriptHash")],
            )
            .property(
                "callingScriptHash",
                bs,
                &[("syscall", "System.Runtime.GetCallingScriptHash")],
            )
            .property(
                "entryScriptHash",
                bs,
                &[("syscall", "System.Runtime.GetEntryScriptHash")],
            )
            .method(
                "checkWitness",
                &[bs],
                t.boolean(),
                &[("syscall", "System.Runtime.CheckWitness")],
            )
            .method("log", &[t.string()], t.void(), &[("syscall", "System.Runtime.Log")])
            .method("burnGas", &[t.bigint()], t.void(), &[("syscall", "System.Runtime.BurnGas")])
            .build();
        let runtime = b.declare_const("Runtime", runtime_constructor.ty, &[]);
        declarations.extend([
            Declaration::Interface(runtime_constructor),
            Declaration::Variable(runtime),
        ]);

        // Error
        let error = b.interface("Error").property("message", t.string(), &[]).build();
        let error_constructor = b.interface("ErrorConstructor").build();
        let error_var = b.declare_const("Error", error_constructor.ty, &[]);
        declarations.extend([
            Declaration::Interface(error),
            Declaration::Interface(error_constructor),
            Declaration::Variable(error_var),
        ]);

        // Native contracts
        let std_lib = b
            .interface("StdLibConstructor")
            .tag("nativeContract", STDLIB)
            .method("itoa", &[t.bigint()], t.string(), &[])
            .method("atoi", &[t.string()], t.bigint(), &[])
            .method("base64Encode", &[bs], t.string(), &[])
            .method("base64Decode", &[t.string()], bs, &[])
            .build();
        let ledger = b
            .interface("LedgerConstructor")
            .tag("nativeContract", LEDGER)
            .property("currentHash", bs, &[])
            .property("currentIndex", t.number(), &[])
            .method("getBlock", &[bs], block.ty, &[])
            .method("getTransaction", &[bs], transaction.ty, &[])
            .build();
        let contract_management = b
            .interface("ContractManagementConstructor")
            .tag("nativeContract", CONTRACT_MANAGEMENT)
            .property("minimumDeploymentFee", t.bigint(), &[])
            .method("hasMethod", &[bs, t.string(), t.number()], t.boolean(), &[])
            .method("destroy", &[], t.void(), &[])
            .build();
        declarations.extend([
            Declaration::Interface(std_lib),
            Declaration::Variable(b.declare_const("StdLib", std_lib.ty, &[])),
            Declaration::Interface(ledger),
            Declaration::Variable(b.declare_const("Ledger", ledger.ty, &[])),
            Declaration::Interface(contract_management),
            Declaration::Variable(b.declare_const(
                "ContractManagement",
                contract_management.ty,
                &[],
            )),
        ]);

        // Free functions
        let any_or_null = t.union(&[bs, t.null()]);
        declarations.extend([
            Declaration::Function(
                b.function(b.symbol("getCallFlags"))
                    .returns(t.number())
                    .ambient()
                    .tag("syscall", "System.Contract.GetCallFlags")
                    .build(),
            ),
            Declaration::Function(
                b.function(b.symbol("getRandom"))
                    .returns(t.bigint())
                    .ambient()
                    .tag("syscall", "System.Runtime.GetRandom")
                    .build(),
            ),
            Declaration::Function(
                b.function(b.symbol("concat"))
                    .param(b.symbol("first"), bs)
                    .param(b.symbol("second"), bs)
                    .returns(bs)
                    .ambient()
                    .tag("operation", "concat")
                    .build(),
            ),
            Declaration::Function(
                b.function(b.symbol("integerOrZero"))
                    .param(b.symbol("value"), any_or_null)
                    .returns(t.bigint())
                    .ambient()
                    .tag("operation", "duplicate")
                    .tag("operation", "isnull")
                    .tag("operation", "jumpifnot 4")
                    .tag("operation", "drop")
                    .tag("operation", "pushint 0")
                    .tag("operation", "jump 2")
                    .tag("operation", "convert Integer")
                    .build(),
            ),
        ]);

        StandardLibrary {
            unit: b.unit("neo.d.ts", &declarations),
        }
    }

    pub fn variable(&self, name: &str) -> Option<&'a VariableDecl<'a>> {
        self.unit.variable(name)
    }

    pub fn interface(&self, name: &str) -> Option<&'a InterfaceDecl<'a>> {
        self.unit.interface(name)
    }

    pub fn function(&self, name: &str) -> Option<&'a FunctionDecl<'a>> {
        self.unit.function(name)
    }

    /// A member of the interface named `interface`.
    pub fn member(&self, interface: &str, member: &str) -> Option<&'a MemberDecl<'a>> {
        self.interface(interface)?.member(member)
    }

    /// The type of the global variable `name`.
    pub fn type_of(&self, name: &str) -> Option<&'a Type<'a>> {
        self.variable(name).map(|var| var.ty)
    }
}
