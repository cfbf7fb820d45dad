//! Interop services reached through `@syscall` members (Storage, Runtime and
//! storage contexts).

use crate::compiler::object::{call_invoker, member_resolver, method_resolver};
use crate::compiler::{
    CompileTimeObject, CompileTimeType, Compiler, PropertyMap, Receiver,
};
use crate::syntax::{InterfaceDecl, MemberKind, Tagged, VariableDecl};
use crate::vec;

/// A global whose `@syscall` members call the service without a receiver.
pub(super) fn namespace<'a>(
    compiler: &'a Compiler<'a>,
    var: &'a VariableDecl<'a>,
    iface: &'a InterfaceDecl<'a>,
) -> CompileTimeObject<'a> {
    CompileTimeObject::declared(var, var.symbol, vec![])
        .with_properties(syscall_members(compiler, iface, Receiver::Ignore))
}

/// An interface whose `@syscall` members pass the instance to the service.
pub(super) fn instance_type<'a>(
    compiler: &'a Compiler<'a>,
    iface: &'a InterfaceDecl<'a>,
) -> CompileTimeType<'a> {
    CompileTimeType {
        properties: syscall_members(compiler, iface, Receiver::Push),
        ..CompileTimeType::new(iface.ty)
    }
}

/// Properties read as `[receiver] ++ [syscall]`; methods call as
/// `args reversed ++ [receiver] ++ [syscall]`. Untagged members are skipped.
fn syscall_members<'a>(
    compiler: &'a Compiler<'a>,
    iface: &'a InterfaceDecl<'a>,
    receiver: Receiver,
) -> PropertyMap<'a> {
    iface
        .members
        .iter()
        .filter_map(|member| {
            let service = member.tag("syscall")?.text.trim();
            let ops = vec![compiler.syscall(service)];
            let resolver = match member.kind {
                MemberKind::Property => {
                    member_resolver(receiver, CompileTimeObject::new(ops))
                }
                MemberKind::Method { .. } => method_resolver(call_invoker(receiver, ops)),
            };
            Some((member.symbol, resolver))
        })
        .collect()
}
