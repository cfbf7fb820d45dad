//! Native contracts: globals whose interface carries
//! `@nativeContract 0x<script hash>`. Every member becomes a `CALLT` through a
//! method token.

use crate::compiler::object::{call_invoker, member_resolver, method_resolver};
use crate::compiler::{
    CompileError, CompileTimeObject, Compiler, PropertyMap, Receiver,
};
use crate::ops::{CallFlags, MethodToken, Operation};
use crate::syntax::{InterfaceDecl, MemberKind, Tagged, VariableDecl};
use crate::{format, vec};

pub(super) fn contract<'a>(
    compiler: &'a Compiler<'a>,
    var: &'a VariableDecl<'a>,
    iface: &'a InterfaceDecl<'a>,
) -> Result<CompileTimeObject<'a>, CompileError> {
    let text = iface.tag("nativeContract").map_or("", |tag| tag.text.trim());
    let hash = parse_script_hash(text).ok_or_else(|| {
        CompileError::invalid_argument(
            iface,
            &format!("'{}' is not a 20 byte script hash", text),
        )
    })?;

    let mut properties = PropertyMap::new();
    for member in iface.members {
        let (params, has_return) = match member.kind {
            MemberKind::Property => (0, true),
            MemberKind::Method { params } => {
                let params = u16::try_from(params).map_err(|_| {
                    CompileError::invalid_argument(member, "too many parameters")
                })?;
                let returns = member.ty.return_type().is_some_and(|ret| !ret.is_void_like());
                (params, returns)
            }
        };
        let token = compiler.arena().alloc(MethodToken {
            hash,
            method: member.name,
            params,
            has_return,
            call_flags: CallFlags::ALL,
        });
        let ops = vec![compiler.op(Operation::CallToken(token))];
        let resolver = match member.kind {
            MemberKind::Property => {
                member_resolver(Receiver::Ignore, CompileTimeObject::new(ops))
            }
            MemberKind::Method { .. } => method_resolver(call_invoker(Receiver::Ignore, ops)),
        };
        properties.insert(member.symbol, resolver);
    }
    Ok(CompileTimeObject::declared(var, var.symbol, vec![]).with_properties(properties))
}

/// Parses a big-endian `0x` hash into the little-endian bytes tokens carry.
pub(super) fn parse_script_hash(text: &str) -> Option<[u8; 20]> {
    let digits = text.strip_prefix("0x").unwrap_or(text);
    let mut hash: [u8; 20] = hex::decode(digits).ok()?.try_into().ok()?;
    hash.reverse();
    Some(hash)
}
