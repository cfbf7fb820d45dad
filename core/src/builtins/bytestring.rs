//! ByteString
//!
//! Statics: fromHex, fromInteger, fromString
//! Instance members: length, asInteger()

use num_traits::Zero;

use super::required_member;
use crate::compiler::object::{call_invoker, invoker, member_resolver, method_resolver};
use crate::compiler::{
    CompileError, CompileTimeObject, CompileTimeType, Compiler, Invocation, PropertyMap,
    Receiver,
};
use crate::ops::{Operation, Ops, StackItemType};
use crate::syntax::{Expr, InterfaceDecl, VariableDecl};
use crate::{format, vec};

// ============================================================================
// Statics
// ============================================================================

pub(super) fn statics<'a>(
    compiler: &'a Compiler<'a>,
    var: &'a VariableDecl<'a>,
    constructor: &'a InterfaceDecl<'a>,
) -> Result<CompileTimeObject<'a>, CompileError> {
    let mut properties = PropertyMap::new();
    properties.insert(
        required_member(constructor, "fromHex")?.symbol,
        method_resolver(invoker(move |invocation| from_hex(compiler, invocation))),
    );
    properties.insert(
        required_member(constructor, "fromInteger")?.symbol,
        method_resolver(invoker(move |invocation| from_integer(compiler, invocation))),
    );
    properties.insert(
        required_member(constructor, "fromString")?.symbol,
        method_resolver(invoker(|invocation| {
            first_argument(invocation).map(CompileTimeObject::new)
        })),
    );
    Ok(CompileTimeObject::declared(var, var.symbol, vec![]).with_properties(properties))
}

/// The expression to blame for a bad argument.
fn argument_node<'a>(invocation: &Invocation<'_, 'a>) -> &'a Expr<'a> {
    invocation
        .arg_nodes()
        .first()
        .copied()
        .unwrap_or(invocation.node)
}

fn first_argument<'a>(invocation: &Invocation<'_, 'a>) -> Result<Ops<'a>, CompileError> {
    let arg = invocation
        .args
        .first()
        .ok_or_else(|| CompileError::invalid_argument(invocation.node, "missing argument"))?;
    arg()
}

/// Decodes a literal hex string at compile time.
fn from_hex<'a>(
    compiler: &'a Compiler<'a>,
    invocation: &Invocation<'_, 'a>,
) -> Result<CompileTimeObject<'a>, CompileError> {
    let node = argument_node(invocation);
    let ops = first_argument(invocation)?;
    let text = match ops.as_slice() {
        [op] => op.as_push_data(),
        _ => None,
    }
    .and_then(|bytes| core::str::from_utf8(bytes).ok())
    .ok_or_else(|| CompileError::invalid_argument(node, "fromHex requires a string literal"))?;

    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    let bytes = hex::decode(digits).map_err(|err| {
        CompileError::invalid_argument(node, &format!("invalid hex string '{}': {}", text, err))
    })?;
    Ok(CompileTimeObject::new(vec![compiler.push_data(&bytes)]))
}

/// Folds literal integers into their byte representation; anything else is
/// converted at run time.
fn from_integer<'a>(
    compiler: &'a Compiler<'a>,
    invocation: &Invocation<'_, 'a>,
) -> Result<CompileTimeObject<'a>, CompileError> {
    let mut ops = first_argument(invocation)?;
    let literal = match ops.as_slice() {
        [op] => op.as_push_int(),
        _ => None,
    };
    match literal {
        // Zero converts to the empty byte string on the VM.
        Some(value) if value.is_zero() => Ok(CompileTimeObject::new(vec![compiler.push_data(&[])])),
        Some(value) => Ok(CompileTimeObject::new(vec![
            compiler.push_data(&value.to_signed_bytes_le()),
        ])),
        None => {
            ops.push(compiler.op(Operation::Convert(StackItemType::ByteString)));
            Ok(CompileTimeObject::new(ops))
        }
    }
}

// ============================================================================
// Instances
// ============================================================================

pub(super) fn instance_type<'a>(
    compiler: &'a Compiler<'a>,
    iface: &'a InterfaceDecl<'a>,
) -> Result<CompileTimeType<'a>, CompileError> {
    let length = required_member(iface, "length")?;
    let as_integer = required_member(iface, "asInteger")?;
    Ok(CompileTimeType::new(iface.ty)
        .with_property(
            length.symbol,
            member_resolver(
                Receiver::Push,
                CompileTimeObject::new(vec![compiler.op(Operation::Size)]),
            ),
        )
        .with_property(
            as_integer.symbol,
            method_resolver(call_invoker(
                Receiver::Push,
                vec![compiler.op(Operation::Convert(StackItemType::Integer))],
            )),
        ))
}
