//! Error
//!
//! `Error(message)` and `new Error(message)` both evaluate to the message:
//! the VM throws plain stack items.

use crate::compiler::object::invoker;
use crate::compiler::{CompileTimeObject, Compiler};
use crate::syntax::VariableDecl;
use crate::vec;

pub(super) fn constructor<'a>(
    compiler: &'a Compiler<'a>,
    var: &'a VariableDecl<'a>,
) -> CompileTimeObject<'a> {
    let build = invoker(move |invocation| {
        let ops = match invocation.args.first() {
            Some(message) => message()?,
            None => vec![compiler.push_str("")],
        };
        Ok(CompileTimeObject::new(ops))
    });
    CompileTimeObject::declared(var, var.symbol, vec![])
        .with_call(build.clone())
        .with_call_new(build)
}
