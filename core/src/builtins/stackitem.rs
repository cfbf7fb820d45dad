//! Interfaces tagged `@stackitem` describe VM arrays: each property is the
//! array element at its declaration index.

use crate::compiler::object::member_resolver;
use crate::compiler::{CompileTimeObject, CompileTimeType, Compiler, Receiver};
use crate::ops::Operation;
use crate::syntax::{InterfaceDecl, MemberKind};
use crate::vec;

pub(super) fn stack_item_type<'a>(
    compiler: &'a Compiler<'a>,
    iface: &'a InterfaceDecl<'a>,
) -> CompileTimeType<'a> {
    let mut ctt = CompileTimeType::new(iface.ty);
    for (index, member) in iface.members.iter().enumerate() {
        if member.kind != MemberKind::Property {
            continue;
        }
        let field = CompileTimeObject::new(vec![
            compiler.push_int(index),
            compiler.op(Operation::PickItem),
        ]);
        ctt.properties
            .insert(member.symbol, member_resolver(Receiver::Push, field));
    }
    ctt
}
