//! Builtin objects of the Neo environment.
//!
//! The registry reads a declarations unit (see [`StandardLibrary`]) and turns
//! the declarations it recognizes into compile-time objects and types living
//! in the global scope:
//! - ByteString: static constructors with literal folding, plus `length` and
//!   `asInteger()` on instances
//! - Storage and Runtime: interop services (`@syscall`)
//! - Error: construction of throwable values
//! - Stack item interfaces (`@stackitem`): field access by index
//! - Native contracts (`@nativeContract`): method tokens
//! - Ambient functions tagged `@syscall` or `@operation`
//!
//! Builtins only reach the compiler through the thunks they are handed.

mod bytestring;
mod exception;
mod interop;
pub mod library;
mod native;
mod stackitem;
mod tags;

#[cfg(test)]
mod builtins_test;
#[cfg(test)]
mod tags_test;

pub use library::StandardLibrary;
pub use tags::{OperationTemplate, function_object};

use tracing::debug;

use crate::compiler::{
    CompileError, CompileTimeObject, CompileTimeType, Compiler, ErrorKind, Scope,
};
use crate::syntax::{Declaration, InterfaceDecl, MemberDecl, SourceUnit, Tagged, VariableDecl};
use crate::{Rc, ToString, Vec, format};

/// Builds the root scope from the library declarations.
///
/// Fails when a required declaration is missing or a name is defined twice;
/// either leaves the environment unusable, so callers abort compilation.
pub fn build_global_scope<'a>(
    compiler: &'a Compiler<'a>,
    library: &'a SourceUnit<'a>,
) -> Result<Rc<Scope<'a>>, CompileError> {
    debug!(
        library = library.name,
        declarations = library.declarations.len(),
        "Building global scope"
    );
    let mut objects: Vec<CompileTimeObject<'a>> = Vec::new();
    let mut types: Vec<CompileTimeType<'a>> = Vec::new();

    let byte_string = required_variable(library, "ByteString")?;
    objects.push(bytestring::statics(
        compiler,
        byte_string,
        required_type_of(library, byte_string)?,
    )?);
    types.push(bytestring::instance_type(
        compiler,
        required_interface(library, "ByteString")?,
    )?);

    for name in ["Storage", "Runtime"] {
        let var = required_variable(library, name)?;
        objects.push(interop::namespace(
            compiler,
            var,
            required_type_of(library, var)?,
        ));
    }
    for name in ["StorageContext", "ReadonlyStorageContext"] {
        types.push(interop::instance_type(
            compiler,
            required_interface(library, name)?,
        ));
    }

    objects.push(exception::constructor(
        compiler,
        required_variable(library, "Error")?,
    ));

    for decl in library.declarations {
        match decl {
            Declaration::Interface(iface) if iface.has_tag("stackitem") => {
                types.push(stackitem::stack_item_type(compiler, iface));
            }
            Declaration::Variable(var) => {
                let contract =
                    type_of(library, var).filter(|iface| iface.has_tag("nativeContract"));
                if let Some(iface) = contract {
                    objects.push(native::contract(compiler, var, iface)?);
                }
            }
            Declaration::Function(function) if function.ambient => {
                if let Some(object) = function_object(compiler, function)? {
                    objects.push(object);
                }
            }
            _ => {}
        }
    }

    debug!(
        objects = objects.len(),
        types = types.len(),
        "Registered builtins"
    );
    let mut scope = Scope::root().define_all(objects)?;
    for ctt in types {
        scope = scope.define_type(ctt)?;
    }
    Ok(scope)
}

fn missing(name: &str) -> CompileError {
    CompileError::new(ErrorKind::MissingBuiltin {
        name: name.to_string(),
    })
}

fn required_variable<'a>(
    library: &'a SourceUnit<'a>,
    name: &str,
) -> Result<&'a VariableDecl<'a>, CompileError> {
    library.variable(name).ok_or_else(|| missing(name))
}

fn required_interface<'a>(
    library: &'a SourceUnit<'a>,
    name: &str,
) -> Result<&'a InterfaceDecl<'a>, CompileError> {
    library.interface(name).ok_or_else(|| missing(name))
}

/// The interface declaring the members of `var`.
fn type_of<'a>(
    library: &'a SourceUnit<'a>,
    var: &VariableDecl<'a>,
) -> Option<&'a InterfaceDecl<'a>> {
    var.ty
        .interface_symbol()
        .and_then(|symbol| library.interface_by_symbol(symbol))
}

fn required_type_of<'a>(
    library: &'a SourceUnit<'a>,
    var: &VariableDecl<'a>,
) -> Result<&'a InterfaceDecl<'a>, CompileError> {
    type_of(library, var).ok_or_else(|| missing(&format!("type of {}", var.name)))
}

fn required_member<'a>(
    iface: &'a InterfaceDecl<'a>,
    name: &str,
) -> Result<&'a MemberDecl<'a>, CompileError> {
    iface
        .member(name)
        .ok_or_else(|| missing(&format!("{}.{}", iface.name, name)))
}
