//! Compilation of a whole source unit.

use tracing::debug;

use crate::api::Diagnostic;
use crate::builtins;
use crate::compiler::object::{call_invoker, invoker};
use crate::compiler::{
    CompileError, CompileTimeObject, Compiler, ContractMethod, MethodParameter, Receiver, Scope,
    parse_contract_method,
};
use crate::ops::Operation;
use crate::syntax::{Declaration, FunctionDecl, SourceUnit, Symbol, Tagged};
use crate::{Rc, Vec, vec};

/// Interop service every event notification goes through.
const NOTIFY: &str = "System.Runtime.Notify";

/// A notification a contract may emit.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractEvent<'a> {
    pub name: &'a str,
    pub symbol: Symbol<'a>,
    pub parameters: Vec<MethodParameter<'a>>,
}

/// The output of [`compile_unit`].
#[derive(Debug)]
pub struct CompiledUnit<'a> {
    pub methods: Vec<ContractMethod<'a>>,
    pub events: Vec<ContractEvent<'a>>,
    /// One entry per independent failure. Failing declarations produce no
    /// method.
    pub diagnostics: Vec<Diagnostic>,
    /// The unit scope: every top-level declaration, child of the global scope.
    pub scope: Rc<Scope<'a>>,
}

impl<'a> CompiledUnit<'a> {
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn method(&self, name: &str) -> Option<&ContractMethod<'a>> {
        self.methods.iter().find(|method| method.name == name)
    }
}

/// Lowers every function of `unit`.
///
/// Functions are hoisted first so that they can call each other regardless
/// of declaration order.
pub fn compile_unit<'a>(
    compiler: &'a Compiler<'a>,
    global: &Rc<Scope<'a>>,
    unit: &'a SourceUnit<'a>,
) -> CompiledUnit<'a> {
    debug!(unit = unit.name, declarations = unit.declarations.len(), "Compiling unit");

    let mut scope = Scope::child(global);
    let mut events = Vec::new();
    let mut diagnostics = Vec::new();
    let mut report = |err: CompileError| diagnostics.push(err.to_diagnostic());

    for decl in unit.declarations {
        let Declaration::Function(function) = decl else {
            continue;
        };
        let object = if function.ambient {
            match ambient_function(compiler, function, &mut events) {
                Ok(Some(object)) => object,
                Ok(None) => continue,
                Err(err) => {
                    report(err);
                    continue;
                }
            }
        } else if function.body.is_some() {
            CompileTimeObject::declared(*function, function.symbol, Vec::new()).with_call(
                call_invoker(
                    Receiver::Ignore,
                    vec![compiler.op(Operation::Call(function.symbol))],
                ),
            )
        } else {
            // Overload signature.
            continue;
        };
        match scope.define(object) {
            Ok(extended) => scope = extended,
            Err(err) => report(err),
        }
    }

    let mut methods = Vec::new();
    for decl in unit.declarations {
        let Declaration::Function(function) = decl else {
            continue;
        };
        if function.ambient || function.body.is_none() {
            continue;
        }
        match parse_contract_method(compiler, &scope, function) {
            Ok(method) => methods.push(method),
            Err(errors) => errors.into_iter().for_each(&mut report),
        }
    }

    debug!(
        unit = unit.name,
        methods = methods.len(),
        events = events.len(),
        errors = diagnostics.len(),
        "Unit compiled"
    );
    CompiledUnit {
        methods,
        events,
        diagnostics,
        scope,
    }
}

/// A `declare function`: an event, a library function with lowering tags,
/// or nothing the compiler can call.
fn ambient_function<'a>(
    compiler: &'a Compiler<'a>,
    function: &'a FunctionDecl<'a>,
    events: &mut Vec<ContractEvent<'a>>,
) -> Result<Option<CompileTimeObject<'a>>, CompileError> {
    if let Some(tag) = function.tag("event") {
        let name = match tag.text.trim() {
            "" => function.name,
            name => name,
        };
        events.push(ContractEvent {
            name,
            symbol: function.symbol,
            parameters: function
                .params
                .iter()
                .map(|param| MethodParameter {
                    name: param.name,
                    ty: param.ty,
                })
                .collect(),
        });
        let notify = invoker(move |invocation| {
            let mut ops = invocation.args_reversed()?;
            ops.push(compiler.push_int(invocation.args.len()));
            ops.push(compiler.op(Operation::PackArray));
            ops.push(compiler.push_str(name));
            ops.push(compiler.syscall(NOTIFY));
            Ok(CompileTimeObject::new(ops))
        });
        return Ok(Some(
            CompileTimeObject::declared(function, function.symbol, Vec::new()).with_call(notify),
        ));
    }
    builtins::function_object(compiler, function)
}
