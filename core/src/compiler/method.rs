//! Assembly of one function declaration into a contract method.

use core::fmt::Write as _;
use tracing::debug;

use crate::compiler::{
    CompileError, CompileTimeObject, Compiler, ErrorKind, Scope, StatementProcessor,
    StatementScope,
};
use crate::ops::{Operation, Ops, SlotKind};
use crate::syntax::{FunctionDecl, Span, StmtKind, Symbol, Tagged, Type, VariableDeclarator};
use crate::{Rc, String, Vec, vec};

/// Maps an operation index back to the statement it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencePoint {
    pub index: usize,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MethodParameter<'a> {
    pub name: &'a str,
    pub ty: &'a Type<'a>,
}

/// A fully lowered method, ready for serialization.
#[derive(Debug, Clone)]
pub struct ContractMethod<'a> {
    pub name: &'a str,
    pub symbol: Symbol<'a>,
    /// Declared `@safe`: callable without write permissions.
    pub safe: bool,
    /// Exported, and therefore part of the manifest ABI.
    pub public: bool,
    pub return_type: &'a Type<'a>,
    pub parameters: Vec<MethodParameter<'a>>,
    pub operations: Ops<'a>,
    pub sequence_points: Vec<SequencePoint>,
}

impl<'a> ContractMethod<'a> {
    /// Position of `op` in this method, by identity.
    pub fn index_of(&self, op: &Operation<'a>) -> Option<usize> {
        self.operations
            .iter()
            .position(|candidate| core::ptr::eq(*candidate, op))
    }

    /// One operation per line, jump targets shown as indices.
    pub fn listing(&self) -> String {
        let mut out = String::new();
        for (index, op) in self.operations.iter().enumerate() {
            let _ = match op {
                Operation::Jump { kind, target } => match self.index_of(target) {
                    Some(target) => writeln!(out, "{:4}: {} {}", index, kind.mnemonic(), target),
                    None => writeln!(out, "{:4}: {} ?", index, kind.mnemonic()),
                },
                _ => writeln!(out, "{:4}: {}", index, op),
            };
        }
        out
    }
}

/// Mutable state of one method under construction: the operation list, the
/// local slot counter and the shared return target.
pub struct MethodBuilder<'a> {
    compiler: &'a Compiler<'a>,
    operations: Ops<'a>,
    params: u8,
    locals: u8,
    return_target: &'a Operation<'a>,
    sequence_points: Vec<SequencePoint>,
}

impl<'a> MethodBuilder<'a> {
    pub fn new(compiler: &'a Compiler<'a>, params: u8) -> Self {
        MethodBuilder {
            compiler,
            operations: Vec::new(),
            params,
            locals: 0,
            return_target: compiler.noop(),
            sequence_points: Vec::new(),
        }
    }

    pub fn compiler(&self) -> &'a Compiler<'a> {
        self.compiler
    }

    /// Landing site every `return` jumps to.
    pub fn return_target(&self) -> &'a Operation<'a> {
        self.return_target
    }

    pub fn emit(&mut self, op: &'a Operation<'a>) {
        self.operations.push(op);
    }

    pub fn extend(&mut self, ops: Ops<'a>) {
        self.operations.extend(ops);
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Records that the next operation starts the statement at `span`.
    pub fn sequence_point(&mut self, span: Span) {
        self.sequence_points.push(SequencePoint {
            index: self.operations.len(),
            span,
        });
    }

    /// Reserves the next local slot.
    pub fn add_local(&mut self, decl: &VariableDeclarator<'a>) -> Result<u8, CompileError> {
        let index = self.locals;
        self.locals = index
            .checked_add(1)
            .ok_or_else(|| CompileError::at(decl, ErrorKind::TooManySlots { what: "locals" }))?;
        Ok(index)
    }

    pub fn locals(&self) -> u8 {
        self.locals
    }

    /// Closes the method: return epilogue, plus the slot prologue when the
    /// frame needs any slot.
    fn finish(self) -> (Ops<'a>, Vec<SequencePoint>) {
        let c = self.compiler;
        let needs_slots = self.locals > 0 || self.params > 0;
        let mut operations = Vec::with_capacity(self.operations.len() + 3);
        if needs_slots {
            operations.push(c.op(Operation::InitSlot {
                locals: self.locals,
                params: self.params,
            }));
        }
        operations.extend(self.operations);
        operations.push(self.return_target);
        operations.push(c.op(Operation::Return));

        let shift = usize::from(needs_slots);
        let sequence_points = self
            .sequence_points
            .into_iter()
            .map(|point| SequencePoint {
                index: point.index + shift,
                span: point.span,
            })
            .collect();
        (operations, sequence_points)
    }
}

/// Lowers `decl` against `scope`.
///
/// Every independent error of the body is reported; any error fails the whole
/// method.
pub fn parse_contract_method<'a>(
    compiler: &'a Compiler<'a>,
    scope: &Rc<Scope<'a>>,
    decl: &'a FunctionDecl<'a>,
) -> Result<ContractMethod<'a>, Vec<CompileError>> {
    debug!(method = decl.name, params = decl.params.len(), "Assembling method");

    let params = u8::try_from(decl.params.len()).map_err(|_| {
        vec![CompileError::at(
            decl,
            ErrorKind::TooManySlots { what: "parameters" },
        )]
    })?;

    let body = match decl.body {
        Some(body) if matches!(body.kind, StmtKind::Block(_)) => body,
        Some(body) => {
            return Err(vec![CompileError::unsupported(
                body,
                "function body must be a block",
            )]);
        }
        None => {
            return Err(vec![CompileError::unsupported(
                decl,
                "function body must be a block",
            )]);
        }
    };

    let arguments = decl.params.iter().zip(0..params).map(|(param, index)| {
        CompileTimeObject::declared(
            param,
            param.symbol,
            vec![compiler.load(SlotKind::Argument, index)],
        )
        .with_store(vec![compiler.store(SlotKind::Argument, index)])
    });
    let method_scope = Scope::child(scope)
        .define_all(arguments)
        .map_err(|err| vec![err])?;

    let mut builder = MethodBuilder::new(compiler, params);
    let mut processor = StatementProcessor::new(&mut builder);
    let mut statement_scope = StatementScope::new(method_scope, true);
    let result = processor.process(&mut statement_scope, body);
    let mut errors = processor.finish();
    if let Err(err) = result {
        errors.push(err);
    }
    if !errors.is_empty() {
        debug!(method = decl.name, errors = errors.len(), "Method failed");
        return Err(errors);
    }

    let (operations, sequence_points) = builder.finish();
    debug!(method = decl.name, ops = operations.len(), "Method assembled");
    Ok(ContractMethod {
        name: decl.name,
        symbol: decl.symbol,
        safe: decl.has_tag("safe"),
        public: decl.exported,
        return_type: decl.return_type,
        parameters: decl
            .params
            .iter()
            .map(|param| MethodParameter {
                name: param.name,
                ty: param.ty,
            })
            .collect(),
        operations,
        sequence_points,
    })
}
