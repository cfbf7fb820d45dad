//! Statement lowering into a method under construction.

use tracing::trace;

use crate::compiler::expression::boolean_coercion;
use crate::compiler::method::MethodBuilder;
use crate::compiler::{CompileError, CompileTimeObject, ErrorKind, Reducer, Scope};
use crate::ops::{JumpKind, Operation, SlotKind};
use crate::syntax::{Expr, Stmt, StmtKind, VariableDeclarator, VariableKind};
use crate::{Rc, ToString, Vec, vec};

/// The scope statements are processed against.
///
/// Variable statements replace `scope` with an extended copy, which is only
/// allowed where new bindings are visible to the following statements: in a
/// block, not in the bare body of an `if` or a loop.
#[derive(Debug, Clone)]
pub struct StatementScope<'a> {
    pub scope: Rc<Scope<'a>>,
    pub extensible: bool,
}

impl<'a> StatementScope<'a> {
    pub fn new(scope: Rc<Scope<'a>>, extensible: bool) -> Self {
        StatementScope { scope, extensible }
    }

    fn reducer(&self, builder: &MethodBuilder<'a>) -> Reducer<'a> {
        Reducer::new(builder.compiler(), &self.scope)
    }
}

/// Appends statements to a [`MethodBuilder`], collecting the errors of
/// statements that fail inside blocks.
pub struct StatementProcessor<'m, 'a> {
    builder: &'m mut MethodBuilder<'a>,
    errors: Vec<CompileError>,
}

impl<'m, 'a> StatementProcessor<'m, 'a> {
    pub fn new(builder: &'m mut MethodBuilder<'a>) -> Self {
        StatementProcessor {
            builder,
            errors: Vec::new(),
        }
    }

    /// The errors recorded while processing blocks.
    pub fn finish(self) -> Vec<CompileError> {
        self.errors
    }

    pub fn process(
        &mut self,
        scope: &mut StatementScope<'a>,
        stmt: &'a Stmt<'a>,
    ) -> Result<(), CompileError> {
        trace!(node = %stmt.id, kind = stmt.kind.describe(), "Processing statement");
        let c = self.builder.compiler();
        let _guard = c.enter(stmt)?;
        if !matches!(stmt.kind, StmtKind::Block(_)) {
            self.builder.sequence_point(stmt.span);
        }

        match &stmt.kind {
            StmtKind::Block(statements) => {
                let mut inner = StatementScope::new(Scope::child(&scope.scope), true);
                for statement in statements.iter() {
                    if let Err(err) = self.process(&mut inner, statement) {
                        self.errors.push(err);
                    }
                }
            }
            StmtKind::Variable { kind, declarations } => {
                for decl in declarations.iter() {
                    self.declare(scope, *kind, decl)?;
                }
            }
            StmtKind::Return(value) => {
                if let Some(value) = value {
                    let ops = scope.reducer(self.builder).parse(value)?;
                    self.builder.extend(ops);
                }
                let target = self.builder.return_target();
                self.builder.emit(c.jump(JumpKind::Always, target));
            }
            StmtKind::Expression(expr) => {
                let mut ops = scope.reducer(self.builder).parse(expr)?;
                if !expr.ty.is_void_like() {
                    ops.push(c.op(Operation::Drop));
                }
                self.builder.extend(ops);
            }
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let else_target = c.noop();
                self.condition(scope, condition, else_target)?;
                self.branch(scope, then_branch)?;
                match else_branch {
                    Some(else_branch) => {
                        let end = c.noop();
                        self.builder.emit(c.jump(JumpKind::Always, end));
                        self.builder.emit(else_target);
                        self.branch(scope, else_branch)?;
                        self.builder.emit(end);
                    }
                    None => self.builder.emit(else_target),
                }
            }
            StmtKind::While { condition, body } => {
                let start = c.noop();
                let end = c.noop();
                self.builder.emit(start);
                self.condition(scope, condition, end)?;
                self.branch(scope, body)?;
                self.builder.emit(c.jump(JumpKind::Always, start));
                self.builder.emit(end);
            }
            StmtKind::Throw(value) => {
                let mut ops = scope.reducer(self.builder).parse(value)?;
                ops.push(c.op(Operation::Throw));
                self.builder.extend(ops);
            }
            StmtKind::Empty => {}
            StmtKind::Unsupported(kind) => {
                return Err(CompileError::unsupported(stmt, kind));
            }
        }
        Ok(())
    }

    /// One declarator: a fresh local slot, the initializer (reduced before the
    /// new name is visible) and the binding itself.
    fn declare(
        &mut self,
        scope: &mut StatementScope<'a>,
        kind: VariableKind,
        decl: &'a VariableDeclarator<'a>,
    ) -> Result<(), CompileError> {
        if !scope.extensible {
            return Err(CompileError::at(
                decl,
                ErrorKind::ImmutableScope {
                    name: decl.name.to_string(),
                },
            ));
        }
        let c = self.builder.compiler();
        let index = self.builder.add_local(decl)?;

        let mut object =
            CompileTimeObject::declared(decl, decl.symbol, vec![c.load(SlotKind::Local, index)]);
        if kind != VariableKind::Const {
            object = object.with_store(vec![c.store(SlotKind::Local, index)]);
        }

        // Bound even when the initializer fails.
        let init = match decl.init {
            Some(init) => scope.reducer(self.builder).parse(init).map(Some),
            None => Ok(None),
        };
        scope.scope = scope.scope.define(object)?;
        if let Some(mut ops) = init? {
            ops.push(c.store(SlotKind::Local, index));
            self.builder.extend(ops);
        }
        Ok(())
    }

    /// `condition ++ coerce ++ [jumpifnot -> otherwise]`
    fn condition(
        &mut self,
        scope: &StatementScope<'a>,
        condition: &'a Expr<'a>,
        otherwise: &'a Operation<'a>,
    ) -> Result<(), CompileError> {
        let c = self.builder.compiler();
        let mut ops = scope.reducer(self.builder).parse(condition)?;
        ops.extend(boolean_coercion(c, condition.ty));
        ops.push(c.jump(JumpKind::IfNot, otherwise));
        self.builder.extend(ops);
        Ok(())
    }

    /// The body of an `if` or `while`. Blocks open their own scope; any other
    /// statement cannot introduce bindings.
    fn branch(
        &mut self,
        scope: &StatementScope<'a>,
        stmt: &'a Stmt<'a>,
    ) -> Result<(), CompileError> {
        let mut scope = StatementScope::new(Rc::clone(&scope.scope), false);
        self.process(&mut scope, stmt)
    }
}
