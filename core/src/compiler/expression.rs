//! Expression reduction.
//!
//! An expression is flattened into a chain: the innermost non-chaining node
//! (the head) followed by the call, property, element and wrapper nodes
//! applied to it, innermost first. The head becomes an [`ExpressionContext`];
//! each tail step turns the previous context into a new one. Operations are
//! produced only when a context's `get_ops`/`get_store_ops` is invoked.
//!
//! Optional links (`?.`) in a chain all jump to one shared end placeholder,
//! which is appended once the whole chain has been emitted.

use num_bigint::BigInt;
use num_traits::{FromPrimitive, ToPrimitive};
use tracing::trace;

use crate::compiler::object::{GetOps, GetStoreOps, producer, store_producer};
use crate::compiler::{
    CompileError, CompileTimeObject, CompileTimeType, Compiler, ErrorKind, Invocation, Scope,
};
use crate::ops::{CallFlags, JumpKind, MethodToken, Operation, Ops, StackItemType};
use crate::syntax::{
    BinaryOp, Expr, ExprKind, Ident, ObjectMemberKind, PostfixOp, PrefixOp, Type,
};
use crate::{Rc, String, ToString, Vec, format, vec};

/// The reduced form of one (sub)expression.
#[derive(Clone)]
pub struct ExpressionContext<'a> {
    pub node: &'a Expr<'a>,
    pub ty: &'a Type<'a>,
    /// What the expression denotes, when that is more than a value.
    pub cto: Option<Rc<CompileTimeObject<'a>>>,
    pub get_ops: GetOps<'a>,
    pub get_store_ops: GetStoreOps<'a>,
    /// Shared landing site of the chain's optional links.
    pub end_target: &'a Operation<'a>,
}

/// Reduces expressions against one scope.
///
/// Cheap to clone; resolver closures keep their own copy.
#[derive(Clone)]
pub struct Reducer<'a> {
    compiler: &'a Compiler<'a>,
    scope: Rc<Scope<'a>>,
}

impl<'a> Reducer<'a> {
    pub fn new(compiler: &'a Compiler<'a>, scope: &Rc<Scope<'a>>) -> Self {
        Reducer {
            compiler,
            scope: Rc::clone(scope),
        }
    }

    pub fn compiler(&self) -> &'a Compiler<'a> {
        self.compiler
    }

    pub fn scope(&self) -> &Rc<Scope<'a>> {
        &self.scope
    }

    /// Load operations of `node`.
    pub fn parse(&self, node: &'a Expr<'a>) -> Result<Ops<'a>, CompileError> {
        let context = self.reduce(node)?;
        (context.get_ops)()
    }

    /// Operations storing `value` into `node`.
    pub fn parse_store(
        &self,
        node: &'a Expr<'a>,
        value: Ops<'a>,
    ) -> Result<Ops<'a>, CompileError> {
        let context = self.reduce(node)?;
        (context.get_store_ops)(value)
    }

    /// Reduces `node` to a context without generating any operations for it
    /// yet (resolving calls and properties may generate operations of
    /// subexpressions).
    pub fn reduce(&self, node: &'a Expr<'a>) -> Result<ExpressionContext<'a>, CompileError> {
        let _guard = self.compiler.enter(node)?;
        let chain = chain_of(node);
        trace!(node = %node.id, links = chain.len(), "Reducing expression");

        let end_target = self.compiler.noop();
        let (head, tails) = chain
            .split_first()
            .ok_or_else(|| CompileError::unsupported(node, "empty expression"))?;
        let mut context = self.reduce_head(head, end_target)?;
        for tail in tails {
            context = self.reduce_tail(context, tail)?;
        }
        Ok(self.finish_chain(context))
    }

    /// Wraps the outermost `get_ops` so the end placeholder lands after the
    /// chain, and only if some optional link jumps to it.
    fn finish_chain(&self, context: ExpressionContext<'a>) -> ExpressionContext<'a> {
        let compiler = self.compiler;
        let node = context.node;
        let end_target = context.end_target;
        let inner = context.get_ops;
        let get_ops = producer(move || {
            let _guard = compiler.enter(node)?;
            let mut ops = inner()?;
            if ops.iter().any(|op| op.targets(end_target)) {
                ops.push(end_target);
            }
            Ok(ops)
        });
        ExpressionContext { get_ops, ..context }
    }

    // ========================================================================
    // Heads
    // ========================================================================

    fn reduce_head(
        &self,
        node: &'a Expr<'a>,
        end_target: &'a Operation<'a>,
    ) -> Result<ExpressionContext<'a>, CompileError> {
        let get_ops: GetOps<'a> = match &node.kind {
            ExprKind::Number(value) => {
                let value = integral(*value)
                    .ok_or_else(|| invalid_literal(node, format!("{} is not an integer", value)))?;
                self.value_ops(move |c| Ok(vec![c.push_int(value.clone())]))
            }
            ExprKind::BigInt(digits) => {
                let value = parse_bigint(digits).ok_or_else(|| {
                    invalid_literal(node, format!("malformed bigint '{}'", digits))
                })?;
                self.value_ops(move |c| Ok(vec![c.push_int(value.clone())]))
            }
            ExprKind::String(text) => {
                let text: &'a str = text;
                self.value_ops(move |c| Ok(vec![c.push_str(text)]))
            }
            ExprKind::Boolean(value) => {
                let value = *value;
                self.value_ops(move |c| Ok(vec![c.push_bool(value)]))
            }
            ExprKind::Null => self.value_ops(|c| Ok(vec![c.op(Operation::PushNull)])),
            ExprKind::Identifier(ident) => return self.reduce_identifier(node, ident, end_target),
            ExprKind::Array(elements) => {
                let elements: &'a [&'a Expr<'a>] = elements;
                let r = self.clone();
                producer(move || {
                    let mut ops = Vec::new();
                    for element in elements {
                        ops.extend(r.parse(element)?);
                    }
                    ops.push(r.compiler.push_int(elements.len()));
                    ops.push(r.compiler.op(Operation::PackArray));
                    Ok(ops)
                })
            }
            ExprKind::Object(members) => {
                let members = *members;
                let r = self.clone();
                producer(move || {
                    let mut ops = Vec::new();
                    for member in members {
                        match &member.kind {
                            ObjectMemberKind::Value(value) => ops.extend(r.parse(value)?),
                            ObjectMemberKind::Shorthand => {
                                let object = r.scope.resolve_name(member.name).ok_or_else(|| {
                                    CompileError::at(
                                        member,
                                        ErrorKind::UnresolvedSymbol {
                                            name: member.name.to_string(),
                                        },
                                    )
                                })?;
                                ops.extend(object.load_ops.iter().copied());
                            }
                            ObjectMemberKind::Unsupported(kind) => {
                                return Err(CompileError::unsupported(member, kind));
                            }
                        }
                        ops.push(r.compiler.push_str(member.name));
                    }
                    ops.push(r.compiler.push_int(members.len()));
                    ops.push(r.compiler.op(Operation::PackMap));
                    Ok(ops)
                })
            }
            ExprKind::Conditional {
                condition,
                when_true,
                when_false,
            } => {
                let (condition, when_true, when_false) = (*condition, *when_true, *when_false);
                let r = self.clone();
                producer(move || {
                    let c = r.compiler;
                    let else_target = c.noop();
                    let end = c.noop();
                    let mut ops = r.parse(condition)?;
                    ops.extend(boolean_coercion(c, condition.ty));
                    ops.push(c.jump(JumpKind::IfNot, else_target));
                    ops.extend(r.parse(when_true)?);
                    ops.push(c.jump(JumpKind::Always, end));
                    ops.push(else_target);
                    ops.extend(r.parse(when_false)?);
                    ops.push(end);
                    Ok(ops)
                })
            }
            ExprKind::Binary { op, left, right } => {
                return self.reduce_binary(node, *op, left, right, end_target);
            }
            ExprKind::Prefix { op, operand } => {
                return self.reduce_prefix(node, *op, operand, end_target);
            }
            ExprKind::Postfix { op, operand } => {
                return self.reduce_postfix(node, *op, operand, end_target);
            }
            ExprKind::This | ExprKind::Unsupported(_) => {
                return Err(CompileError::unsupported(node, node.kind.describe()));
            }
            // Chaining kinds only reach here when the chain builder let them
            // through, which it never does.
            ExprKind::Call { .. }
            | ExprKind::New { .. }
            | ExprKind::Property { .. }
            | ExprKind::Element { .. }
            | ExprKind::Parenthesized(_)
            | ExprKind::NonNull(_)
            | ExprKind::TypeAssertion(_) => {
                return Err(CompileError::unsupported(node, node.kind.describe()));
            }
        };
        Ok(self.value_context(node, get_ops, end_target))
    }

    /// A producer for operations that only depend on the session.
    fn value_ops(
        &self,
        make: impl Fn(&'a Compiler<'a>) -> Result<Ops<'a>, CompileError> + 'a,
    ) -> GetOps<'a> {
        let compiler = self.compiler;
        producer(move || make(compiler))
    }

    /// A context that can be loaded but never stored to.
    fn value_context(
        &self,
        node: &'a Expr<'a>,
        get_ops: GetOps<'a>,
        end_target: &'a Operation<'a>,
    ) -> ExpressionContext<'a> {
        let what = node.kind.describe();
        ExpressionContext {
            node,
            ty: node.ty,
            cto: None,
            get_ops,
            get_store_ops: store_producer(move |_| Err(CompileError::not_assignable(node, what))),
            end_target,
        }
    }

    fn reduce_identifier(
        &self,
        node: &'a Expr<'a>,
        ident: &Ident<'a>,
        end_target: &'a Operation<'a>,
    ) -> Result<ExpressionContext<'a>, CompileError> {
        if ident.symbol.is_none() && ident.name == "undefined" && node.ty.is_undefined() {
            let get_ops = self.value_ops(|c| Ok(vec![c.op(Operation::PushNull)]));
            return Ok(self.value_context(node, get_ops, end_target));
        }

        let object = ident
            .symbol
            .and_then(|symbol| self.scope.resolve(symbol))
            .cloned()
            .ok_or_else(|| {
                CompileError::at(
                    node,
                    ErrorKind::UnresolvedSymbol {
                        name: ident.name.to_string(),
                    },
                )
            })?;

        let load = Rc::clone(&object);
        let store = Rc::clone(&object);
        let name = ident.name;
        Ok(ExpressionContext {
            node,
            ty: node.ty,
            cto: Some(object),
            get_ops: producer(move || Ok(load.load_ops.clone())),
            get_store_ops: store_producer(move |mut value| match &store.store_ops {
                Some(store_ops) => {
                    value.extend(store_ops.iter().copied());
                    Ok(value)
                }
                None => Err(CompileError::not_assignable(node, &format!("'{}'", name))),
            }),
            end_target,
        })
    }

    // ========================================================================
    // Operators
    // ========================================================================

    fn reduce_binary(
        &self,
        node: &'a Expr<'a>,
        op: BinaryOp,
        left: &'a Expr<'a>,
        right: &'a Expr<'a>,
        end_target: &'a Operation<'a>,
    ) -> Result<ExpressionContext<'a>, CompileError> {
        let r = self.clone();
        let get_ops: GetOps<'a> = if op == BinaryOp::Assign {
            let target = self.reduce(left)?;
            producer(move || {
                let mut value = r.parse(right)?;
                value.push(r.compiler.op(Operation::Duplicate));
                (target.get_store_ops)(value)
            })
        } else if let Some(base) = op.compound_base() {
            let target = self.reduce(left)?;
            producer(move || {
                let mut value = r.binary_ops(node, base, left, right)?;
                value.push(r.compiler.op(Operation::Duplicate));
                (target.get_store_ops)(value)
            })
        } else {
            producer(move || r.binary_ops(node, op, left, right))
        };
        Ok(self.value_context(node, get_ops, end_target))
    }

    fn binary_ops(
        &self,
        node: &'a Expr<'a>,
        op: BinaryOp,
        left: &'a Expr<'a>,
        right: &'a Expr<'a>,
    ) -> Result<Ops<'a>, CompileError> {
        let c = self.compiler;
        let simple = match op {
            BinaryOp::Add if left.ty.is_string_like() || right.ty.is_string_like() => {
                let mut ops = self.parse(left)?;
                ops.extend(self.string_coercion(left)?);
                ops.extend(self.parse(right)?);
                ops.extend(self.string_coercion(right)?);
                ops.push(c.op(Operation::Concat));
                return Ok(ops);
            }
            BinaryOp::Add => Operation::Add,
            BinaryOp::Sub => Operation::Subtract,
            BinaryOp::Mul => Operation::Multiply,
            BinaryOp::Div => Operation::Divide,
            BinaryOp::Rem => Operation::Modulo,
            BinaryOp::Exp => Operation::Power,
            BinaryOp::Shl => Operation::ShiftLeft,
            BinaryOp::Shr => Operation::ShiftRight,
            BinaryOp::BitAnd => Operation::And,
            BinaryOp::BitOr => Operation::Or,
            BinaryOp::BitXor => Operation::Xor,
            BinaryOp::Eq | BinaryOp::StrictEq => Operation::Equal,
            BinaryOp::NotEq | BinaryOp::StrictNotEq => Operation::NotEqual,
            BinaryOp::Lt => Operation::LessThan,
            BinaryOp::Le => Operation::LessThanOrEqual,
            BinaryOp::Gt => Operation::GreaterThan,
            BinaryOp::Ge => Operation::GreaterThanOrEqual,
            BinaryOp::In => {
                let mut ops = self.parse(right)?;
                ops.extend(self.parse(left)?);
                ops.push(c.op(Operation::HasKey));
                return Ok(ops);
            }
            BinaryOp::Coalesce => {
                let end = c.noop();
                let mut ops = self.parse(left)?;
                ops.push(c.op(Operation::Duplicate));
                ops.push(c.op(Operation::IsNull));
                ops.push(c.jump(JumpKind::IfNot, end));
                ops.push(c.op(Operation::Drop));
                ops.extend(self.parse(right)?);
                ops.push(end);
                return Ok(ops);
            }
            BinaryOp::And | BinaryOp::Or => return self.logical_ops(op, left, right),
            BinaryOp::Comma => {
                let mut ops = self.parse(left)?;
                if !left.ty.is_void_like() {
                    ops.push(c.op(Operation::Drop));
                }
                ops.extend(self.parse(right)?);
                return Ok(ops);
            }
            _ => {
                return Err(CompileError::at(
                    node,
                    ErrorKind::InvalidOperator {
                        op: op.as_str().to_string(),
                    },
                ));
            }
        };
        let mut ops = self.parse(left)?;
        ops.extend(self.parse(right)?);
        ops.push(c.op(simple));
        Ok(ops)
    }

    /// `&&` and `||`: the right operand only runs when the left one does not
    /// decide the result.
    fn logical_ops(
        &self,
        op: BinaryOp,
        left: &'a Expr<'a>,
        right: &'a Expr<'a>,
    ) -> Result<Ops<'a>, CompileError> {
        let c = self.compiler;
        let (evaluate_right, shortcut) = match op {
            BinaryOp::Or => (JumpKind::IfNot, true),
            _ => (JumpKind::If, false),
        };
        let right_target = c.noop();
        let end = c.noop();
        let mut ops = self.parse(left)?;
        ops.extend(boolean_coercion(c, left.ty));
        ops.push(c.jump(evaluate_right, right_target));
        ops.push(c.push_bool(shortcut));
        ops.push(c.jump(JumpKind::Always, end));
        ops.push(right_target);
        ops.extend(self.parse(right)?);
        ops.extend(boolean_coercion(c, right.ty));
        ops.push(end);
        Ok(ops)
    }

    fn reduce_prefix(
        &self,
        node: &'a Expr<'a>,
        op: PrefixOp,
        operand: &'a Expr<'a>,
        end_target: &'a Operation<'a>,
    ) -> Result<ExpressionContext<'a>, CompileError> {
        let r = self.clone();
        let get_ops: GetOps<'a> = match op {
            PrefixOp::Increment | PrefixOp::Decrement => {
                let step = if op == PrefixOp::Increment {
                    Operation::Increment
                } else {
                    Operation::Decrement
                };
                return self.reduce_update(node, operand, step, false, end_target);
            }
            PrefixOp::Plus | PrefixOp::Minus | PrefixOp::BitNot => {
                let tail = match op {
                    PrefixOp::Minus => Some(Operation::Negate),
                    PrefixOp::BitNot => Some(Operation::Invert),
                    _ => None,
                };
                producer(move || {
                    let mut ops = r.parse(operand)?;
                    ops.extend(numeric_coercion(r.compiler, operand)?);
                    ops.extend(tail.map(|op| r.compiler.op(op)));
                    Ok(ops)
                })
            }
            PrefixOp::Not => producer(move || {
                let mut ops = r.parse(operand)?;
                ops.extend(boolean_coercion(r.compiler, operand.ty));
                ops.push(r.compiler.op(Operation::Not));
                Ok(ops)
            }),
            PrefixOp::TypeOf | PrefixOp::Void | PrefixOp::Delete => {
                return Err(CompileError::at(
                    node,
                    ErrorKind::InvalidOperator {
                        op: op.as_str().to_string(),
                    },
                ));
            }
        };
        Ok(self.value_context(node, get_ops, end_target))
    }

    fn reduce_postfix(
        &self,
        node: &'a Expr<'a>,
        op: PostfixOp,
        operand: &'a Expr<'a>,
        end_target: &'a Operation<'a>,
    ) -> Result<ExpressionContext<'a>, CompileError> {
        let step = match op {
            PostfixOp::Increment => Operation::Increment,
            PostfixOp::Decrement => Operation::Decrement,
        };
        self.reduce_update(node, operand, step, true, end_target)
    }

    /// `++`/`--`: load the target, keep the old (postfix) or new (prefix)
    /// value on the stack and store the new one.
    fn reduce_update(
        &self,
        node: &'a Expr<'a>,
        operand: &'a Expr<'a>,
        step: Operation<'a>,
        postfix: bool,
        end_target: &'a Operation<'a>,
    ) -> Result<ExpressionContext<'a>, CompileError> {
        if !operand.ty.is_integer_like() {
            return Err(invalid_type(operand, "numeric"));
        }
        let target = self.reduce(operand)?;
        let c = self.compiler;
        let get_ops = producer(move || {
            let mut value = (target.get_ops)()?;
            if postfix {
                value.push(c.op(Operation::Duplicate));
                value.push(c.op(step));
            } else {
                value.push(c.op(step));
                value.push(c.op(Operation::Duplicate));
            }
            (target.get_store_ops)(value)
        });
        Ok(self.value_context(node, get_ops, end_target))
    }

    /// Converts the value of `node` for string concatenation.
    fn string_coercion(&self, node: &'a Expr<'a>) -> Result<Ops<'a>, CompileError> {
        let c = self.compiler;
        let ty = node.ty;
        if ty.is_string_like() {
            Ok(Vec::new())
        } else if ty.is_boolean_like() {
            let when_false = c.noop();
            let end = c.noop();
            Ok(vec![
                c.jump(JumpKind::IfNot, when_false),
                c.push_str("true"),
                c.jump(JumpKind::Always, end),
                when_false,
                c.push_str("false"),
                end,
            ])
        } else if ty.is_integer_like() {
            let token = c.arena().alloc(MethodToken {
                hash: c.options().stdlib_hash,
                method: "itoa",
                params: 1,
                has_return: true,
                call_flags: CallFlags::NONE,
            });
            Ok(vec![c.op(Operation::CallToken(token))])
        } else {
            Err(invalid_type(node, "string, boolean or numeric"))
        }
    }

    // ========================================================================
    // Tails
    // ========================================================================

    fn reduce_tail(
        &self,
        previous: ExpressionContext<'a>,
        node: &'a Expr<'a>,
    ) -> Result<ExpressionContext<'a>, CompileError> {
        match &node.kind {
            ExprKind::Call { args, .. } => self.reduce_invocation(previous, node, args, false),
            ExprKind::New { args, .. } => self.reduce_invocation(previous, node, args, true),
            ExprKind::Property { name, optional, .. } => {
                self.reduce_property(previous, node, name, *optional)
            }
            ExprKind::Element {
                index, optional, ..
            } => Ok(self.reduce_element(previous, node, index, *optional)),
            ExprKind::Parenthesized(_) | ExprKind::NonNull(_) | ExprKind::TypeAssertion(_) => {
                Ok(ExpressionContext {
                    node,
                    ty: node.ty,
                    ..previous
                })
            }
            _ => Err(CompileError::unsupported(node, node.kind.describe())),
        }
    }

    /// Type-level capabilities of `ty`. For nullable unions the first
    /// non-null member with registered capabilities is used.
    fn type_of(&self, ty: &'a Type<'a>) -> Option<Rc<CompileTimeType<'a>>> {
        if let Some(ctt) = self.scope.resolve_type(ty) {
            return Some(Rc::clone(ctt));
        }
        match ty {
            Type::Union(members) => members
                .iter()
                .filter(|member| !matches!(member, Type::Null | Type::Undefined))
                .find_map(|member| self.scope.resolve_type(member).cloned()),
            _ => None,
        }
    }

    fn reduce_invocation(
        &self,
        previous: ExpressionContext<'a>,
        node: &'a Expr<'a>,
        args: &'a [&'a Expr<'a>],
        construct: bool,
    ) -> Result<ExpressionContext<'a>, CompileError> {
        let from_object = previous.cto.as_ref().and_then(|cto| {
            if construct {
                cto.call_new.clone()
            } else {
                cto.call.clone()
            }
        });
        let invoker = from_object
            .or_else(|| {
                let ctt = self.type_of(previous.ty)?;
                if construct {
                    ctt.call_new.clone()
                } else {
                    ctt.call.clone()
                }
            })
            .ok_or_else(|| {
                let kind = if construct {
                    ErrorKind::NotConstructable
                } else {
                    ErrorKind::NotCallable
                };
                CompileError::at(node, kind)
            })?;

        let args = args
            .iter()
            .map(|arg| self.reduce(arg).map(|context| context.get_ops))
            .collect::<Result<Vec<_>, _>>()?;
        let result = invoker(&Invocation {
            node,
            this: &previous.get_ops,
            args: &args,
        })
        .map_err(|err| err.or_at(node))?;

        let load_ops = result.load_ops.clone();
        Ok(ExpressionContext {
            node,
            ty: node.ty,
            cto: Some(Rc::new(result)),
            get_ops: producer(move || Ok(load_ops.clone())),
            get_store_ops: store_producer(move |_| {
                Err(CompileError::not_assignable(node, "call result"))
            }),
            end_target: previous.end_target,
        })
    }

    fn reduce_property(
        &self,
        previous: ExpressionContext<'a>,
        node: &'a Expr<'a>,
        name: &Ident<'a>,
        optional: bool,
    ) -> Result<ExpressionContext<'a>, CompileError> {
        let unresolved = || {
            CompileError::at(
                node,
                ErrorKind::UnresolvedProperty {
                    name: name.name.to_string(),
                },
            )
        };
        let symbol = name.symbol.ok_or_else(unresolved)?;
        let resolver = previous
            .cto
            .as_ref()
            .and_then(|cto| cto.properties.as_ref())
            .and_then(|properties| properties.get(&symbol).cloned())
            .or_else(|| {
                self.type_of(previous.ty)
                    .and_then(|ctt| ctt.properties.get(&symbol).cloned())
            })
            .ok_or_else(unresolved)?;

        let property = resolver(&previous.get_ops).map_err(|err| err.or_at(node))?;
        let c = self.compiler;
        let end_target = previous.end_target;
        let load_ops = property.load_ops.clone();
        let store_ops = property.store_ops.clone();
        let what: String = format!("property '{}'", name.name);
        Ok(ExpressionContext {
            node,
            ty: node.ty,
            cto: Some(Rc::new(property)),
            get_ops: producer(move || {
                let mut ops = load_ops.clone();
                if optional {
                    ops.extend(optional_link(c, end_target));
                }
                Ok(ops)
            }),
            get_store_ops: store_producer(move |mut value| match &store_ops {
                Some(store_ops) => {
                    value.extend(store_ops.iter().copied());
                    Ok(value)
                }
                None => Err(CompileError::not_assignable(node, &what)),
            }),
            end_target,
        })
    }

    fn reduce_element(
        &self,
        previous: ExpressionContext<'a>,
        node: &'a Expr<'a>,
        index: &'a Expr<'a>,
        optional: bool,
    ) -> ExpressionContext<'a> {
        let c = self.compiler;
        let end_target = previous.end_target;
        let load_object = Rc::clone(&previous.get_ops);
        let store_object = previous.get_ops;
        let load = self.clone();
        let store = self.clone();
        ExpressionContext {
            node,
            ty: node.ty,
            cto: None,
            get_ops: producer(move || {
                let mut ops = load_object()?;
                ops.extend(load.parse(index)?);
                ops.push(c.op(Operation::PickItem));
                if optional {
                    ops.extend(optional_link(c, end_target));
                }
                Ok(ops)
            }),
            // value, object, key -> object, key, value for SETITEM.
            get_store_ops: store_producer(move |mut value| {
                value.extend(store_object()?);
                value.extend(store.parse(index)?);
                value.push(c.op(Operation::Rot));
                value.push(c.op(Operation::SetItem));
                Ok(value)
            }),
            end_target,
        }
    }
}

/// Flattens the chaining nodes around `node`, innermost first.
fn chain_of<'a>(node: &'a Expr<'a>) -> Vec<&'a Expr<'a>> {
    let mut chain = vec![node];
    let mut current = node;
    loop {
        current = match &current.kind {
            ExprKind::Call { callee, .. } | ExprKind::New { callee, .. } => *callee,
            ExprKind::Property { object, .. } | ExprKind::Element { object, .. } => *object,
            ExprKind::Parenthesized(inner)
            | ExprKind::NonNull(inner)
            | ExprKind::TypeAssertion(inner) => *inner,
            _ => break,
        };
        chain.push(current);
    }
    chain.reverse();
    chain
}

/// `[dup, isnull, jumpif end]`: leave the null on the stack and skip the
/// rest of the chain.
fn optional_link<'a>(c: &'a Compiler<'a>, end_target: &'a Operation<'a>) -> [&'a Operation<'a>; 3] {
    [
        c.op(Operation::Duplicate),
        c.op(Operation::IsNull),
        c.jump(JumpKind::If, end_target),
    ]
}

/// Operations turning a value of type `ty` into a boolean.
pub fn boolean_coercion<'a>(c: &'a Compiler<'a>, ty: &Type<'a>) -> Ops<'a> {
    if ty.is_boolean_like() {
        Vec::new()
    } else if ty.is_integer_like() {
        vec![c.push_int(0), c.op(Operation::NotEqual)]
    } else if ty.is_string_like() {
        vec![
            c.op(Operation::Size),
            c.push_int(0),
            c.op(Operation::NotEqual),
        ]
    } else {
        vec![c.op(Operation::IsNull), c.op(Operation::Not)]
    }
}

/// Operations turning the value of `node` into an integer.
pub fn numeric_coercion<'a>(
    c: &'a Compiler<'a>,
    node: &'a Expr<'a>,
) -> Result<Ops<'a>, CompileError> {
    if node.ty.is_integer_like() {
        Ok(Vec::new())
    } else if node.ty.is_boolean_like() {
        Ok(vec![c.op(Operation::Convert(StackItemType::Integer))])
    } else {
        Err(invalid_type(node, "numeric"))
    }
}

/// The integer a numeric literal denotes, if it is integral.
fn integral(value: f64) -> Option<BigInt> {
    let integer = BigInt::from_f64(value)?;
    (integer.to_f64() == Some(value)).then_some(integer)
}

/// Parses bigint literal digits (`123`, `0xff`, `0o17`, `0b101`, `1_000`).
fn parse_bigint(digits: &str) -> Option<BigInt> {
    let digits: String = digits.chars().filter(|ch| *ch != '_').collect();
    let digits = digits.strip_suffix('n').unwrap_or(&digits);
    let (radix, body) = match digits.get(..2) {
        Some("0x") | Some("0X") => (16, &digits[2..]),
        Some("0o") | Some("0O") => (8, &digits[2..]),
        Some("0b") | Some("0B") => (2, &digits[2..]),
        _ => (10, digits),
    };
    if body.is_empty() {
        return None;
    }
    BigInt::parse_bytes(body.as_bytes(), radix)
}

fn invalid_literal(node: &Expr<'_>, reason: String) -> CompileError {
    CompileError::at(node, ErrorKind::InvalidLiteral { reason })
}

fn invalid_type(node: &Expr<'_>, expected: &str) -> CompileError {
    CompileError::at(
        node,
        ErrorKind::InvalidType {
            expected: expected.to_string(),
            found: node.ty.to_string(),
        },
    )
}
