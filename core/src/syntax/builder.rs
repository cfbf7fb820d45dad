//! Arena-backed construction of typed trees.
//!
//! `AstBuilder` stands in for the type checker: it hands out node ids,
//! symbols and spans and interns types, so hosts and tests can assemble the
//! exact tree a checker would have produced.

use bumpalo::Bump;
use core::cell::Cell;

use crate::Vec;
use crate::syntax::{
    BinaryOp, Declaration, DocTag, Expr, ExprKind, FunctionDecl, Ident, InterfaceDecl,
    MemberDecl, MemberKind, NodeId, ObjectMember, ObjectMemberKind, Parameter, PostfixOp,
    PrefixOp, SourceUnit, Span, Stmt, StmtKind, Symbol, Type, TypeManager, VariableDecl,
    VariableDeclarator, VariableKind,
};

pub struct AstBuilder<'a> {
    arena: &'a Bump,
    types: &'a TypeManager<'a>,
    next_node: Cell<u32>,
    next_symbol: Cell<u32>,
    pending_span: Cell<Option<Span>>,
}

impl<'a> AstBuilder<'a> {
    pub fn new(arena: &'a Bump) -> Self {
        AstBuilder {
            arena,
            types: TypeManager::new(arena),
            next_node: Cell::new(0),
            next_symbol: Cell::new(0),
            pending_span: Cell::new(None),
        }
    }

    pub fn arena(&self) -> &'a Bump {
        self.arena
    }

    pub fn types(&self) -> &'a TypeManager<'a> {
        self.types
    }

    /// Use `span` for the next node created instead of a synthetic one.
    pub fn at(&self, span: Span) -> &Self {
        self.pending_span.set(Some(span));
        self
    }

    fn next_id(&self) -> (NodeId, Span) {
        let id = self.next_node.get();
        self.next_node.set(id + 1);
        let span = self
            .pending_span
            .take()
            .unwrap_or_else(|| Span::new(id as usize, id as usize + 1));
        (NodeId(id), span)
    }

    /// A fresh declaration symbol.
    pub fn symbol(&self, name: &str) -> Symbol<'a> {
        let id = self.next_symbol.get();
        self.next_symbol.set(id + 1);
        Symbol::new(id, self.types.intern_str(name))
    }

    fn expr(&self, ty: &'a Type<'a>, kind: ExprKind<'a>) -> &'a Expr<'a> {
        let (id, span) = self.next_id();
        self.arena.alloc(Expr { id, span, ty, kind })
    }

    fn exprs(&self, exprs: &[&'a Expr<'a>]) -> &'a [&'a Expr<'a>] {
        self.arena.alloc_slice_copy(exprs)
    }

    fn tags(&self, tags: &[(&str, &str)]) -> &'a [DocTag<'a>] {
        let tags: Vec<DocTag<'a>> = tags
            .iter()
            .map(|(name, text)| DocTag {
                name: self.types.intern_str(name),
                text: self.types.intern_str(text),
            })
            .collect();
        self.arena.alloc_slice_copy(&tags)
    }

    // === Expressions ===

    pub fn number(&self, value: f64) -> &'a Expr<'a> {
        self.expr(self.types.number(), ExprKind::Number(value))
    }

    pub fn bigint(&self, digits: &str) -> &'a Expr<'a> {
        let digits = self.arena.alloc_str(digits);
        self.expr(self.types.bigint(), ExprKind::BigInt(digits))
    }

    pub fn string(&self, value: &str) -> &'a Expr<'a> {
        let value = self.arena.alloc_str(value);
        self.expr(self.types.string(), ExprKind::String(value))
    }

    pub fn boolean(&self, value: bool) -> &'a Expr<'a> {
        self.expr(self.types.boolean(), ExprKind::Boolean(value))
    }

    pub fn null(&self) -> &'a Expr<'a> {
        self.expr(self.types.null(), ExprKind::Null)
    }

    /// The `undefined` identifier, which the checker types as `undefined`.
    pub fn undefined(&self) -> &'a Expr<'a> {
        self.expr(
            self.types.undefined(),
            ExprKind::Identifier(Ident {
                name: "undefined",
                symbol: None,
            }),
        )
    }

    pub fn this(&self, ty: &'a Type<'a>) -> &'a Expr<'a> {
        self.expr(ty, ExprKind::This)
    }

    pub fn ident(&self, symbol: Symbol<'a>, ty: &'a Type<'a>) -> &'a Expr<'a> {
        self.expr(
            ty,
            ExprKind::Identifier(Ident {
                name: symbol.name(),
                symbol: Some(symbol),
            }),
        )
    }

    /// An identifier the checker could not bind to a declaration.
    pub fn unresolved(&self, name: &str, ty: &'a Type<'a>) -> &'a Expr<'a> {
        let name = self.types.intern_str(name);
        self.expr(ty, ExprKind::Identifier(Ident { name, symbol: None }))
    }

    pub fn array(&self, elements: &[&'a Expr<'a>]) -> &'a Expr<'a> {
        let elem_ty = match elements.first() {
            Some(first) => first.ty,
            None => self.types.any(),
        };
        self.expr(self.types.array(elem_ty), ExprKind::Array(self.exprs(elements)))
    }

    pub fn member(&self, name: &str, value: &'a Expr<'a>) -> ObjectMember<'a> {
        let (id, span) = self.next_id();
        ObjectMember {
            id,
            span,
            name: self.types.intern_str(name),
            kind: ObjectMemberKind::Value(value),
        }
    }

    pub fn shorthand(&self, name: &str) -> ObjectMember<'a> {
        let (id, span) = self.next_id();
        ObjectMember {
            id,
            span,
            name: self.types.intern_str(name),
            kind: ObjectMemberKind::Shorthand,
        }
    }

    pub fn unsupported_member(&self, name: &str, kind: &str) -> ObjectMember<'a> {
        let (id, span) = self.next_id();
        ObjectMember {
            id,
            span,
            name: self.types.intern_str(name),
            kind: ObjectMemberKind::Unsupported(self.types.intern_str(kind)),
        }
    }

    pub fn object(&self, members: Vec<ObjectMember<'a>>) -> &'a Expr<'a> {
        let fields: Vec<(&str, &'a Type<'a>)> = members
            .iter()
            .map(|m| match m.kind {
                ObjectMemberKind::Value(value) => (m.name, value.ty),
                _ => (m.name, self.types.any()),
            })
            .collect();
        let ty = self.types.object(&fields);
        let members = self.arena.alloc_slice_fill_iter(members);
        self.expr(ty, ExprKind::Object(members))
    }

    pub fn conditional(
        &self,
        condition: &'a Expr<'a>,
        when_true: &'a Expr<'a>,
        when_false: &'a Expr<'a>,
    ) -> &'a Expr<'a> {
        let ty = self.types.union(&[when_true.ty, when_false.ty]);
        self.expr(
            ty,
            ExprKind::Conditional {
                condition,
                when_true,
                when_false,
            },
        )
    }

    /// Binary expression typed the way the checker would type it.
    pub fn binary(&self, op: BinaryOp, left: &'a Expr<'a>, right: &'a Expr<'a>) -> &'a Expr<'a> {
        let ty = if op.is_comparison() {
            self.types.boolean()
        } else if op.is_assignment() {
            left.ty
        } else {
            match op {
                BinaryOp::Add if left.ty.is_string_like() || right.ty.is_string_like() => {
                    self.types.string()
                }
                BinaryOp::Comma | BinaryOp::Coalesce => right.ty,
                BinaryOp::And | BinaryOp::Or => self.types.union(&[left.ty, right.ty]),
                _ => left.ty,
            }
        };
        self.binary_typed(op, left, right, ty)
    }

    pub fn binary_typed(
        &self,
        op: BinaryOp,
        left: &'a Expr<'a>,
        right: &'a Expr<'a>,
        ty: &'a Type<'a>,
    ) -> &'a Expr<'a> {
        self.expr(ty, ExprKind::Binary { op, left, right })
    }

    pub fn assign(&self, left: &'a Expr<'a>, right: &'a Expr<'a>) -> &'a Expr<'a> {
        self.binary(BinaryOp::Assign, left, right)
    }

    pub fn prefix(&self, op: PrefixOp, operand: &'a Expr<'a>) -> &'a Expr<'a> {
        let ty = match op {
            PrefixOp::Not | PrefixOp::Delete => self.types.boolean(),
            PrefixOp::TypeOf => self.types.string(),
            PrefixOp::Void => self.types.undefined(),
            _ => operand.ty,
        };
        self.expr(ty, ExprKind::Prefix { op, operand })
    }

    pub fn postfix(&self, op: PostfixOp, operand: &'a Expr<'a>) -> &'a Expr<'a> {
        self.expr(operand.ty, ExprKind::Postfix { op, operand })
    }

    pub fn call(
        &self,
        callee: &'a Expr<'a>,
        args: &[&'a Expr<'a>],
        ty: &'a Type<'a>,
    ) -> &'a Expr<'a> {
        let args = self.exprs(args);
        self.expr(ty, ExprKind::Call { callee, args })
    }

    pub fn new_expr(
        &self,
        callee: &'a Expr<'a>,
        args: &[&'a Expr<'a>],
        ty: &'a Type<'a>,
    ) -> &'a Expr<'a> {
        let args = self.exprs(args);
        self.expr(ty, ExprKind::New { callee, args })
    }

    pub fn property(
        &self,
        object: &'a Expr<'a>,
        member: Symbol<'a>,
        ty: &'a Type<'a>,
    ) -> &'a Expr<'a> {
        self.property_access(object, member, ty, false)
    }

    /// `object?.member`
    pub fn optional_property(
        &self,
        object: &'a Expr<'a>,
        member: Symbol<'a>,
        ty: &'a Type<'a>,
    ) -> &'a Expr<'a> {
        self.property_access(object, member, ty, true)
    }

    fn property_access(
        &self,
        object: &'a Expr<'a>,
        member: Symbol<'a>,
        ty: &'a Type<'a>,
        optional: bool,
    ) -> &'a Expr<'a> {
        let name = Ident {
            name: member.name(),
            symbol: Some(member),
        };
        self.expr(
            ty,
            ExprKind::Property {
                object,
                name,
                optional,
            },
        )
    }

    pub fn element(
        &self,
        object: &'a Expr<'a>,
        index: &'a Expr<'a>,
        ty: &'a Type<'a>,
    ) -> &'a Expr<'a> {
        self.expr(
            ty,
            ExprKind::Element {
                object,
                index,
                optional: false,
            },
        )
    }

    /// `object?.[index]`
    pub fn optional_element(
        &self,
        object: &'a Expr<'a>,
        index: &'a Expr<'a>,
        ty: &'a Type<'a>,
    ) -> &'a Expr<'a> {
        self.expr(
            ty,
            ExprKind::Element {
                object,
                index,
                optional: true,
            },
        )
    }

    pub fn paren(&self, inner: &'a Expr<'a>) -> &'a Expr<'a> {
        self.expr(inner.ty, ExprKind::Parenthesized(inner))
    }

    pub fn non_null(&self, inner: &'a Expr<'a>, ty: &'a Type<'a>) -> &'a Expr<'a> {
        self.expr(ty, ExprKind::NonNull(inner))
    }

    /// `inner as T`
    pub fn type_assertion(&self, inner: &'a Expr<'a>, ty: &'a Type<'a>) -> &'a Expr<'a> {
        self.expr(ty, ExprKind::TypeAssertion(inner))
    }

    pub fn unsupported(&self, kind: &str, ty: &'a Type<'a>) -> &'a Expr<'a> {
        let kind = self.types.intern_str(kind);
        self.expr(ty, ExprKind::Unsupported(kind))
    }

    // === Statements ===

    fn stmt(&self, kind: StmtKind<'a>) -> &'a Stmt<'a> {
        let (id, span) = self.next_id();
        self.arena.alloc(Stmt { id, span, kind })
    }

    pub fn block(&self, stmts: &[&'a Stmt<'a>]) -> &'a Stmt<'a> {
        let stmts = self.arena.alloc_slice_copy(stmts);
        self.stmt(StmtKind::Block(stmts))
    }

    pub fn declarator(
        &self,
        symbol: Symbol<'a>,
        ty: &'a Type<'a>,
        init: Option<&'a Expr<'a>>,
    ) -> VariableDeclarator<'a> {
        let (id, span) = self.next_id();
        VariableDeclarator {
            id,
            span,
            name: symbol.name(),
            symbol,
            ty,
            init,
        }
    }

    pub fn variable(
        &self,
        kind: VariableKind,
        declarations: Vec<VariableDeclarator<'a>>,
    ) -> &'a Stmt<'a> {
        let declarations = self.arena.alloc_slice_fill_iter(declarations);
        self.stmt(StmtKind::Variable { kind, declarations })
    }

    /// `let name = init;` with the initializer's type.
    pub fn let_stmt(&self, symbol: Symbol<'a>, init: &'a Expr<'a>) -> &'a Stmt<'a> {
        let decl = self.declarator(symbol, init.ty, Some(init));
        self.variable(VariableKind::Let, crate::vec![decl])
    }

    /// `const name = init;` with the initializer's type.
    pub fn const_stmt(&self, symbol: Symbol<'a>, init: &'a Expr<'a>) -> &'a Stmt<'a> {
        let decl = self.declarator(symbol, init.ty, Some(init));
        self.variable(VariableKind::Const, crate::vec![decl])
    }

    pub fn ret(&self, value: Option<&'a Expr<'a>>) -> &'a Stmt<'a> {
        self.stmt(StmtKind::Return(value))
    }

    pub fn expr_stmt(&self, expr: &'a Expr<'a>) -> &'a Stmt<'a> {
        self.stmt(StmtKind::Expression(expr))
    }

    pub fn if_stmt(
        &self,
        condition: &'a Expr<'a>,
        then_branch: &'a Stmt<'a>,
        else_branch: Option<&'a Stmt<'a>>,
    ) -> &'a Stmt<'a> {
        self.stmt(StmtKind::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    pub fn while_stmt(&self, condition: &'a Expr<'a>, body: &'a Stmt<'a>) -> &'a Stmt<'a> {
        self.stmt(StmtKind::While { condition, body })
    }

    pub fn throw(&self, value: &'a Expr<'a>) -> &'a Stmt<'a> {
        self.stmt(StmtKind::Throw(value))
    }

    pub fn empty(&self) -> &'a Stmt<'a> {
        self.stmt(StmtKind::Empty)
    }

    pub fn unsupported_stmt(&self, kind: &str) -> &'a Stmt<'a> {
        let kind = self.types.intern_str(kind);
        self.stmt(StmtKind::Unsupported(kind))
    }

    // === Declarations ===

    pub fn function(&self, symbol: Symbol<'a>) -> FunctionDeclBuilder<'_, 'a> {
        FunctionDeclBuilder {
            builder: self,
            symbol,
            params: Vec::new(),
            return_type: self.types.void(),
            body: None,
            exported: false,
            ambient: false,
            tags: Vec::new(),
        }
    }

    /// Starts an interface declaration. The interface type is created
    /// eagerly so member types may refer to it.
    pub fn interface(&self, name: &str) -> InterfaceDeclBuilder<'_, 'a> {
        let symbol = self.symbol(name);
        InterfaceDeclBuilder {
            builder: self,
            symbol,
            ty: self.types.interface(name, symbol),
            members: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// `declare const name: ty;`
    pub fn declare_const(
        &self,
        name: &str,
        ty: &'a Type<'a>,
        tags: &[(&str, &str)],
    ) -> &'a VariableDecl<'a> {
        let symbol = self.symbol(name);
        let (id, span) = self.next_id();
        self.arena.alloc(VariableDecl {
            id,
            span,
            name: symbol.name(),
            symbol,
            ty,
            tags: self.tags(tags),
        })
    }

    pub fn other_declaration(&self, kind: &str) -> Declaration<'a> {
        let (id, span) = self.next_id();
        Declaration::Other {
            id,
            span,
            kind: self.types.intern_str(kind),
        }
    }

    pub fn unit(&self, name: &str, declarations: &[Declaration<'a>]) -> &'a SourceUnit<'a> {
        self.arena.alloc(SourceUnit {
            name: self.types.intern_str(name),
            declarations: self.arena.alloc_slice_copy(declarations),
        })
    }
}

pub struct FunctionDeclBuilder<'b, 'a> {
    builder: &'b AstBuilder<'a>,
    symbol: Symbol<'a>,
    params: Vec<(Symbol<'a>, &'a Type<'a>)>,
    return_type: &'a Type<'a>,
    body: Option<&'a Stmt<'a>>,
    exported: bool,
    ambient: bool,
    tags: Vec<(&'b str, &'b str)>,
}

impl<'b, 'a> FunctionDeclBuilder<'b, 'a> {
    pub fn param(mut self, symbol: Symbol<'a>, ty: &'a Type<'a>) -> Self {
        self.params.push((symbol, ty));
        self
    }

    pub fn returns(mut self, ty: &'a Type<'a>) -> Self {
        self.return_type = ty;
        self
    }

    pub fn body(mut self, body: &'a Stmt<'a>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn exported(mut self) -> Self {
        self.exported = true;
        self
    }

    /// Marks the function `declare` (no body).
    pub fn ambient(mut self) -> Self {
        self.ambient = true;
        self
    }

    pub fn tag(mut self, name: &'b str, text: &'b str) -> Self {
        self.tags.push((name, text));
        self
    }

    pub fn build(self) -> &'a FunctionDecl<'a> {
        let b = self.builder;
        let params: Vec<Parameter<'a>> = self
            .params
            .iter()
            .map(|(symbol, ty)| {
                let (id, span) = b.next_id();
                Parameter {
                    id,
                    span,
                    name: symbol.name(),
                    symbol: *symbol,
                    ty: *ty,
                }
            })
            .collect();
        let (id, span) = b.next_id();
        b.arena.alloc(FunctionDecl {
            id,
            span,
            name: self.symbol.name(),
            symbol: self.symbol,
            params: b.arena.alloc_slice_fill_iter(params),
            return_type: self.return_type,
            body: self.body,
            exported: self.exported,
            ambient: self.ambient,
            tags: b.tags(&self.tags),
        })
    }
}

pub struct InterfaceDeclBuilder<'b, 'a> {
    builder: &'b AstBuilder<'a>,
    symbol: Symbol<'a>,
    ty: &'a Type<'a>,
    members: Vec<MemberDecl<'a>>,
    tags: Vec<(&'b str, &'b str)>,
}

impl<'b, 'a> InterfaceDeclBuilder<'b, 'a> {
    /// The interface's own type, usable before `build()`.
    pub fn ty(&self) -> &'a Type<'a> {
        self.ty
    }

    pub fn tag(mut self, name: &'b str, text: &'b str) -> Self {
        self.tags.push((name, text));
        self
    }

    pub fn property(mut self, name: &str, ty: &'a Type<'a>, tags: &[(&str, &str)]) -> Self {
        let b = self.builder;
        let symbol = b.symbol(name);
        let (id, span) = b.next_id();
        self.members.push(MemberDecl {
            id,
            span,
            name: symbol.name(),
            symbol,
            ty,
            kind: MemberKind::Property,
            tags: b.tags(tags),
        });
        self
    }

    pub fn method(
        mut self,
        name: &str,
        params: &[&'a Type<'a>],
        ret: &'a Type<'a>,
        tags: &[(&str, &str)],
    ) -> Self {
        let b = self.builder;
        let symbol = b.symbol(name);
        let (id, span) = b.next_id();
        self.members.push(MemberDecl {
            id,
            span,
            name: symbol.name(),
            symbol,
            ty: b.types.function(params, ret),
            kind: MemberKind::Method {
                params: params.len(),
            },
            tags: b.tags(tags),
        });
        self
    }

    pub fn build(self) -> &'a InterfaceDecl<'a> {
        let b = self.builder;
        let (id, span) = b.next_id();
        b.arena.alloc(InterfaceDecl {
            id,
            span,
            name: self.symbol.name(),
            symbol: self.symbol,
            ty: self.ty,
            members: b.arena.alloc_slice_fill_iter(self.members),
            tags: b.tags(&self.tags),
        })
    }
}
