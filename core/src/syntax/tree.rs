//! The typed expression/statement tree consumed by the compiler.
//!
//! Nodes are arena-allocated and carry the checker's results: every expression
//! has a resolved static type and every identifier/declaration its symbol.

use core::fmt;

use crate::syntax::{Located, NodeId, Span, Symbol, Type};

#[derive(Debug)]
pub struct Expr<'a> {
    pub id: NodeId,
    pub span: Span,
    pub ty: &'a Type<'a>,
    pub kind: ExprKind<'a>,
}

/// A name occurrence plus the symbol the checker resolved it to.
#[derive(Debug, Clone, Copy)]
pub struct Ident<'a> {
    pub name: &'a str,
    pub symbol: Option<Symbol<'a>>,
}

#[derive(Debug)]
pub enum ExprKind<'a> {
    /// Numeric literal. Only integral values can be lowered.
    Number(f64),
    /// BigInt literal digits, without the trailing `n`.
    BigInt(&'a str),
    String(&'a str),
    Boolean(bool),
    Null,
    This,
    Identifier(Ident<'a>),
    Array(&'a [&'a Expr<'a>]),
    Object(&'a [ObjectMember<'a>]),
    Conditional {
        condition: &'a Expr<'a>,
        when_true: &'a Expr<'a>,
        when_false: &'a Expr<'a>,
    },
    Binary {
        op: BinaryOp,
        left: &'a Expr<'a>,
        right: &'a Expr<'a>,
    },
    Prefix {
        op: PrefixOp,
        operand: &'a Expr<'a>,
    },
    Postfix {
        op: PostfixOp,
        operand: &'a Expr<'a>,
    },
    Call {
        callee: &'a Expr<'a>,
        args: &'a [&'a Expr<'a>],
    },
    New {
        callee: &'a Expr<'a>,
        args: &'a [&'a Expr<'a>],
    },
    Property {
        object: &'a Expr<'a>,
        name: Ident<'a>,
        optional: bool,
    },
    Element {
        object: &'a Expr<'a>,
        index: &'a Expr<'a>,
        optional: bool,
    },
    Parenthesized(&'a Expr<'a>),
    NonNull(&'a Expr<'a>),
    TypeAssertion(&'a Expr<'a>),
    /// A construct the checker accepts but lowering does not model
    /// (templates, arrow functions, spreads, ...).
    Unsupported(&'a str),
}

impl<'a> ExprKind<'a> {
    /// Short human-readable name of the node kind, for diagnostics.
    pub fn describe(&self) -> &'a str {
        match self {
            ExprKind::Number(_) => "numeric literal",
            ExprKind::BigInt(_) => "bigint literal",
            ExprKind::String(_) => "string literal",
            ExprKind::Boolean(_) => "boolean literal",
            ExprKind::Null => "null literal",
            ExprKind::This => "this expression",
            ExprKind::Identifier(_) => "identifier",
            ExprKind::Array(_) => "array literal",
            ExprKind::Object(_) => "object literal",
            ExprKind::Conditional { .. } => "conditional expression",
            ExprKind::Binary { .. } => "binary expression",
            ExprKind::Prefix { .. } => "prefix expression",
            ExprKind::Postfix { .. } => "postfix expression",
            ExprKind::Call { .. } => "call expression",
            ExprKind::New { .. } => "new expression",
            ExprKind::Property { .. } => "property access",
            ExprKind::Element { .. } => "element access",
            ExprKind::Parenthesized(_) => "parenthesized expression",
            ExprKind::NonNull(_) => "non-null assertion",
            ExprKind::TypeAssertion(_) => "type assertion",
            ExprKind::Unsupported(kind) => *kind,
        }
    }
}

impl Located for Expr<'_> {
    fn node_id(&self) -> NodeId {
        self.id
    }
    fn span(&self) -> Span {
        self.span
    }
}

#[derive(Debug)]
pub struct ObjectMember<'a> {
    pub id: NodeId,
    pub span: Span,
    pub name: &'a str,
    pub kind: ObjectMemberKind<'a>,
}

#[derive(Debug)]
pub enum ObjectMemberKind<'a> {
    /// `name: value`
    Value(&'a Expr<'a>),
    /// `{ name }`
    Shorthand,
    /// Methods, accessors, spreads and computed keys.
    Unsupported(&'a str),
}

impl Located for ObjectMember<'_> {
    fn node_id(&self) -> NodeId {
        self.id
    }
    fn span(&self) -> Span {
        self.span
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    RemAssign,
    ExpAssign,
    ShlAssign,
    ShrAssign,
    UShrAssign,
    BitAndAssign,
    BitOrAssign,
    BitXorAssign,
    AndAssign,
    OrAssign,
    CoalesceAssign,

    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Exp,
    Shl,
    Shr,
    UShr,
    BitAnd,
    BitOr,
    BitXor,

    Eq,
    StrictEq,
    NotEq,
    StrictNotEq,
    Lt,
    Le,
    Gt,
    Ge,

    And,
    Or,
    Coalesce,
    Comma,
    In,
    InstanceOf,
}

impl BinaryOp {
    /// Maps a compound assignment token onto the operator it applies before
    /// storing (`+=` → `+`). Returns `None` for everything else, including `=`.
    pub fn compound_base(self) -> Option<BinaryOp> {
        use BinaryOp::*;
        Some(match self {
            AddAssign => Add,
            SubAssign => Sub,
            MulAssign => Mul,
            DivAssign => Div,
            RemAssign => Rem,
            ExpAssign => Exp,
            ShlAssign => Shl,
            ShrAssign => Shr,
            UShrAssign => UShr,
            BitAndAssign => BitAnd,
            BitOrAssign => BitOr,
            BitXorAssign => BitXor,
            AndAssign => And,
            OrAssign => Or,
            CoalesceAssign => Coalesce,
            _ => return None,
        })
    }

    pub fn is_assignment(self) -> bool {
        self == BinaryOp::Assign || self.compound_base().is_some()
    }

    pub fn is_comparison(self) -> bool {
        use BinaryOp::*;
        matches!(
            self,
            Eq | StrictEq | NotEq | StrictNotEq | Lt | Le | Gt | Ge | In | InstanceOf
        )
    }

    pub fn as_str(self) -> &'static str {
        use BinaryOp::*;
        match self {
            Assign => "=",
            AddAssign => "+=",
            SubAssign => "-=",
            MulAssign => "*=",
            DivAssign => "/=",
            RemAssign => "%=",
            ExpAssign => "**=",
            ShlAssign => "<<=",
            ShrAssign => ">>=",
            UShrAssign => ">>>=",
            BitAndAssign => "&=",
            BitOrAssign => "|=",
            BitXorAssign => "^=",
            AndAssign => "&&=",
            OrAssign => "||=",
            CoalesceAssign => "??=",
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Rem => "%",
            Exp => "**",
            Shl => "<<",
            Shr => ">>",
            UShr => ">>>",
            BitAnd => "&",
            BitOr => "|",
            BitXor => "^",
            Eq => "==",
            StrictEq => "===",
            NotEq => "!=",
            StrictNotEq => "!==",
            Lt => "<",
            Le => "<=",
            Gt => ">",
            Ge => ">=",
            And => "&&",
            Or => "||",
            Coalesce => "??",
            Comma => ",",
            In => "in",
            InstanceOf => "instanceof",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOp {
    Increment,
    Decrement,
    Plus,
    Minus,
    BitNot,
    Not,
    TypeOf,
    Void,
    Delete,
}

impl PrefixOp {
    pub fn as_str(self) -> &'static str {
        match self {
            PrefixOp::Increment => "++",
            PrefixOp::Decrement => "--",
            PrefixOp::Plus => "+",
            PrefixOp::Minus => "-",
            PrefixOp::BitNot => "~",
            PrefixOp::Not => "!",
            PrefixOp::TypeOf => "typeof",
            PrefixOp::Void => "void",
            PrefixOp::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostfixOp {
    Increment,
    Decrement,
}

#[derive(Debug)]
pub struct Stmt<'a> {
    pub id: NodeId,
    pub span: Span,
    pub kind: StmtKind<'a>,
}

#[derive(Debug)]
pub enum StmtKind<'a> {
    Block(&'a [&'a Stmt<'a>]),
    Variable {
        kind: VariableKind,
        declarations: &'a [VariableDeclarator<'a>],
    },
    Return(Option<&'a Expr<'a>>),
    Expression(&'a Expr<'a>),
    If {
        condition: &'a Expr<'a>,
        then_branch: &'a Stmt<'a>,
        else_branch: Option<&'a Stmt<'a>>,
    },
    While {
        condition: &'a Expr<'a>,
        body: &'a Stmt<'a>,
    },
    Throw(&'a Expr<'a>),
    Empty,
    Unsupported(&'a str),
}

impl<'a> StmtKind<'a> {
    pub fn describe(&self) -> &'a str {
        match self {
            StmtKind::Block(_) => "block",
            StmtKind::Variable { .. } => "variable statement",
            StmtKind::Return(_) => "return statement",
            StmtKind::Expression(_) => "expression statement",
            StmtKind::If { .. } => "if statement",
            StmtKind::While { .. } => "while statement",
            StmtKind::Throw(_) => "throw statement",
            StmtKind::Empty => "empty statement",
            StmtKind::Unsupported(kind) => *kind,
        }
    }
}

impl Located for Stmt<'_> {
    fn node_id(&self) -> NodeId {
        self.id
    }
    fn span(&self) -> Span {
        self.span
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    Let,
    Const,
    Var,
}

#[derive(Debug)]
pub struct VariableDeclarator<'a> {
    pub id: NodeId,
    pub span: Span,
    pub name: &'a str,
    pub symbol: Symbol<'a>,
    pub ty: &'a Type<'a>,
    pub init: Option<&'a Expr<'a>>,
}

impl Located for VariableDeclarator<'_> {
    fn node_id(&self) -> NodeId {
        self.id
    }
    fn span(&self) -> Span {
        self.span
    }
}

// === Declarations ===

/// A JSDoc tag such as `@safe` or `@syscall System.Storage.Get`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocTag<'a> {
    pub name: &'a str,
    pub text: &'a str,
}

/// Declarations that carry JSDoc tags.
pub trait Tagged<'a> {
    fn tags(&self) -> &'a [DocTag<'a>];

    fn tag(&self, name: &str) -> Option<&'a DocTag<'a>> {
        self.tags().iter().find(|tag| tag.name == name)
    }

    fn has_tag(&self, name: &str) -> bool {
        self.tag(name).is_some()
    }
}

#[derive(Debug)]
pub struct Parameter<'a> {
    pub id: NodeId,
    pub span: Span,
    pub name: &'a str,
    pub symbol: Symbol<'a>,
    pub ty: &'a Type<'a>,
}

impl Located for Parameter<'_> {
    fn node_id(&self) -> NodeId {
        self.id
    }
    fn span(&self) -> Span {
        self.span
    }
}

#[derive(Debug)]
pub struct FunctionDecl<'a> {
    pub id: NodeId,
    pub span: Span,
    pub name: &'a str,
    pub symbol: Symbol<'a>,
    pub params: &'a [Parameter<'a>],
    pub return_type: &'a Type<'a>,
    pub body: Option<&'a Stmt<'a>>,
    /// Carries the `export` modifier.
    pub exported: bool,
    /// Carries the `declare` modifier.
    pub ambient: bool,
    pub tags: &'a [DocTag<'a>],
}

impl<'a> Tagged<'a> for FunctionDecl<'a> {
    fn tags(&self) -> &'a [DocTag<'a>] {
        self.tags
    }
}

impl Located for FunctionDecl<'_> {
    fn node_id(&self) -> NodeId {
        self.id
    }
    fn span(&self) -> Span {
        self.span
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Property,
    Method { params: usize },
}

#[derive(Debug)]
pub struct MemberDecl<'a> {
    pub id: NodeId,
    pub span: Span,
    pub name: &'a str,
    pub symbol: Symbol<'a>,
    /// Property type, or the method's function type.
    pub ty: &'a Type<'a>,
    pub kind: MemberKind,
    pub tags: &'a [DocTag<'a>],
}

impl<'a> Tagged<'a> for MemberDecl<'a> {
    fn tags(&self) -> &'a [DocTag<'a>] {
        self.tags
    }
}

impl Located for MemberDecl<'_> {
    fn node_id(&self) -> NodeId {
        self.id
    }
    fn span(&self) -> Span {
        self.span
    }
}

#[derive(Debug)]
pub struct InterfaceDecl<'a> {
    pub id: NodeId,
    pub span: Span,
    pub name: &'a str,
    pub symbol: Symbol<'a>,
    pub ty: &'a Type<'a>,
    pub members: &'a [MemberDecl<'a>],
    pub tags: &'a [DocTag<'a>],
}

impl<'a> InterfaceDecl<'a> {
    pub fn member(&self, name: &str) -> Option<&'a MemberDecl<'a>> {
        self.members.iter().find(|m| m.name == name)
    }
}

impl<'a> Tagged<'a> for InterfaceDecl<'a> {
    fn tags(&self) -> &'a [DocTag<'a>] {
        self.tags
    }
}

impl Located for InterfaceDecl<'_> {
    fn node_id(&self) -> NodeId {
        self.id
    }
    fn span(&self) -> Span {
        self.span
    }
}

/// An ambient `declare const name: Type;`.
#[derive(Debug)]
pub struct VariableDecl<'a> {
    pub id: NodeId,
    pub span: Span,
    pub name: &'a str,
    pub symbol: Symbol<'a>,
    pub ty: &'a Type<'a>,
    pub tags: &'a [DocTag<'a>],
}

impl<'a> Tagged<'a> for VariableDecl<'a> {
    fn tags(&self) -> &'a [DocTag<'a>] {
        self.tags
    }
}

impl Located for VariableDecl<'_> {
    fn node_id(&self) -> NodeId {
        self.id
    }
    fn span(&self) -> Span {
        self.span
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Declaration<'a> {
    Function(&'a FunctionDecl<'a>),
    Interface(&'a InterfaceDecl<'a>),
    Variable(&'a VariableDecl<'a>),
    /// Type aliases, enums, classes, imports, ...
    Other {
        id: NodeId,
        span: Span,
        kind: &'a str,
    },
}

impl Located for Declaration<'_> {
    fn node_id(&self) -> NodeId {
        match self {
            Declaration::Function(decl) => decl.id,
            Declaration::Interface(decl) => decl.id,
            Declaration::Variable(decl) => decl.id,
            Declaration::Other { id, .. } => *id,
        }
    }
    fn span(&self) -> Span {
        match self {
            Declaration::Function(decl) => decl.span,
            Declaration::Interface(decl) => decl.span,
            Declaration::Variable(decl) => decl.span,
            Declaration::Other { span, .. } => *span,
        }
    }
}

/// The top-level declarations of one source file.
#[derive(Debug)]
pub struct SourceUnit<'a> {
    pub name: &'a str,
    pub declarations: &'a [Declaration<'a>],
}

impl<'a> SourceUnit<'a> {
    pub fn interface(&self, name: &str) -> Option<&'a InterfaceDecl<'a>> {
        self.declarations.iter().find_map(|decl| match decl {
            Declaration::Interface(i) if i.name == name => Some(*i),
            _ => None,
        })
    }

    pub fn interface_by_symbol(&self, symbol: Symbol<'a>) -> Option<&'a InterfaceDecl<'a>> {
        self.declarations.iter().find_map(|decl| match decl {
            Declaration::Interface(i) if i.symbol == symbol => Some(*i),
            _ => None,
        })
    }

    pub fn variable(&self, name: &str) -> Option<&'a VariableDecl<'a>> {
        self.declarations.iter().find_map(|decl| match decl {
            Declaration::Variable(v) if v.name == name => Some(*v),
            _ => None,
        })
    }

    pub fn function(&self, name: &str) -> Option<&'a FunctionDecl<'a>> {
        self.declarations.iter().find_map(|decl| match decl {
            Declaration::Function(f) if f.name == name => Some(*f),
            _ => None,
        })
    }
}
