//! Compile-time objects and types: what a name or a type means to the
//! code generator.

use core::fmt;
use hashbrown::HashMap;

use crate::compiler::CompileError;
use crate::ops::Ops;
use crate::syntax::{Expr, ExprKind, Located, NodeRef, Symbol, Type};
use crate::{Rc, Vec};

/// Deferred producer of an expression's load operations.
pub type GetOps<'a> = Rc<dyn Fn() -> Result<Ops<'a>, CompileError> + 'a>;

/// Deferred producer of a store: receives the operations computing the value
/// and returns the sequence writing it to the target.
pub type GetStoreOps<'a> = Rc<dyn Fn(Ops<'a>) -> Result<Ops<'a>, CompileError> + 'a>;

/// Resolves a property given the object's load producer.
pub type PropertyResolver<'a> =
    Rc<dyn Fn(&GetOps<'a>) -> Result<CompileTimeObject<'a>, CompileError> + 'a>;

/// Resolves a call or construction.
pub type InvokeResolver<'a> =
    Rc<dyn Fn(&Invocation<'_, 'a>) -> Result<CompileTimeObject<'a>, CompileError> + 'a>;

pub type PropertyMap<'a> = HashMap<Symbol<'a>, PropertyResolver<'a>>;

/// Everything an invoke resolver gets to look at.
pub struct Invocation<'r, 'a> {
    /// The call or `new` expression.
    pub node: &'a Expr<'a>,
    /// Load producer of the callee.
    pub this: &'r GetOps<'a>,
    /// Load producers of the arguments, in source order.
    pub args: &'r [GetOps<'a>],
}

impl<'a> Invocation<'_, 'a> {
    /// Argument expressions, for resolvers that fold literal arguments.
    pub fn arg_nodes(&self) -> &'a [&'a Expr<'a>] {
        match self.node.kind {
            ExprKind::Call { args, .. } | ExprKind::New { args, .. } => args,
            _ => &[],
        }
    }

    /// Arguments evaluated last-to-first, the order NeoVM calls pop them in.
    pub fn args_reversed(&self) -> Result<Ops<'a>, CompileError> {
        let mut ops = Vec::new();
        for arg in self.args.iter().rev() {
            ops.extend(arg()?);
        }
        Ok(ops)
    }
}

/// Whether a resolver evaluates the receiver (`this`) before its own
/// operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receiver {
    /// Static members: the object expression only names a namespace.
    Ignore,
    Push,
}

/// The compile-time meaning of a name: how to load it, store it, call it,
/// construct it and reach its properties.
#[derive(Clone)]
pub struct CompileTimeObject<'a> {
    pub node: Option<NodeRef>,
    pub symbol: Option<Symbol<'a>>,
    pub load_ops: Ops<'a>,
    /// `None` for read-only objects.
    pub store_ops: Option<Ops<'a>>,
    pub call: Option<InvokeResolver<'a>>,
    pub call_new: Option<InvokeResolver<'a>>,
    pub properties: Option<Rc<PropertyMap<'a>>>,
}

impl<'a> CompileTimeObject<'a> {
    /// An anonymous value, such as the result of a call.
    pub fn new(load_ops: Ops<'a>) -> Self {
        CompileTimeObject {
            node: None,
            symbol: None,
            load_ops,
            store_ops: None,
            call: None,
            call_new: None,
            properties: None,
        }
    }

    /// The object a declaration introduces.
    pub fn declared(node: &impl Located, symbol: Symbol<'a>, load_ops: Ops<'a>) -> Self {
        CompileTimeObject {
            node: Some(NodeRef::of(node)),
            symbol: Some(symbol),
            ..CompileTimeObject::new(load_ops)
        }
    }

    pub fn with_store(mut self, store_ops: Ops<'a>) -> Self {
        self.store_ops = Some(store_ops);
        self
    }

    pub fn with_call(mut self, call: InvokeResolver<'a>) -> Self {
        self.call = Some(call);
        self
    }

    pub fn with_call_new(mut self, call_new: InvokeResolver<'a>) -> Self {
        self.call_new = Some(call_new);
        self
    }

    pub fn with_properties(mut self, properties: PropertyMap<'a>) -> Self {
        self.properties = Some(Rc::new(properties));
        self
    }

    pub fn is_read_only(&self) -> bool {
        self.store_ops.is_none()
    }

    pub fn name(&self) -> &'a str {
        self.symbol.map_or("<anonymous>", |symbol| symbol.name())
    }
}

impl fmt::Debug for CompileTimeObject<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompileTimeObject")
            .field("symbol", &self.symbol)
            .field("load_ops", &self.load_ops)
            .field("store_ops", &self.store_ops)
            .field("callable", &self.call.is_some())
            .field("constructable", &self.call_new.is_some())
            .field(
                "properties",
                &self.properties.as_ref().map_or(0, |props| props.len()),
            )
            .finish()
    }
}

/// Type-level capabilities shared by every value of one static type.
#[derive(Clone)]
pub struct CompileTimeType<'a> {
    pub ty: &'a Type<'a>,
    pub call: Option<InvokeResolver<'a>>,
    pub call_new: Option<InvokeResolver<'a>>,
    pub properties: PropertyMap<'a>,
}

impl<'a> CompileTimeType<'a> {
    pub fn new(ty: &'a Type<'a>) -> Self {
        CompileTimeType {
            ty,
            call: None,
            call_new: None,
            properties: PropertyMap::new(),
        }
    }

    pub fn with_property(mut self, symbol: Symbol<'a>, resolver: PropertyResolver<'a>) -> Self {
        self.properties.insert(symbol, resolver);
        self
    }

    pub fn with_call(mut self, call: InvokeResolver<'a>) -> Self {
        self.call = Some(call);
        self
    }
}

impl fmt::Debug for CompileTimeType<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompileTimeType")
            .field("ty", &self.ty)
            .field("properties", &self.properties.len())
            .finish()
    }
}

/// Wraps a closure as a [`GetOps`].
pub fn producer<'a>(f: impl Fn() -> Result<Ops<'a>, CompileError> + 'a) -> GetOps<'a> {
    Rc::new(f)
}

/// Wraps a closure as a [`GetStoreOps`].
pub fn store_producer<'a>(
    f: impl Fn(Ops<'a>) -> Result<Ops<'a>, CompileError> + 'a,
) -> GetStoreOps<'a> {
    Rc::new(f)
}

/// Wraps a closure as an [`InvokeResolver`].
pub fn invoker<'a>(
    f: impl Fn(&Invocation<'_, 'a>) -> Result<CompileTimeObject<'a>, CompileError> + 'a,
) -> InvokeResolver<'a> {
    Rc::new(f)
}

/// Wraps a closure as a [`PropertyResolver`].
pub fn resolver<'a>(
    f: impl Fn(&GetOps<'a>) -> Result<CompileTimeObject<'a>, CompileError> + 'a,
) -> PropertyResolver<'a> {
    Rc::new(f)
}

/// A producer that always yields `ops`.
pub fn thunk<'a>(ops: Ops<'a>) -> GetOps<'a> {
    producer(move || Ok(ops.clone()))
}

/// Calls that evaluate the arguments last-to-first, then optionally the
/// receiver, then `tail`.
pub fn call_invoker<'a>(receiver: Receiver, tail: Ops<'a>) -> InvokeResolver<'a> {
    invoker(move |invocation| {
        let mut ops = invocation.args_reversed()?;
        if receiver == Receiver::Push {
            ops.extend((invocation.this)()?);
        }
        ops.extend(tail.iter().copied());
        Ok(CompileTimeObject::new(ops))
    })
}

/// A property backed by `member`: its load (and store, when writable) run
/// after the optional receiver.
pub fn member_resolver<'a>(
    receiver: Receiver,
    member: CompileTimeObject<'a>,
) -> PropertyResolver<'a> {
    resolver(move |this| {
        let prefix = match receiver {
            Receiver::Push => this()?,
            Receiver::Ignore => Vec::new(),
        };
        let mut cto = member.clone();
        cto.load_ops = prefix.iter().chain(member.load_ops.iter()).copied().collect();
        if let Some(store_ops) = &member.store_ops {
            cto.store_ops = Some(prefix.iter().chain(store_ops.iter()).copied().collect());
        }
        Ok(cto)
    })
}

/// A method property: reading it is meaningless, calling it runs `call`.
pub fn method_resolver<'a>(call: InvokeResolver<'a>) -> PropertyResolver<'a> {
    resolver(move |this| {
        let this = this.clone();
        let call = call.clone();
        let bound = invoker(move |invocation| {
            call(&Invocation {
                node: invocation.node,
                this: &this,
                args: invocation.args,
            })
        });
        Ok(CompileTimeObject::new(Vec::new()).with_call(bound))
    })
}
