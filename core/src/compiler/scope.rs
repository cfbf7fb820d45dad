//! Immutable, persistent name scopes.
//!
//! A scope maps symbols to compile-time objects and static types to
//! compile-time types, and falls back to its parent. Scopes never change once
//! built: defining something returns a new scope at the same level, leaving
//! every holder of the old one unaffected.

use hashbrown::HashMap;

use crate::compiler::{CompileError, CompileTimeObject, CompileTimeType, ErrorKind};
use crate::syntax::{NodeRef, Symbol, Type};
use crate::{Rc, ToString};

#[derive(Clone, Default)]
pub struct Scope<'a> {
    parent: Option<Rc<Scope<'a>>>,
    objects: HashMap<Symbol<'a>, Rc<CompileTimeObject<'a>>>,
    types: HashMap<&'a Type<'a>, Rc<CompileTimeType<'a>>>,
}

impl<'a> Scope<'a> {
    /// An empty scope without parent.
    pub fn root() -> Rc<Self> {
        Rc::new(Scope::default())
    }

    /// An empty scope nested in `parent`.
    pub fn child(parent: &Rc<Scope<'a>>) -> Rc<Self> {
        Rc::new(Scope {
            parent: Some(Rc::clone(parent)),
            ..Scope::default()
        })
    }

    pub fn parent(&self) -> Option<&Rc<Scope<'a>>> {
        self.parent.as_ref()
    }

    /// Nearest definition of `symbol`, walking outwards.
    pub fn resolve(&self, symbol: Symbol<'a>) -> Option<&Rc<CompileTimeObject<'a>>> {
        let mut scope = Some(self);
        while let Some(current) = scope {
            if let Some(object) = current.objects.get(&symbol) {
                return Some(object);
            }
            scope = current.parent.as_deref();
        }
        None
    }

    /// Nearest definition whose symbol is called `name`.
    ///
    /// Only for places where the checker leaves no symbol, such as object
    /// literal shorthands. When one level binds several symbols of that name,
    /// the most recently created symbol wins.
    pub fn resolve_name(&self, name: &str) -> Option<&Rc<CompileTimeObject<'a>>> {
        let mut scope = Some(self);
        while let Some(current) = scope {
            let found = current
                .objects
                .iter()
                .filter(|(symbol, _)| symbol.name() == name)
                .max_by_key(|(symbol, _)| symbol.id())
                .map(|(_, object)| object);
            if found.is_some() {
                return found;
            }
            scope = current.parent.as_deref();
        }
        None
    }

    pub fn resolve_type(&self, ty: &Type<'a>) -> Option<&Rc<CompileTimeType<'a>>> {
        let mut scope = Some(self);
        while let Some(current) = scope {
            if let Some(ctt) = current.types.get(ty) {
                return Some(ctt);
            }
            scope = current.parent.as_deref();
        }
        None
    }

    /// True when `symbol` is defined at this level (ignoring parents).
    pub fn defines(&self, symbol: Symbol<'a>) -> bool {
        self.objects.contains_key(&symbol)
    }

    pub fn len(&self) -> usize {
        self.objects.len() + self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A copy of this scope with `object` added at the same level.
    pub fn define(&self, object: CompileTimeObject<'a>) -> Result<Rc<Self>, CompileError> {
        self.define_all([object])
    }

    /// A copy of this scope with every object added at the same level.
    ///
    /// Fails on the first symbol that is already defined at this level, or
    /// appears twice in `objects`.
    pub fn define_all(
        &self,
        objects: impl IntoIterator<Item = CompileTimeObject<'a>>,
    ) -> Result<Rc<Self>, CompileError> {
        let mut scope = self.clone();
        for object in objects {
            let symbol = object.symbol.ok_or_else(|| {
                CompileError::new(ErrorKind::UnsupportedConstruct {
                    what: "definition without a symbol".to_string(),
                })
            })?;
            if scope.objects.contains_key(&symbol) {
                return Err(duplicate(object.node, symbol.name()));
            }
            scope.objects.insert(symbol, Rc::new(object));
        }
        Ok(Rc::new(scope))
    }

    /// A copy of this scope with `ctt` registered for its type.
    pub fn define_type(&self, ctt: CompileTimeType<'a>) -> Result<Rc<Self>, CompileError> {
        if self.types.contains_key(ctt.ty) {
            return Err(duplicate(None, &ctt.ty.to_string()));
        }
        let mut scope = self.clone();
        scope.types.insert(ctt.ty, Rc::new(ctt));
        Ok(Rc::new(scope))
    }
}

fn duplicate(node: Option<NodeRef>, name: &str) -> CompileError {
    let kind = ErrorKind::DuplicateDefinition {
        name: name.to_string(),
    };
    match node {
        Some(node) => CompileError::at(&node, kind),
        None => CompileError::new(kind),
    }
}

impl core::fmt::Debug for Scope<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut names: crate::Vec<_> = self.objects.keys().map(|s| s.name()).collect();
        names.sort_unstable();
        f.debug_struct("Scope")
            .field("objects", &names)
            .field("types", &self.types.len())
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}
