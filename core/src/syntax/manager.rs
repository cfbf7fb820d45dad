use crate::{
    Vec,
    syntax::{Symbol, Type},
};
use bumpalo::Bump;
use core::cell::RefCell;
use hashbrown::{DefaultHashBuilder, HashMap};

/// Interns [`Type`]s in an arena so that type identity is pointer identity.
pub struct TypeManager<'a> {
    // Arena holding all types from this TypeManager.
    arena: &'a Bump,
    interned_strs: RefCell<HashMap<&'a str, &'a str, DefaultHashBuilder, &'a Bump>>,
    interned: RefCell<HashMap<Type<'a>, &'a Type<'a>, DefaultHashBuilder, &'a Bump>>,
}

impl<'a> TypeManager<'a> {
    pub fn new(arena: &'a Bump) -> &'a Self {
        arena.alloc(Self {
            arena,
            interned_strs: RefCell::new(HashMap::new_in(arena)),
            interned: RefCell::new(HashMap::new_in(arena)),
        })
    }

    pub fn arena(&self) -> &'a Bump {
        self.arena
    }

    pub fn intern_str(&self, s: &str) -> &'a str {
        if let Some(&interned_str) = self.interned_strs.borrow().get(s) {
            return interned_str;
        }
        let arena_str = self.arena.alloc_str(s);
        self.interned_strs.borrow_mut().insert(arena_str, arena_str);
        arena_str
    }

    fn intern(&self, ty: Type<'a>) -> &'a Type<'a> {
        if let Some(&interned_ty) = self.interned.borrow().get(&ty) {
            return interned_ty;
        }
        let arena_ty = self.arena.alloc(ty.clone());
        self.interned.borrow_mut().insert(ty, arena_ty);
        arena_ty
    }

    // Factory methods for types.
    pub fn any(&self) -> &'a Type<'a> {
        self.intern(Type::Any)
    }
    pub fn unknown(&self) -> &'a Type<'a> {
        self.intern(Type::Unknown)
    }
    pub fn never(&self) -> &'a Type<'a> {
        self.intern(Type::Never)
    }
    pub fn void(&self) -> &'a Type<'a> {
        self.intern(Type::Void)
    }
    pub fn undefined(&self) -> &'a Type<'a> {
        self.intern(Type::Undefined)
    }
    pub fn null(&self) -> &'a Type<'a> {
        self.intern(Type::Null)
    }
    pub fn boolean(&self) -> &'a Type<'a> {
        self.intern(Type::Boolean)
    }
    pub fn number(&self) -> &'a Type<'a> {
        self.intern(Type::Number)
    }
    pub fn bigint(&self) -> &'a Type<'a> {
        self.intern(Type::BigInt)
    }
    pub fn string(&self) -> &'a Type<'a> {
        self.intern(Type::String)
    }

    pub fn array(&self, elem_ty: &'a Type<'a>) -> &'a Type<'a> {
        self.intern(Type::Array(elem_ty))
    }

    pub fn interface(&self, name: &str, symbol: Symbol<'a>) -> &'a Type<'a> {
        let name = self.intern_str(name);
        self.intern(Type::Interface { name, symbol })
    }

    pub fn object(&self, fields: &[(&str, &'a Type<'a>)]) -> &'a Type<'a> {
        let fields: Vec<(&'a str, &'a Type<'a>)> = fields
            .iter()
            .map(|(name, ty)| (self.intern_str(name), *ty))
            .collect();
        let arena_fields = self.arena.alloc_slice_copy(&fields);
        self.intern(Type::Object(arena_fields))
    }

    pub fn function(&self, params: &[&'a Type<'a>], ret: &'a Type<'a>) -> &'a Type<'a> {
        self.intern(Type::Function {
            params: self.arena.alloc_slice_copy(params),
            ret,
        })
    }

    /// Union of `members`, flattened and deduplicated by identity.
    ///
    /// A single distinct member is returned as-is.
    pub fn union(&self, members: &[&'a Type<'a>]) -> &'a Type<'a> {
        let mut flat: Vec<&'a Type<'a>> = Vec::new();
        for member in members {
            let nested: &[&'a Type<'a>] = match **member {
                Type::Union(inner) => inner,
                _ => core::slice::from_ref(member),
            };
            for ty in nested {
                if !flat.iter().any(|seen| core::ptr::eq(*seen, *ty)) {
                    flat.push(ty);
                }
            }
        }
        match flat.as_slice() {
            [] => self.never(),
            [single] => *single,
            _ => self.intern(Type::Union(self.arena.alloc_slice_copy(&flat))),
        }
    }
}
