//! Checker-assigned symbol identities.

use core::fmt;
use core::hash::{Hash, Hasher};

/// A declaration identity handed out by the type checker.
///
/// Two symbols are the same declaration iff their ids match; the name is kept
/// for diagnostics and for the by-name fallbacks some lookups need.
#[derive(Clone, Copy)]
pub struct Symbol<'a> {
    id: u32,
    name: &'a str,
}

impl<'a> Symbol<'a> {
    pub const fn new(id: u32, name: &'a str) -> Self {
        Symbol { id, name }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &'a str {
        self.name
    }
}

impl PartialEq for Symbol<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Symbol<'_> {}

impl Hash for Symbol<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Symbol<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.id)
    }
}

impl fmt::Display for Symbol<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
