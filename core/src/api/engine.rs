//! The neots compilation engine.

use bumpalo::Bump;
use tracing::debug;

use super::{CompileOptions, Error};
use crate::Rc;
use crate::builtins::build_global_scope;
use crate::compiler::{CompiledUnit, Compiler, Scope, compile_unit};
use crate::syntax::SourceUnit;

/// The neots compilation engine.
///
/// The engine manages:
/// - The compilation session ([`Compiler`]): arena and options
/// - The global scope built from a declarations unit
///
/// # Lifetimes
///
/// - `'arena`: Lifetime of the arena holding syntax trees and operations.
///   All compiled units borrow from this arena.
///
/// # Example
///
/// ```ignore
/// use neots_core::api::{CompileOptions, Engine};
/// use neots_core::builtins::StandardLibrary;
/// use neots_core::syntax::AstBuilder;
/// use bumpalo::Bump;
///
/// let arena = Bump::new();
/// let b = AstBuilder::new(&arena);
/// let library = StandardLibrary::declare(&b);
/// let engine = Engine::new(&arena, CompileOptions::default(), library.unit)?;
///
/// let compiled = engine.compile(unit)?;
/// println!("{}", compiled.methods[0].listing());
/// ```
pub struct Engine<'arena> {
    compiler: &'arena Compiler<'arena>,
    global: Rc<Scope<'arena>>,
}

impl<'arena> Engine<'arena> {
    /// Create a new engine whose global scope is built from `library`.
    ///
    /// Fails with [`Error::Setup`] when the declarations lack something the
    /// builtin registry requires.
    pub fn new(
        arena: &'arena Bump,
        options: CompileOptions,
        library: &'arena SourceUnit<'arena>,
    ) -> Result<Self, Error> {
        let compiler = Compiler::new(arena, options);
        let global = build_global_scope(compiler, library)?;
        debug!(library = library.name, "Engine ready");
        Ok(Self { compiler, global })
    }

    /// Access the compilation session.
    pub fn compiler(&self) -> &'arena Compiler<'arena> {
        self.compiler
    }

    /// Access the global scope.
    pub fn global_scope(&self) -> &Rc<Scope<'arena>> {
        &self.global
    }

    /// Access the engine options.
    pub fn options(&self) -> &CompileOptions {
        self.compiler.options()
    }

    /// Compile every function of `unit`.
    ///
    /// # Returns
    ///
    /// The lowered methods and events, or every diagnostic when any
    /// declaration failed. Use [`Engine::compile_partial`] to keep the
    /// methods that did lower.
    pub fn compile(&self, unit: &'arena SourceUnit<'arena>) -> Result<CompiledUnit<'arena>, Error> {
        let compiled = self.compile_partial(unit);
        if compiled.has_errors() {
            return Err(Error::Compilation {
                diagnostics: compiled.diagnostics,
            });
        }
        Ok(compiled)
    }

    /// Compile every function of `unit`, keeping failures as diagnostics
    /// next to the methods that succeeded.
    pub fn compile_partial(&self, unit: &'arena SourceUnit<'arena>) -> CompiledUnit<'arena> {
        compile_unit(self.compiler, &self.global, unit)
    }
}
