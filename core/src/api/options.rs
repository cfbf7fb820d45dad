//! Configuration options for compilation.

/// Script hash of the StdLib native contract, little-endian
/// (`0xacce6fd80d44e1796aa0c2c625e9e4e0ce39efc0`).
pub const STDLIB_HASH: [u8; 20] = [
    0xc0, 0xef, 0x39, 0xce, 0xe0, 0xe4, 0xe9, 0x25, 0xc6, 0xc2, 0xa0, 0x6a, 0x79, 0xe1, 0x44,
    0x0d, 0xd8, 0x6f, 0xce, 0xac,
];

/// Configuration options for compilation.
///
/// # Example
///
/// ```
/// use neots_core::api::CompileOptions;
///
/// let options = CompileOptions {
///     max_depth: 64,
///     ..CompileOptions::default()
/// };
/// assert_eq!(options.max_depth, 64);
/// ```
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Maximum nesting of statements and expressions the compiler will
    /// follow before failing with `NestingTooDeep`.
    ///
    /// Each level costs several stack frames while operations are produced,
    /// so the default stays well inside a 2 MiB thread stack.
    ///
    /// Default: 128
    pub max_depth: usize,

    /// Native contract used for number-to-string conversion in `+`.
    ///
    /// Default: [`STDLIB_HASH`]
    pub stdlib_hash: [u8; 20],
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            max_depth: 128,
            stdlib_hash: STDLIB_HASH,
        }
    }
}
