//! Stack growth for deeply nested format descriptions.
//!
//! Typing, constant evaluation and the desugaring passes all recurse over the
//! node arena. Generated descriptions can nest binary expressions thousands
//! of levels deep (long `a + b + c + ...` chains, nested `match`, chains of
//! `else if`), and the default 8MB main-thread stack (2MB on rayon workers)
//! runs out long before the arena does.
//!
//! # Platform Support
//!
//! - **Native targets**: `stacker` checks the remaining stack and switches to
//!   a freshly allocated segment when it runs low.
//! - **wasm32**: passthrough. The wasm runtime owns the stack and `stacker`
//!   cannot switch it.
//!
//! # Usage
//!
//! Every recursive entry point wraps its body, not its call sites:
//!
//! ```text
//! fn type_node(&mut self, id: NodeId) -> TypeResult<NodeId> {
//!     ensure_sufficient_stack(|| {
//!         // ... dispatch on the node kind, recursing into children ...
//!     })
//! }
//! ```
//!
//! The check is a pointer comparison, so wrapping a function that usually
//! recurses only a few levels costs next to nothing.
//!
//! # Configuration
//!
//! - **Red zone**: 128KB. Typing one node keeps a few hundred bytes of
//!   locals plus whatever the evaluator needs for constant folding on top of
//!   it, so the margin is larger than a parser would need.
//! - **Segment size**: 2MB. Descriptions are compiled on rayon workers
//!   whose own stacks are 2MB, so one segment doubles the usable depth of a
//!   worker before the next switch.

/// Remaining stack below which a new segment is allocated (128KB).
///
/// Has to cover the deepest non-recursive stretch between two calls of
/// [`ensure_sufficient_stack`]: one typing step plus the constant folding it
/// may trigger.
const RED_ZONE: usize = 128 * 1024;

/// Size of each freshly allocated stack segment (2MB).
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, first growing the stack if less than [`RED_ZONE`] bytes remain.
///
/// The closure's result, `Result` or not, is returned unchanged, so
/// fallible passes keep using `?` inside it.
///
/// # Example
///
/// ```text
/// fn depth(ast: &Ast, id: NodeId) -> usize {
///     ensure_sufficient_stack(|| {
///         let deepest = ast.children(id).into_iter().map(|c| depth(ast, c)).max();
///         deepest.map_or(1, |d| d + 1)
///     })
/// }
/// ```
///
/// # Platform Behavior
///
/// - **Native**: `stacker::maybe_grow` with [`RED_ZONE`] and
///   [`SEGMENT_SIZE`].
/// - **wasm32**: calls `f()` directly.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// wasm manages its own stack; run `f` as is.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
