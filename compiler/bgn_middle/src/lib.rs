//! Bgn Middle - the passes between parsing and typing.
//!
//! A parsed program still spells builtins as ordinary expressions:
//! `config.import("x")` is a call, `input.endian = ...` an assignment,
//! `u8(x)` a call of an undefined name. The passes here rewrite those into
//! the dedicated node kinds typing expects, then [`FormatSorter`] orders the
//! typed formats so every format comes after the formats it embeds.
//!
//! # Pass Order
//!
//! ```text
//! resolve_import → replace_metadata → replace_specify_order
//!     → replace_explicit_error → resolve_io_operation → resolve_available
//!     → resolve_primitive_cast
//! ```
//!
//! Each pass is a rewrite of the arena. Replaced nodes stay in the arena as
//! the `base` of their replacement. The import, explicit error and cast
//! passes can fail.
//!
//! Once typing succeeds, [`apply_post_typing`] turns boolean statements into
//! assertions and annotates the typed tree:
//!
//! ```text
//! replace_assert → mark_recursive_reference → analyze_layout
//!     → resolve_state_dependency → analyze_block_trait
//! ```

mod assert;
mod available;
mod block_trait;
mod cast;
mod explicit_error;
mod import;
mod io;
mod layout;
mod metadata;
mod order;
mod rewrite;
mod sort;
mod state;

#[cfg(test)]
mod test_helpers;

use bgn_diagnostic::LocationError;
use bgn_ir::{Ast, NodeId};

pub use assert::replace_assert;
pub use available::resolve_available;
pub use block_trait::analyze_block_trait;
pub use cast::resolve_primitive_cast;
pub use explicit_error::replace_explicit_error;
pub use import::{ImportError, ImportLoader, ImportResolver};
pub use io::resolve_io_operation;
pub use layout::{analyze_layout, mark_recursive_reference};
pub use metadata::replace_metadata;
pub use order::replace_specify_order;
pub use sort::FormatSorter;
pub use state::resolve_state_dependency;

/// Run every pass before typing, in order.
#[tracing::instrument(level = "debug", skip_all)]
pub fn apply_middle(
    ast: &mut Ast,
    root: NodeId,
    imports: &mut ImportResolver<'_>,
) -> Result<(), LocationError> {
    imports.resolve(ast, root)?;
    replace_metadata(ast, root);
    replace_specify_order(ast, root);
    replace_explicit_error(ast, root)?;
    resolve_io_operation(ast, root);
    resolve_available(ast, root);
    resolve_primitive_cast(ast, root)?;
    tracing::debug!(nodes = ast.len(), "middle passes finished");
    Ok(())
}

/// Run every pass that needs types, in order. Typing must have succeeded.
#[tracing::instrument(level = "debug", skip_all)]
pub fn apply_post_typing(ast: &mut Ast, root: NodeId) {
    replace_assert(ast, root);
    mark_recursive_reference(ast, root);
    analyze_layout(ast, root);
    resolve_state_dependency(ast, root);
    analyze_block_trait(ast, root);
    tracing::debug!(nodes = ast.len(), "post-typing passes finished");
}
