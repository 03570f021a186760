//! Diagnostic system for the bgn front end.
//!
//! Every report carries:
//! - an error code for searchability
//! - a message saying what went wrong
//! - a primary label at the node where it went wrong
//! - optional notes and suggestions
//!
//! # Fatal vs. recoverable
//!
//! Fatal conditions travel as [`LocationError`] through `Result`s and are
//! converted exactly once, at the outermost entry point of a pass.
//! Recoverable ones are pushed into a [`Warnings`] sink that is threaded by
//! reference through the pass and normalized by [`Warnings::finish`].

mod diagnostic;
mod error_code;
mod location;
mod warnings;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use location::LocationError;
pub use warnings::Warnings;
