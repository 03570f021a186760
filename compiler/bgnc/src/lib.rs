//! Bgnc - the bgn front-end driver.
//!
//! Takes the JSON AST an external parser produced and returns it typed:
//!
//! ```text
//! decode → resolve imports → middle passes → typing → format order → encode
//! ```
//!
//! Diagnostics go to stderr, the typed AST to `--output` or stdout.
//!
//! # Module Organization
//!
//! - `config`: command-line parsing into a [`DriverConfig`]
//! - `driver`: per-input compilation and the [`run`] entry point
//! - `loader`: [`FsLoader`], import lookup on the file system
//! - `render`: diagnostic rendering

pub mod config;
pub mod driver;
pub mod loader;
pub mod render;

use std::sync::Once;

pub use config::{parse_args, Command, ConfigError, DriverConfig, Stream};
pub use driver::{compile, compile_all, run, write_output, Compiled, DriverError, Status};
pub use loader::FsLoader;
pub use render::{render, SourceMap};

static TRACING_INIT: Once = Once::new();

/// Install the log subscriber.
///
/// Only does something when `BGN_LOG` (or else `RUST_LOG`) is set, e.g.
/// `BGN_LOG=bgn_types=trace`. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{prelude::*, EnvFilter};

        let Some(directives) = std::env::var("BGN_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .ok()
        else {
            return;
        };
        tracing_subscriber::registry()
            .with(EnvFilter::new(directives))
            .with(
                tracing_tree::HierarchicalLayer::new(2)
                    .with_targets(true)
                    .with_bracketed_fields(true),
            )
            .init();
    });
}
