// src/logging.rs

//! Log setup for the binary.
//!
//! Levels come from `RUST_LOG` (default `info`). Output goes to stderr in the
//! compact format without module targets, leaving stdout free.
//!
//! ```bash
//! # per-record skip reasons
//! RUST_LOG=debug order-export
//! ```

use tracing_subscriber::EnvFilter;

pub fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
