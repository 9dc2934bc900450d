//! Order export
//!
//! Batch job that flattens a serialized collection of customers and their
//! orders into one CSV row per line item, marking (or keeping only) customers
//! found in a VIP list.
//!
//! # Usage
//!
//! ```no_run
//! use order_export::{run, Config};
//!
//! fn main() -> anyhow::Result<()> {
//!     let summary = run(&Config::default())?;
//!     println!("{} rows written to {}", summary.rows, summary.output.display());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod data_loader;
pub mod error;
pub mod flatten;
pub mod job;
pub mod logging;
pub mod model;
pub mod validate;
pub mod writer;

pub use config::Config;
pub use error::{JobError, LoadError, WriteError};
pub use flatten::{flatten, Flattened, VipPolicy};
pub use job::{prepare, run, JobSummary, Prepared};
pub use model::{Customer, CustomerId, OutputRow, VipSet};
pub use validate::{validate, ValidationReport};
