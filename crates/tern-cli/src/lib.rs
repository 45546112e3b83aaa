//! Command-line interface for the tern bundler.
//!
//! - [`cli`] - clap definitions for `tern build` and `tern check`
//! - [`commands`] - the command implementations
//! - [`error`] - `CliError` with hints, converted to miette reports in `main`
//! - [`logger`] - tracing subscriber setup
//! - [`ui`] - colored status lines and the chunk summary
//!
//! ```rust,no_run
//! use tern_cli::{error::Result, logger};
//!
//! fn main() -> Result<()> {
//!     logger::init_logger(false, false, false);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, Result, ResultExt};
