//! Driver for the `apply-transforms` binary.

pub mod config;
pub mod run;

pub use config::{Cli, RunConfig};
pub use run::execute;
