// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Command-line interface: argument parsing, logging, and the run entry
//! point.

pub mod args;
pub mod logging;
pub mod run;

pub use args::Cli;
