//! # CLI
//!
//! Thin command-line layer over the server.

pub mod args;
pub mod commands;
pub mod errors;

pub use commands::run;
pub use errors::CliError;
