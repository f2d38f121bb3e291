//! Glue between the CLI and the library crates.
//!
//! Reads prediction input from the command line and wires up the optional
//! BI reporting uploads.

pub(crate) mod input;
pub(crate) mod reporting;
