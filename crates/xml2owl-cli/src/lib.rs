//! # xml2owl CLI Library
//!
//! Command-line access to rule document inspection and mapper
//! configuration.

pub mod commands;

pub use commands::*;
