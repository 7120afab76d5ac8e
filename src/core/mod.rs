//! core
//!
//! Configuration and filesystem support.
//!
//! # Modules
//!
//! - [`config`] - Configuration files: loading, merging and atomic saving
//! - [`io`] - Temporary file paths

pub mod config;
pub mod io;
