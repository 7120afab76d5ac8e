//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`output`] - Output formatting and display
//! - [`editor`] - Text editing through the user's editor
//!
//! # Design
//!
//! Handlers print through this module so that quiet mode and error
//! formatting are consistent across commands.

pub mod editor;
pub mod output;
