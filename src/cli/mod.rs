//! Command line interface for the Loupe binary.

pub mod args;
pub mod commands;
