//! Subcommand implementations.

pub mod check;
pub mod convert;
pub mod info;
pub mod mirror;
pub mod repair;
