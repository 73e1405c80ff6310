//! CLI subcommands.

pub mod build;
pub mod discover;
pub mod init;
pub mod plan;
pub mod resolve;
