//! CLI command implementations.

pub mod extract;
pub mod init;
pub mod search;
pub mod store;
