//! CLI command implementations.

pub mod arch;
pub mod common;
pub mod compile;
pub mod route;
pub mod version;
