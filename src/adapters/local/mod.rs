//! Local filesystem and process adapters.

pub mod fs;
pub mod process;

pub use process::ProcessRunner;
