//! Domain layer - paths, uploads and job records.

pub mod filename;
pub mod jobs;
pub mod layout;
pub mod upload;
