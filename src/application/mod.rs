//! Application layer - job dispatch over the runner port.

pub mod dispatcher;

pub use dispatcher::{Dispatcher, JobHandle, JobRegistry};
