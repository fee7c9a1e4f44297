use crate::domain::jobs::Invocation;
use async_trait::async_trait;
use std::io;

/// Runs the external processing command to completion.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Returns the exit code, or `None` when the process was killed by a signal.
    async fn run(&self, invocation: &Invocation) -> io::Result<Option<i32>>;
}
