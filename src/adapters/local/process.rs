use crate::domain::jobs::Invocation;
use crate::ports::runner::CommandRunner;
use async_trait::async_trait;
use std::io;
use std::process::Stdio;
use tokio::process::Command;

/// Spawns the processor as a child process and waits for it.
///
/// Output is inherited from the server so the script's own logging ends up
/// next to ours.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, invocation: &Invocation) -> io::Result<Option<i32>> {
        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .status()
            .await?;

        Ok(status.code())
    }
}
