//! Launcher trait for executing commands

use crate::command::Command;
use crate::error::Result;
use crate::event::ProcessEvent;
use crate::process::{ExitResult, ProcessHandle};
use async_trait::async_trait;
use futures::stream::Stream;

/// Something that can start a [`Command`] as a child process
///
/// The event stream yields a `Started` event followed by one event per
/// stdout/stderr line; it ends once both output pipes are closed. The handle
/// controls the process and reports its exit status.
#[async_trait]
pub trait Launcher: Send + Sync + 'static {
    /// The event stream type this launcher produces
    type EventStream: Stream<Item = ProcessEvent> + Send + Unpin;

    /// The process handle type this launcher produces
    type Handle: ProcessHandle;

    /// Launch a command, returning event stream and control handle
    async fn launch(&self, command: Command) -> Result<(Self::EventStream, Self::Handle)>;

    /// Execute a command and wait for it to complete, capturing output
    async fn execute(&self, command: Command) -> Result<ExitResult> {
        use futures::StreamExt;

        let (mut events, mut handle) = self.launch(command).await?;
        let mut output = String::new();

        while let Some(event) = events.next().await {
            if let Some(line) = event.output_line() {
                output.push_str(line);
                output.push('\n');
            }
        }

        let status = handle.wait().await?;
        Ok(ExitResult { status, output })
    }
}
