//! Local process launcher implementation

use async_process::{Child, Stdio};
use async_trait::async_trait;
use futures::stream::{self, Stream};
use futures_lite::io::{AsyncBufReadExt, AsyncRead, BufReader};
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tracing::debug;

use crate::command::Command;
use crate::error::{Error, Result};
use crate::event::{ProcessEvent, ProcessEventType};
use crate::launcher::Launcher;
use crate::process::{ExitStatus, ProcessHandle};

/// Launcher for executing processes locally
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalLauncher;

/// A handle to control a local process (launched by us)
///
/// Dropping the handle before `wait` has seen the exit kills the child.
pub struct LocalProcessHandle {
    /// The underlying child process
    child: Child,
    /// Set once `wait` has observed the exit
    exited: bool,
}

type LineStream = Pin<Box<dyn Stream<Item = io::Result<String>> + Send>>;

/// Stream of process events
pub struct ProcessEventStream {
    stdout: Option<LineStream>,
    stderr: Option<LineStream>,
    started_sent: bool,
    child_id: u32,
}

#[async_trait]
impl Launcher for LocalLauncher {
    type EventStream = ProcessEventStream;
    type Handle = LocalProcessHandle;

    async fn launch(&self, command: Command) -> Result<(Self::EventStream, Self::Handle)> {
        let mut async_cmd = command.prepare();

        // Both pipes are streamed; the child gets no stdin
        async_cmd.stdout(Stdio::piped());
        async_cmd.stderr(Stdio::piped());
        async_cmd.stdin(Stdio::null());

        let mut child = async_cmd
            .spawn()
            .map_err(|e| Error::from_spawn(command.get_program(), e))?;

        let child_id = child.id();
        debug!(pid = child_id, program = ?command.get_program(), "spawned local process");

        let stdout = child.stdout.take().map(byte_lines);
        let stderr = child.stderr.take().map(byte_lines);

        let events = ProcessEventStream {
            stdout,
            stderr,
            started_sent: false,
            child_id,
        };

        let handle = LocalProcessHandle {
            child,
            exited: false,
        };

        Ok((events, handle))
    }
}

impl LocalProcessHandle {
    #[cfg(unix)]
    fn send_signal(&self, signal: nix::sys::signal::Signal) -> Result<()> {
        use nix::sys::signal;
        use nix::unistd::Pid;

        let pid = Pid::from_raw(self.child.id() as i32);
        signal::kill(pid, signal).map_err(|e| Error::signal_failed(signal as i32, e.to_string()))
    }
}

#[async_trait]
impl ProcessHandle for LocalProcessHandle {
    fn pid(&self) -> Option<u32> {
        Some(self.child.id())
    }

    async fn wait(&mut self) -> Result<ExitStatus> {
        let status = self
            .child
            .status()
            .await
            .map_err(|e| Error::wait_failed(e.to_string()))?;

        self.exited = true;
        Ok(status.into())
    }

    async fn terminate(&mut self) -> Result<()> {
        #[cfg(unix)]
        {
            self.send_signal(nix::sys::signal::Signal::SIGTERM)?;
        }

        #[cfg(not(unix))]
        {
            self.child
                .kill()
                .map_err(|e| Error::signal_failed(-1, e.to_string()))?;
        }

        Ok(())
    }

    async fn kill(&mut self) -> Result<()> {
        #[cfg(unix)]
        {
            self.send_signal(nix::sys::signal::Signal::SIGKILL)?;
        }

        #[cfg(not(unix))]
        {
            self.child
                .kill()
                .map_err(|e| Error::signal_failed(-1, e.to_string()))?;
        }

        Ok(())
    }
}

impl Drop for LocalProcessHandle {
    fn drop(&mut self) {
        if !self.exited {
            // Synchronous kill; the async methods can't run here
            let _ = self.child.kill();
        }
    }
}

/// Newline-delimited lines of `reader`, decoded lossily
///
/// Invalid UTF-8 becomes U+FFFD instead of ending the stream, and a final
/// line without a trailing newline is still yielded.
fn byte_lines<R>(reader: R) -> LineStream
where
    R: AsyncRead + Unpin + Send + 'static,
{
    Box::pin(stream::unfold(BufReader::new(reader), |mut reader| async move {
        let mut buf = Vec::new();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => None,
            Ok(_) => {
                if buf.last() == Some(&b'\n') {
                    buf.pop();
                    if buf.last() == Some(&b'\r') {
                        buf.pop();
                    }
                }
                Some((Ok(String::from_utf8_lossy(&buf).into_owned()), reader))
            }
            Err(e) => Some((Err(e), reader)),
        }
    }))
}

impl ProcessEventStream {
    fn poll_lines(
        lines: &mut Option<LineStream>,
        event_type: ProcessEventType,
        cx: &mut Context<'_>,
    ) -> Option<ProcessEvent> {
        let reader = lines.as_mut()?;
        match reader.as_mut().poll_next(cx) {
            Poll::Ready(Some(Ok(line))) => Some(ProcessEvent::new_with_data(event_type, line)),
            // Only a failed read or EOF retires the pipe
            Poll::Ready(Some(Err(e))) => {
                debug!(error = %e, ?event_type, "output pipe read failed");
                *lines = None;
                None
            }
            Poll::Ready(None) => {
                *lines = None;
                None
            }
            Poll::Pending => None,
        }
    }
}

impl Stream for ProcessEventStream {
    type Item = ProcessEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if !self.started_sent {
            self.started_sent = true;
            let event = ProcessEvent::new(ProcessEventType::Started { pid: self.child_id });
            return Poll::Ready(Some(event));
        }

        let this = &mut *self;

        if let Some(event) = Self::poll_lines(&mut this.stdout, ProcessEventType::Stdout, cx) {
            return Poll::Ready(Some(event));
        }

        if let Some(event) = Self::poll_lines(&mut this.stderr, ProcessEventType::Stderr, cx) {
            return Poll::Ready(Some(event));
        }

        if this.stdout.is_none() && this.stderr.is_none() {
            return Poll::Ready(None);
        }

        Poll::Pending
    }
}
