//! Runs one [`InvocationConfig`] as a child process

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::pin::pin;

use command_executor::{
    Command, ExitStatus, Launcher, LocalLauncher, ProcessEvent, ProcessHandle,
};
use futures::future::{self, Either};
use futures::{Stream, StreamExt};
use tracing::{debug, info, warn};

use crate::cancel::CancellationToken;
use crate::config::InvocationConfig;
use crate::error::InvokeError;
use crate::sink::OutputSink;

/// Where and how one invocation runs
pub struct ExecutionContext<'a> {
    working_directory: PathBuf,
    environment: HashMap<String, String>,
    output: &'a mut dyn OutputSink,
    cancellation: Option<CancellationToken>,
}

impl<'a> ExecutionContext<'a> {
    /// Run in `working_directory` with exactly `environment`, writing to `output`
    pub fn new(
        working_directory: impl Into<PathBuf>,
        environment: HashMap<String, String>,
        output: &'a mut dyn OutputSink,
    ) -> Self {
        Self {
            working_directory: working_directory.into(),
            environment,
            output,
            cancellation: None,
        }
    }

    /// Current directory and the full environment of this process
    ///
    /// Variables whose name or value isn't valid UTF-8 are skipped.
    pub fn from_current_process(output: &'a mut dyn OutputSink) -> std::io::Result<Self> {
        let environment = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Ok(Self::new(std::env::current_dir()?, environment, output))
    }

    /// Abort the invocation when `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Start the child in `dir` instead
    pub fn in_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = dir.into();
        self
    }

    /// Give the output sink back without running anything
    pub fn into_output(self) -> &'a mut dyn OutputSink {
        self.output
    }

    /// Add or replace one environment variable
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    /// Directory the child starts in
    pub fn working_directory(&self) -> &Path {
        &self.working_directory
    }

    /// The child's complete environment
    pub fn environment(&self) -> &HashMap<String, String> {
        &self.environment
    }
}

/// Validates, launches and waits on fabric invocations
///
/// Holds no per-invocation state, so one invoker can serve concurrent builds.
#[derive(Debug, Clone, Default)]
pub struct CommandInvoker<L = LocalLauncher> {
    launcher: L,
}

impl CommandInvoker<LocalLauncher> {
    /// Invoker that runs fabric as a local child process
    pub fn local() -> Self {
        Self::new(LocalLauncher)
    }
}

impl<L: Launcher> CommandInvoker<L> {
    /// Invoker using `launcher` to start processes
    pub fn new(launcher: L) -> Self {
        Self { launcher }
    }

    /// The process launcher
    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// The command that `config` would run in `ctx`, without running it
    pub fn prepare(
        &self,
        config: &InvocationConfig,
        ctx: &ExecutionContext<'_>,
    ) -> Result<Command, InvokeError> {
        let argv = config.argv()?;
        let (program, args) = argv.split_first().ok_or(InvokeError::ConfigurationMissing)?;

        Ok(Command::builder(program)
            .args(args)
            .exact_env(&ctx.environment)
            .current_dir(&ctx.working_directory)
            .build())
    }

    /// Run `config`, reporting success as a plain boolean
    ///
    /// Never panics and never propagates an error; see
    /// [`try_invoke`](Self::try_invoke) for the reason behind a `false`.
    pub async fn invoke(&self, config: &InvocationConfig, ctx: ExecutionContext<'_>) -> bool {
        match self.try_invoke(config, ctx).await {
            Ok(()) => {
                info!("fabric invocation succeeded");
                true
            }
            Err(err) => {
                info!(error = %err, "fabric invocation failed");
                false
            }
        }
    }

    /// Blocking form of [`invoke`](Self::invoke) for synchronous callers
    pub fn invoke_blocking(&self, config: &InvocationConfig, ctx: ExecutionContext<'_>) -> bool {
        futures::executor::block_on(self.invoke(config, ctx))
    }

    /// Run `config` once and wait for the child to finish
    ///
    /// Validation failures write their diagnostic to the sink and launch
    /// nothing. Child stdout and stderr lines go to the sink as they arrive.
    /// Cancelling the context's token terminates the child and returns
    /// [`InvokeError::InterruptedExecution`]. There are no retries.
    pub async fn try_invoke(
        &self,
        config: &InvocationConfig,
        mut ctx: ExecutionContext<'_>,
    ) -> Result<(), InvokeError> {
        let command = match self.prepare(config, &ctx) {
            Ok(command) => command,
            Err(err) => {
                if let Some(message) = err.diagnostic() {
                    if let Err(e) = ctx.output.write_line(message) {
                        warn!(error = %e, "could not write diagnostic to output sink");
                    }
                }
                return Err(err);
            }
        };

        let ExecutionContext {
            working_directory,
            output,
            cancellation,
            ..
        } = ctx;

        if cancellation.as_ref().is_some_and(CancellationToken::is_cancelled) {
            debug!("cancelled before launch");
            return Err(InvokeError::InterruptedExecution);
        }

        info!(argv = ?command.argv(), dir = %working_directory.display(), "launching fabric");

        let (mut events, mut handle) = self.launcher.launch(command).await.map_err(|e| {
            warn!(error = %e, "failed to launch fabric");
            InvokeError::LaunchFailure(e)
        })?;

        let finished = {
            let run = pin!(drain_and_wait(&mut events, &mut handle, output));
            match &cancellation {
                Some(token) => {
                    let cancelled = pin!(token.cancelled());
                    match future::select(run, cancelled).await {
                        Either::Left((status, _)) => Some(status),
                        Either::Right(_) => None,
                    }
                }
                None => Some(run.await),
            }
        };

        let Some(status) = finished else {
            warn!(pid = ?handle.pid(), "fabric invocation interrupted, stopping child");
            if let Err(e) = handle.terminate().await {
                debug!(error = %e, "terminate failed, killing");
                let _ = handle.kill().await;
            }
            return Err(InvokeError::InterruptedExecution);
        };

        let status = status.map_err(|e| {
            warn!(error = %e, "failed waiting for fabric");
            InvokeError::LaunchFailure(e)
        })?;

        if status.terminated_by_signal() {
            warn!(signal = ?status.signal, "fabric was killed by a signal");
        } else {
            debug!(code = ?status.code, "fabric exited");
        }
        if status.success() {
            Ok(())
        } else {
            Err(InvokeError::NonZeroExit {
                code: status.code,
                signal: status.signal,
            })
        }
    }
}

async fn drain_and_wait<S, H>(
    events: &mut S,
    handle: &mut H,
    output: &mut (dyn OutputSink + '_),
) -> command_executor::Result<ExitStatus>
where
    S: Stream<Item = ProcessEvent> + Unpin,
    H: ProcessHandle,
{
    let mut sink_broken = false;

    // Keep draining after a sink failure so the child never blocks on a full pipe
    while let Some(event) = events.next().await {
        let Some(line) = event.output_line() else {
            continue;
        };
        if sink_broken {
            continue;
        }
        if let Err(e) = output.write_line(line) {
            warn!(error = %e, "output sink rejected a line, discarding further output");
            sink_broken = true;
        }
    }

    handle.wait().await
}
