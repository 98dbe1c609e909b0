use anyhow::{Context, Result, anyhow};
use clap::Args;
use fabric_config::{GlobalSettings, JobDefinition, SettingsStore};
use fabric_invoker::{
    CancellationToken, CommandInvoker, ExecutionContext, InvocationConfig, OutputSink, WriterSink,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Task to run (overrides the job file)
    pub command: Option<String>,

    /// YAML job file with fabfile/command/user/host/role
    #[arg(long)]
    pub job: Option<PathBuf>,

    /// Deployment script passed as --fabfile
    #[arg(long)]
    pub fabfile: Option<String>,

    /// Remote login user
    #[arg(long)]
    pub user: Option<String>,

    /// Remote target host
    #[arg(long)]
    pub host: Option<String>,

    /// Target role, passed to fab as --roles
    #[arg(long)]
    pub role: Option<String>,

    /// Fabric executable for this run only (default: global settings)
    #[arg(long)]
    pub executable: Option<String>,

    /// Directory to run in (default: current directory)
    #[arg(long)]
    pub workdir: Option<PathBuf>,

    /// Extra environment variable for the child, KEY=VALUE
    #[arg(long = "env", value_parser = parse_key_val)]
    pub env: Vec<(String, String)>,

    /// Print the command line instead of running it
    #[arg(long)]
    pub dry_run: bool,
}

impl RunArgs {
    fn overrides(&self) -> JobDefinition {
        JobDefinition {
            fabfile: self.fabfile.clone(),
            command: self.command.clone(),
            user: self.user.clone(),
            host: self.host.clone(),
            role: self.role.clone(),
        }
    }
}

fn parse_key_val(s: &str) -> Result<(String, String)> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| anyhow!("expected KEY=VALUE, got '{s}'"))?;
    if key.is_empty() {
        return Err(anyhow!("empty variable name in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

pub async fn run(settings_path: &Path, args: RunArgs) -> Result<bool> {
    let global = GlobalSettings::load(SettingsStore::new(settings_path))
        .with_context(|| format!("Failed to load settings from {}", settings_path.display()))?;
    let mut settings = global.snapshot();
    if let Some(executable) = &args.executable {
        settings.fabric_executable = Some(executable.clone());
    }

    let job = super::load_job(args.job.as_deref(), args.overrides())?;
    let config = InvocationConfig::from_job(&settings, &job);
    debug!(?config, "resolved invocation");

    let mut sink = WriterSink::new(std::io::stdout());
    let mut ctx = ExecutionContext::from_current_process(&mut sink)
        .context("Failed to read the current directory")?;
    if let Some(workdir) = &args.workdir {
        ctx = ctx.in_directory(workdir);
    }
    for (key, value) in &args.env {
        ctx = ctx.with_env(key, value);
    }

    let invoker = CommandInvoker::local();

    if args.dry_run {
        return Ok(dry_run(&invoker, &config, ctx));
    }

    let token = CancellationToken::new();
    install_signal_handlers(token.clone())?;

    info!("{}", fabric_invoker::DISPLAY_NAME);
    Ok(invoker.invoke(&config, ctx.with_cancellation(token)).await)
}

fn dry_run(invoker: &CommandInvoker, config: &InvocationConfig, ctx: ExecutionContext<'_>) -> bool {
    match invoker.prepare(config, &ctx) {
        Ok(command) => {
            println!("{}", render_argv(&command.argv()));
            true
        }
        Err(err) => {
            if let Some(message) = err.diagnostic() {
                if let Err(e) = ctx.into_output().write_line(message) {
                    warn!(error = %e, "could not write diagnostic to output sink");
                }
            }
            false
        }
    }
}

/// Quote each argument so leading or trailing spaces stay visible
fn render_argv(argv: &[String]) -> String {
    argv.iter()
        .map(|arg| format!("{arg:?}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(unix)]
fn install_signal_handlers(token: CancellationToken) -> Result<()> {
    use signal_hook::{
        consts::{SIGINT, SIGTERM},
        iterator::Signals,
    };

    let mut signals =
        Signals::new([SIGINT, SIGTERM]).context("Failed to register signal handler")?;

    std::thread::spawn(move || {
        #[allow(clippy::never_loop)]
        for sig in signals.forever() {
            info!(signal = sig, "received signal, cancelling fabric invocation");
            token.cancel();
            break;
        }
    });

    Ok(())
}

#[cfg(not(unix))]
fn install_signal_handlers(_token: CancellationToken) -> Result<()> {
    Ok(())
}
