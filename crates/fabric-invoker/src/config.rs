//! The immutable record describing one fabric invocation, and its argv

use crate::error::InvokeError;
use fabric_config::{FabricSettings, JobDefinition};

/// True for empty or whitespace-only strings
pub fn is_blank(value: &str) -> bool {
    value.chars().all(char::is_whitespace)
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !is_blank(v))
}

/// Everything needed to build one `fab` command line
///
/// Built once through [`InvocationConfig::builder`] or
/// [`InvocationConfig::from_job`]; there are no setters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationConfig {
    executable_path: String,
    fabfile: Option<String>,
    user: Option<String>,
    host: Option<String>,
    role: Option<String>,
    command: String,
}

impl InvocationConfig {
    /// Start a config for running `command` with the tool at `executable_path`
    pub fn builder(
        executable_path: impl Into<String>,
        command: impl Into<String>,
    ) -> InvocationConfigBuilder {
        InvocationConfigBuilder(InvocationConfig {
            executable_path: executable_path.into(),
            fabfile: None,
            user: None,
            host: None,
            role: None,
            command: command.into(),
        })
    }

    /// Combine the global settings with one job's fields
    ///
    /// Unset required values become empty strings, so the failure surfaces
    /// (with its diagnostic) when the config is invoked.
    pub fn from_job(settings: &FabricSettings, job: &JobDefinition) -> Self {
        Self {
            executable_path: settings.fabric_executable.clone().unwrap_or_default(),
            fabfile: job.fabfile.clone(),
            user: job.user.clone(),
            host: job.host.clone(),
            role: job.role.clone(),
            command: job.command.clone().unwrap_or_default(),
        }
    }

    /// Path or name of the fabric binary
    pub fn executable_path(&self) -> &str {
        &self.executable_path
    }

    /// Deployment script, if set
    pub fn fabfile(&self) -> Option<&str> {
        self.fabfile.as_deref()
    }

    /// Remote user, if set
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Remote host, if set
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// Target role, if set
    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    /// Task name
    pub fn command(&self) -> &str {
        &self.command
    }

    /// The argument vector, program first
    ///
    /// `<exe> [--fabfile=F] [--user=U] [--host=H] [--roles=R] <command>`.
    /// Optional flags appear only for non-blank fields, always in this order.
    /// Values are passed through untrimmed.
    pub fn argv(&self) -> Result<Vec<String>, InvokeError> {
        if is_blank(&self.executable_path) {
            return Err(InvokeError::ConfigurationMissing);
        }
        if is_blank(&self.command) {
            return Err(InvokeError::CommandMissing);
        }

        let mut argv = vec![self.executable_path.clone()];
        if let Some(fabfile) = present(&self.fabfile) {
            argv.push(format!("--fabfile={fabfile}"));
        }
        if let Some(user) = present(&self.user) {
            argv.push(format!("--user={user}"));
        }
        if let Some(host) = present(&self.host) {
            argv.push(format!("--host={host}"));
        }
        // fab's flag is plural even though the field holds one role
        if let Some(role) = present(&self.role) {
            argv.push(format!("--roles={role}"));
        }
        argv.push(self.command.clone());

        Ok(argv)
    }
}

/// Chained construction for [`InvocationConfig`]
#[derive(Debug, Clone)]
pub struct InvocationConfigBuilder(InvocationConfig);

impl InvocationConfigBuilder {
    /// Set the deployment script
    pub fn fabfile(mut self, fabfile: impl Into<String>) -> Self {
        self.0.fabfile = Some(fabfile.into());
        self
    }

    /// Set the remote user
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.0.user = Some(user.into());
        self
    }

    /// Set the remote host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.0.host = Some(host.into());
        self
    }

    /// Set the target role
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.0.role = Some(role.into());
        self
    }

    /// Finish
    pub fn build(self) -> InvocationConfig {
        self.0
    }
}
