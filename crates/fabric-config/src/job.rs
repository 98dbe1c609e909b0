//! Per-job field records and their YAML form

use crate::{ConfigError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env reference pattern is valid"));

/// The fields a user fills in for one fabric build step
///
/// Every field is optional here; whether a missing field is acceptable is
/// decided by the validators and by the invoker, not by parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobDefinition {
    /// Deployment script passed as `--fabfile`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fabfile: Option<String>,

    /// Task to run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Remote login user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// Remote target host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// Target role, passed as `--roles`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl JobDefinition {
    /// Fields set in `overrides` replace ours
    pub fn overlay(self, overrides: JobDefinition) -> Self {
        Self {
            fabfile: overrides.fabfile.or(self.fabfile),
            command: overrides.command.or(self.command),
            user: overrides.user.or(self.user),
            host: overrides.host.or(self.host),
            role: overrides.role.or(self.role),
        }
    }

    fn fields_mut(&mut self) -> [&mut Option<String>; 5] {
        [
            &mut self.fabfile,
            &mut self.command,
            &mut self.user,
            &mut self.host,
            &mut self.role,
        ]
    }
}

/// Parse a YAML job file
pub fn parse_file(path: impl AsRef<Path>) -> Result<JobDefinition> {
    let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
    parse_str(&content)
}

/// Parse a YAML job definition, expanding `${VAR}` references in every field
pub fn parse_str(content: &str) -> Result<JobDefinition> {
    let mut job: JobDefinition = serde_yaml::from_str(content)?;
    for field in job.fields_mut() {
        if let Some(value) = field.as_mut() {
            *value = substitute_env_vars(value)?;
        }
    }
    Ok(job)
}

/// Substitute environment variables in a string
///
/// `${VAR}` must be set; `${VAR:-default}` falls back to `default`.
pub fn substitute_env_vars(input: &str) -> Result<String> {
    let mut errors = Vec::new();

    // Single pass: substituted values are never expanded again
    let result = ENV_REF.replace_all(input, |cap: &regex::Captures<'_>| {
        let var_expr = &cap[1];
        let (var_name, default_value) = match var_expr.split_once(":-") {
            Some((name, default)) => (name, Some(default)),
            None => (var_expr, None),
        };

        match (std::env::var(var_name), default_value) {
            (Ok(value), _) => value,
            (Err(_), Some(default)) => default.to_string(),
            (Err(_), None) => {
                errors.push(var_name.to_string());
                String::new()
            }
        }
    });

    if !errors.is_empty() {
        return Err(ConfigError::EnvVarNotFound(errors.join(", ")));
    }

    Ok(result.into_owned())
}
