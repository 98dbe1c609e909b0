//! Field validators for job inputs
//!
//! These check for zero length only. A whitespace-only value passes here even
//! though the invoker treats it as missing at run time.

use crate::job::JobDefinition;
use std::fmt;

/// Message attached to an empty required field
pub const MUST_NOT_BE_EMPTY: &str = "must not be empty";

/// Outcome of checking one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValidation {
    /// The value is acceptable
    Ok,
    /// The value is rejected, with a message for the user
    Error(String),
}

impl FormValidation {
    /// True for [`FormValidation::Ok`]
    pub fn is_ok(&self) -> bool {
        matches!(self, FormValidation::Ok)
    }

    fn non_empty(value: &str) -> Self {
        if value.is_empty() {
            FormValidation::Error(MUST_NOT_BE_EMPTY.to_string())
        } else {
            FormValidation::Ok
        }
    }
}

impl fmt::Display for FormValidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormValidation::Ok => f.write_str("ok"),
            FormValidation::Error(message) => write!(f, "error: {message}"),
        }
    }
}

/// Check the `command` field
pub fn validate_command(value: &str) -> FormValidation {
    FormValidation::non_empty(value)
}

/// Check the `fabfile` field
pub fn validate_fabfile(value: &str) -> FormValidation {
    FormValidation::non_empty(value)
}

/// Run every field validator over `job`, treating an unset field as empty
pub fn validate_job(job: &JobDefinition) -> Vec<(&'static str, FormValidation)> {
    vec![
        ("command", validate_command(job.command.as_deref().unwrap_or_default())),
        ("fabfile", validate_fabfile(job.fabfile.as_deref().unwrap_or_default())),
    ]
}
