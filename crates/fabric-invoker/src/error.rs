//! Failure taxonomy for one invocation

use crate::messages;
use thiserror::Error;

/// Why an invocation did not succeed
#[derive(Debug, Error)]
pub enum InvokeError {
    /// The fabric executable is unset or blank
    #[error("{}", messages::PLEASE_CONFIGURE_FABRIC)]
    ConfigurationMissing,

    /// The command is unset or blank
    #[error("{}", messages::NO_COMMAND_SPECIFIED)]
    CommandMissing,

    /// The process could not be started or waited on
    #[error("could not run fabric: {0}")]
    LaunchFailure(#[source] command_executor::Error),

    /// Cancelled while the child was running
    #[error("fabric invocation was interrupted")]
    InterruptedExecution,

    /// The child ran and reported failure
    #[error("fabric exited unsuccessfully (code {code:?}, signal {signal:?})")]
    NonZeroExit {
        /// Exit code, if it exited normally
        code: Option<i32>,
        /// Terminating signal, if any
        signal: Option<i32>,
    },
}

impl InvokeError {
    /// Line to write to the output sink, for failures that guarantee one
    pub fn diagnostic(&self) -> Option<&'static str> {
        match self {
            InvokeError::ConfigurationMissing => Some(messages::PLEASE_CONFIGURE_FABRIC),
            InvokeError::CommandMissing => Some(messages::NO_COMMAND_SPECIFIED),
            _ => None,
        }
    }
}
