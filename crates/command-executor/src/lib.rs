//! Runtime-agnostic command execution library
//!
//! This crate is the process-launch boundary: build a [`Command`], hand it to a
//! [`Launcher`], then consume the line-oriented [`ProcessEvent`] stream and wait
//! on the [`ProcessHandle`] for the exit status.

#![warn(missing_docs)]

pub mod backends;
pub mod command;
pub mod error;
pub mod event;
pub mod launcher;
pub mod process;

pub use backends::LocalLauncher;
pub use command::{Command, CommandBuilder};
pub use error::{Error, Result};
pub use event::{ProcessEvent, ProcessEventType};
pub use launcher::Launcher;
pub use process::{ExitResult, ExitStatus, ProcessHandle};
