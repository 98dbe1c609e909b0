//! Launcher implementations
//!
//! Only local execution is built in. Other execution contexts can be added by
//! implementing the [`Launcher`](crate::launcher::Launcher) trait; the invoker
//! tests do exactly that with a recording launcher.

pub mod local;
pub use local::{LocalLauncher, LocalProcessHandle, ProcessEventStream};
