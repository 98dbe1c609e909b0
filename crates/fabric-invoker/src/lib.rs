//! Fabric build step
//!
//! Turns a job's fields plus the global fabric executable into a `fab`
//! command line, runs it, and reports whether it succeeded.
//!
//! ```no_run
//! use fabric_invoker::{CommandInvoker, ExecutionContext, InvocationConfig};
//!
//! let config = InvocationConfig::builder("fab", "deploy_app")
//!     .user("deploy")
//!     .host("10.0.0.1")
//!     .build();
//!
//! let mut output = Vec::<String>::new();
//! let ctx = ExecutionContext::from_current_process(&mut output).unwrap();
//! let ok = CommandInvoker::local().invoke_blocking(&config, ctx);
//! println!("{} ({} lines of output)", ok, output.len());
//! ```

#![warn(missing_docs)]

pub mod cancel;
pub mod config;
pub mod error;
pub mod invoker;
pub mod messages;
pub mod sink;

pub use cancel::CancellationToken;
pub use config::{InvocationConfig, InvocationConfigBuilder, is_blank};
pub use error::InvokeError;
pub use invoker::{CommandInvoker, ExecutionContext};
pub use messages::DISPLAY_NAME;
pub use sink::{OutputSink, WriterSink};
