//! User-facing strings

/// Human-readable name of the build step
pub const DISPLAY_NAME: &str = "Invoke Fabric script (fabfile)";

/// Written to the output sink when no fabric executable is configured
pub const PLEASE_CONFIGURE_FABRIC: &str =
    "Please configure the fabric executable (fab) in the global settings";

/// Written to the output sink when the job names no command
pub const NO_COMMAND_SPECIFIED: &str = "No fabric command specified";
