use anyhow::{Context, Result, bail};
use clap::Subcommand;
use fabric_config::{FabricSettings, GlobalSettings, SettingsStore};
use fabric_invoker::is_blank;
use std::path::Path;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the current settings
    Show,

    /// Print the settings file location
    Path,

    /// Set the default fabric executable
    SetExecutable {
        /// Path or name of the fab binary
        executable: String,
    },
}

pub fn run(settings_path: &Path, command: ConfigCommands) -> Result<bool> {
    let global = GlobalSettings::load(SettingsStore::new(settings_path))
        .with_context(|| format!("Failed to load settings from {}", settings_path.display()))?;

    match command {
        ConfigCommands::Show => {
            let settings = global.snapshot();
            println!("Settings: {}", global.store().path().display());
            match settings.fabric_executable.as_deref() {
                Some(exe) if !is_blank(exe) => println!("  fabric executable: {}", exe),
                _ => println!("  fabric executable: (not configured)"),
            }
        }
        ConfigCommands::Path => println!("{}", global.store().path().display()),
        ConfigCommands::SetExecutable { executable } => {
            if is_blank(&executable) {
                bail!("fabric executable must not be blank");
            }
            global
                .save(FabricSettings::with_executable(executable))
                .context("Failed to save settings")?;
            println!("✓ Saved {}", global.store().path().display());
        }
    }

    Ok(true)
}
