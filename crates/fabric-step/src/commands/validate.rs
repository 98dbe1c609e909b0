use anyhow::Result;
use clap::Args;
use fabric_config::{JobDefinition, validation};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// YAML job file to check
    #[arg(long)]
    pub job: Option<PathBuf>,

    /// Command value to check (overrides the job file)
    #[arg(long)]
    pub command: Option<String>,

    /// Fabfile value to check (overrides the job file)
    #[arg(long)]
    pub fabfile: Option<String>,
}

pub fn run(args: ValidateArgs) -> Result<bool> {
    let job = super::load_job(
        args.job.as_deref(),
        JobDefinition {
            command: args.command,
            fabfile: args.fabfile,
            ..Default::default()
        },
    )?;

    let mut all_ok = true;
    for (field, result) in validation::validate_job(&job) {
        match result {
            validation::FormValidation::Ok => println!("✓ {}", field),
            validation::FormValidation::Error(message) => {
                println!("✗ {}: {}", field, message);
                all_ok = false;
            }
        }
    }

    Ok(all_ok)
}
