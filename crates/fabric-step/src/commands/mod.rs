pub mod config;
pub mod run;
pub mod validate;

use fabric_config::{JobDefinition, job};
use std::path::Path;

use anyhow::{Context, Result};

/// Job file contents (if any) with command-line values layered on top
pub fn load_job(path: Option<&Path>, overrides: JobDefinition) -> Result<JobDefinition> {
    let base = match path {
        Some(path) => job::parse_file(path)
            .with_context(|| format!("Failed to load job file {}", path.display()))?,
        None => JobDefinition::default(),
    };
    Ok(base.overlay(overrides))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_job_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.yaml");
        std::fs::write(&path, "command: deploy\nhost: old-host\n").unwrap();

        let job = load_job(
            Some(&path),
            JobDefinition {
                host: Some("new-host".into()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(job.command.as_deref(), Some("deploy"));
        assert_eq!(job.host.as_deref(), Some("new-host"));
    }

    #[test]
    fn test_missing_job_file_names_path() {
        let err = load_job(Some(Path::new("/no/such/job.yaml")), JobDefinition::default())
            .unwrap_err();
        assert!(err.to_string().contains("/no/such/job.yaml"));
    }
}
