//! End-to-end invocations of a stand-in `fab` script through the local launcher

#![cfg(unix)]

use fabric_invoker::{CancellationToken, CommandInvoker, ExecutionContext, InvocationConfig};
use std::collections::HashMap;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Writes an executable `fab` that echoes its arguments, then exits with $FAB_EXIT
fn fake_fab(dir: &Path) -> PathBuf {
    let path = dir.join("fab");
    std::fs::write(
        &path,
        r#"#!/bin/sh
for arg in "$@"; do echo "arg:$arg"; done
echo "pwd:$(pwd -P)"
echo "stage:$DEPLOY_STAGE"
echo "warning on stderr" 1>&2
exit "${FAB_EXIT:-0}"
"#,
    )
    .unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn process_env() -> HashMap<String, String> {
    std::env::vars().collect()
}

#[test]
fn test_runs_fab_with_synthesized_arguments() {
    let tools = tempfile::tempdir().unwrap();
    let workspace = tempfile::tempdir().unwrap();
    let fab = fake_fab(tools.path());

    let config = InvocationConfig::builder(fab.to_str().unwrap(), "deploy_app")
        .user("deploy")
        .host("10.0.0.1")
        .build();

    let mut output: Vec<String> = Vec::new();
    let ctx = ExecutionContext::new(workspace.path(), process_env(), &mut output)
        .with_env("DEPLOY_STAGE", "staging");
    let ok = CommandInvoker::local().invoke_blocking(&config, ctx);

    assert!(ok, "output: {output:?}");
    assert!(output.contains(&"arg:--user=deploy".to_string()));
    assert!(output.contains(&"arg:--host=10.0.0.1".to_string()));
    assert!(output.contains(&"arg:deploy_app".to_string()));
    assert!(output.contains(&"stage:staging".to_string()));
    assert!(output.contains(&"warning on stderr".to_string()));

    let args: Vec<_> = output.iter().filter(|l| l.starts_with("arg:")).collect();
    assert_eq!(args, ["arg:--user=deploy", "arg:--host=10.0.0.1", "arg:deploy_app"]);

    let expected_pwd = format!("pwd:{}", workspace.path().canonicalize().unwrap().display());
    assert!(output.contains(&expected_pwd), "output: {output:?}");
}

#[test]
fn test_nonzero_exit_is_failure() {
    let tools = tempfile::tempdir().unwrap();
    let fab = fake_fab(tools.path());
    let config = InvocationConfig::builder(fab.to_str().unwrap(), "restart")
        .role("web")
        .build();

    let mut output: Vec<String> = Vec::new();
    let ctx = ExecutionContext::new(tools.path(), process_env(), &mut output).with_env("FAB_EXIT", "3");

    assert!(!CommandInvoker::local().invoke_blocking(&config, ctx));
    // The child's own output is still delivered
    assert!(output.contains(&"arg:--roles=web".to_string()));
}

#[test]
fn test_missing_executable_is_failure_not_panic() {
    let dir = tempfile::tempdir().unwrap();
    let config =
        InvocationConfig::builder(dir.path().join("no-such-fab").to_str().unwrap(), "deploy")
            .build();

    let mut output: Vec<String> = Vec::new();
    let ctx = ExecutionContext::new(dir.path(), process_env(), &mut output);

    assert!(!CommandInvoker::local().invoke_blocking(&config, ctx));
}

#[test]
fn test_missing_working_directory_is_failure() {
    let tools = tempfile::tempdir().unwrap();
    let fab = fake_fab(tools.path());
    let config = InvocationConfig::builder(fab.to_str().unwrap(), "deploy").build();

    let mut output: Vec<String> = Vec::new();
    let ctx = ExecutionContext::new(tools.path().join("gone"), process_env(), &mut output);

    assert!(!CommandInvoker::local().invoke_blocking(&config, ctx));
}

#[test]
fn test_cancel_stops_long_running_child() {
    let tools = tempfile::tempdir().unwrap();
    let slow = tools.path().join("fab");
    std::fs::write(&slow, "#!/bin/sh\necho started\nexec sleep 30\n").unwrap();
    std::fs::set_permissions(&slow, std::fs::Permissions::from_mode(0o755)).unwrap();

    let config = InvocationConfig::builder(slow.to_str().unwrap(), "deploy").build();
    let token = CancellationToken::new();
    let remote = token.clone();

    let canceller = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(300));
        remote.cancel();
    });

    let started = Instant::now();
    let mut output: Vec<String> = Vec::new();
    let ctx = ExecutionContext::new(tools.path(), process_env(), &mut output)
        .with_cancellation(token);
    let ok = smol::block_on(CommandInvoker::local().invoke(&config, ctx));
    canceller.join().unwrap();

    assert!(!ok);
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[test]
fn test_non_utf8_and_unterminated_output_reach_the_sink() {
    let tools = tempfile::tempdir().unwrap();
    let fab = tools.path().join("fab");
    std::fs::write(
        &fab,
        r#"#!/bin/sh
printf 'caf\351\n'
printf 'r\303\251sum\303\251\n' 1>&2
i=0
while [ $i -lt 200 ]; do echo "after-$i"; i=$((i+1)); done
printf 'no newline'
"#,
    )
    .unwrap();
    std::fs::set_permissions(&fab, std::fs::Permissions::from_mode(0o755)).unwrap();

    let config = InvocationConfig::builder(fab.to_str().unwrap(), "deploy").build();
    let mut output: Vec<String> = Vec::new();
    let ctx = ExecutionContext::new(tools.path(), process_env(), &mut output);

    let ok = CommandInvoker::local().invoke_blocking(&config, ctx);

    assert!(ok, "output: {output:?}");
    assert_eq!(output.len(), 203, "output: {output:?}");
    assert!(output.contains(&"caf\u{FFFD}".to_string()));
    assert!(output.contains(&"résumé".to_string()));
    let after = output.iter().position(|l| l == "after-199").unwrap();
    let tail = output.iter().position(|l| l == "no newline").unwrap();
    assert!(after < tail, "output: {output:?}");
}
