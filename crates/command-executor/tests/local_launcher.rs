//! Tests for local command execution

use command_executor::{Command, Error, Launcher, LocalLauncher, ProcessEventType, ProcessHandle};
use futures::StreamExt;

#[test]
fn test_basic_echo() {
    futures::executor::block_on(async {
        let cmd = Command::builder("echo").arg("hello world").build();

        let result = LocalLauncher.execute(cmd).await.unwrap();

        assert_eq!(result.status.code, Some(0));
        assert_eq!(result.status.signal, None);
        assert_eq!(result.output, "hello world\n");
    });
}

#[test]
fn test_command_with_env_vars() {
    futures::executor::block_on(async {
        let cmd = Command::builder("sh")
            .arg("-c")
            .arg("echo $TEST_VAR")
            .env("TEST_VAR", "test_value")
            .build();

        let result = LocalLauncher.execute(cmd).await.unwrap();

        assert!(result.status.success());
        assert_eq!(result.output.trim(), "test_value");
    });
}

#[test]
#[cfg(unix)]
fn test_exact_env_hides_parent_vars() {
    futures::executor::block_on(async {
        // cargo exports CARGO_PKG_NAME to test processes; the child must not see it
        let cmd = Command::builder("/bin/sh")
            .arg("-c")
            .arg("echo \"[$CARGO_PKG_NAME][$ONLY]\"")
            .exact_env([("ONLY", "kept")])
            .build();

        let result = LocalLauncher.execute(cmd).await.unwrap();

        assert_eq!(result.output.trim(), "[][kept]");
    });
}

#[test]
fn test_working_directory() {
    futures::executor::block_on(async {
        let dir = tempfile::tempdir().unwrap();
        let expected = dir.path().canonicalize().unwrap();

        let cmd = Command::builder("pwd").current_dir(dir.path()).build();

        let result = LocalLauncher.execute(cmd).await.unwrap();

        assert!(result.status.success());
        let reported = std::path::PathBuf::from(result.output.trim())
            .canonicalize()
            .unwrap();
        assert_eq!(reported, expected);
    });
}

#[test]
fn test_command_not_found() {
    futures::executor::block_on(async {
        let cmd = Command::new("this_command_does_not_exist_12345");

        let err = LocalLauncher.execute(cmd).await.unwrap_err();

        assert!(matches!(err, Error::CommandNotFound { .. }));
        assert!(err.to_string().contains("this_command_does_not_exist_12345"));
    });
}

#[test]
fn test_exit_code_propagation() {
    futures::executor::block_on(async {
        let cmd = Command::builder("sh").arg("-c").arg("exit 42").build();

        let result = LocalLauncher.execute(cmd).await.unwrap();

        assert_eq!(result.status.code, Some(42));
        assert!(!result.status.success());
    });
}

#[test]
fn test_stdout_and_stderr_are_both_streamed() {
    futures::executor::block_on(async {
        let cmd = Command::builder("sh")
            .arg("-c")
            .arg("echo out; echo err 1>&2")
            .build();

        let (mut events, mut handle) = LocalLauncher.launch(cmd).await.unwrap();

        let first = events.next().await.unwrap();
        assert!(matches!(first.event_type, ProcessEventType::Started { .. }));

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        while let Some(event) = events.next().await {
            match event.event_type {
                ProcessEventType::Stdout => stdout.push(event.data.unwrap()),
                ProcessEventType::Stderr => stderr.push(event.data.unwrap()),
                ProcessEventType::Started { .. } => panic!("started twice"),
            }
        }

        assert_eq!(stdout, vec!["out"]);
        assert_eq!(stderr, vec!["err"]);
        assert!(handle.wait().await.unwrap().success());
    });
}

#[test]
#[cfg(unix)]
fn test_terminate_running_process() {
    futures::executor::block_on(async {
        let cmd = Command::builder("sleep").arg("10").build();

        let (_events, mut handle) = LocalLauncher.launch(cmd).await.unwrap();
        assert!(handle.pid().is_some());

        handle.terminate().await.unwrap();
        let status = handle.wait().await.unwrap();

        assert!(!status.success());
        assert_eq!(status.signal, Some(15));
    });
}

#[test]
#[cfg(unix)]
fn test_process_cleanup_on_handle_drop() {
    use nix::sys::signal;
    use nix::unistd::Pid;
    use std::time::Duration;

    smol::block_on(async {
        let cmd = Command::builder("sleep").arg("60").build();

        let (_events, handle) = LocalLauncher.launch(cmd).await.unwrap();
        let pid = handle.pid().unwrap();

        drop(handle);

        smol::Timer::after(Duration::from_millis(200)).await;

        // A killed but unreaped child is a zombie; signal 0 still succeeds for
        // zombies, so check /proc state where it exists.
        let nix_pid = Pid::from_raw(pid as i32);
        let alive = signal::kill(nix_pid, None).is_ok();
        if alive {
            let stat = std::fs::read_to_string(format!("/proc/{pid}/stat")).unwrap_or_default();
            assert!(
                stat.is_empty() || stat.contains(") Z"),
                "process should be killed when handle is dropped"
            );
        }
    });
}

#[test]
#[cfg(unix)]
fn test_invalid_utf8_line_does_not_end_stream() {
    futures::executor::block_on(async {
        let cmd = Command::builder("sh")
            .arg("-c")
            .arg("printf 'caf\\351\\n'; i=0; while [ $i -lt 200 ]; do echo after-$i; i=$((i+1)); done; printf 'tail'")
            .build();

        let result = LocalLauncher.execute(cmd).await.unwrap();

        assert!(result.status.success());
        let lines: Vec<&str> = result.output.lines().collect();
        assert_eq!(lines.len(), 202);
        assert_eq!(lines[0], "caf\u{FFFD}");
        assert_eq!(lines[200], "after-199");
        assert_eq!(lines[201], "tail");
    });
}
