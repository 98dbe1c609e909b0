//! Scripted launcher for exercising the invoker without real processes

#![allow(dead_code)]

use async_trait::async_trait;
use command_executor::{
    Command, Error, ExitStatus, Launcher, ProcessEvent, ProcessEventType, ProcessHandle, Result,
};
use std::sync::{Arc, Mutex};

/// What the next launched "process" does
#[derive(Debug, Clone)]
pub enum Script {
    /// Print `lines` to stdout, then exit with `code`
    Exit { lines: Vec<String>, code: i32 },
    /// Refuse to start
    LaunchFails,
    /// Never exit on its own
    Hang,
}

#[derive(Debug, Default)]
struct State {
    launched: Vec<Command>,
    terminated: bool,
}

/// Records every launched command and plays back a [`Script`]
#[derive(Debug, Clone)]
pub struct RecordingLauncher {
    script: Script,
    state: Arc<Mutex<State>>,
}

impl RecordingLauncher {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            state: Arc::default(),
        }
    }

    pub fn exiting(code: i32) -> Self {
        Self::new(Script::Exit {
            lines: Vec::new(),
            code,
        })
    }

    pub fn printing(lines: &[&str], code: i32) -> Self {
        Self::new(Script::Exit {
            lines: lines.iter().map(|l| l.to_string()).collect(),
            code,
        })
    }

    pub fn launched(&self) -> Vec<Command> {
        self.state.lock().unwrap().launched.clone()
    }

    pub fn launch_count(&self) -> usize {
        self.state.lock().unwrap().launched.len()
    }

    pub fn was_terminated(&self) -> bool {
        self.state.lock().unwrap().terminated
    }
}

pub struct ScriptedHandle {
    status: Option<ExitStatus>,
    state: Arc<Mutex<State>>,
}

#[async_trait]
impl ProcessHandle for ScriptedHandle {
    fn pid(&self) -> Option<u32> {
        Some(4242)
    }

    async fn wait(&mut self) -> Result<ExitStatus> {
        match self.status {
            Some(status) => Ok(status),
            None => futures::future::pending().await,
        }
    }

    async fn terminate(&mut self) -> Result<()> {
        self.state.lock().unwrap().terminated = true;
        Ok(())
    }

    async fn kill(&mut self) -> Result<()> {
        self.terminate().await
    }
}

#[async_trait]
impl Launcher for RecordingLauncher {
    type EventStream = futures::stream::Iter<std::vec::IntoIter<ProcessEvent>>;
    type Handle = ScriptedHandle;

    async fn launch(&self, command: Command) -> Result<(Self::EventStream, Self::Handle)> {
        self.state.lock().unwrap().launched.push(command.clone());

        let mut events = vec![ProcessEvent::new(ProcessEventType::Started { pid: 4242 })];
        let status = match &self.script {
            Script::LaunchFails => {
                return Err(Error::CommandNotFound {
                    command: command.get_program().to_string_lossy().into_owned(),
                });
            }
            Script::Hang => None,
            Script::Exit { lines, code } => {
                events.extend(lines.iter().map(|line| {
                    ProcessEvent::new_with_data(ProcessEventType::Stdout, line.clone())
                }));
                Some(ExitStatus::from_code(*code))
            }
        };

        let handle = ScriptedHandle {
            status,
            state: self.state.clone(),
        };
        Ok((futures::stream::iter(events), handle))
    }
}
