//! Raw process events

/// A raw event from a process
#[derive(Debug, Clone)]
pub struct ProcessEvent {
    /// The type of event
    pub event_type: ProcessEventType,
    /// Optional data associated with the event
    pub data: Option<String>,
}

impl ProcessEvent {
    /// Create a new process event
    pub fn new(event_type: ProcessEventType) -> Self {
        Self {
            event_type,
            data: None,
        }
    }

    /// Create a new process event with data
    pub fn new_with_data(event_type: ProcessEventType, data: String) -> Self {
        Self {
            event_type,
            data: Some(data),
        }
    }

    /// The output line carried by this event, if it is a stdout/stderr line
    pub fn output_line(&self) -> Option<&str> {
        match self.event_type {
            ProcessEventType::Stdout | ProcessEventType::Stderr => self.data.as_deref(),
            ProcessEventType::Started { .. } => None,
        }
    }
}

/// Types of raw process events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEventType {
    /// Process has started
    Started {
        /// OS process id
        pid: u32,
    },
    /// Log line from stdout
    Stdout,
    /// Log line from stderr
    Stderr,
}
