//! Progress and diagnostic reporting

use std::cell::RefCell;
use std::rc::Rc;
use tracing::{error, info, warn};

/// Something observable that happened during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingEvent {
    RunStarted,
    SwrlRule { rendered: String },
    Failure { line: String, fatal: bool },
    RunCompleted,
}

impl MappingEvent {
    /// The line this event is reported as
    pub fn render(&self, tag: &str) -> String {
        match self {
            MappingEvent::RunStarted => format!("{} Beginning ruleset mapping ...", tag),
            MappingEvent::SwrlRule { rendered } => format!("{} Processing SWRL rule: {} ...", tag, rendered),
            MappingEvent::Failure { line, .. } => line.clone(),
            MappingEvent::RunCompleted => format!("{} Ruleset mapping successfully completed.", tag),
        }
    }
}

/// Receives one call per event, in the order events happen
pub trait MappingObserver {
    fn notify(&self, event: &MappingEvent, line: &str);
}

/// Forwards events to `tracing`: failures at error or warn level, progress
/// at info level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl MappingObserver for TracingObserver {
    fn notify(&self, event: &MappingEvent, line: &str) {
        match event {
            MappingEvent::Failure { fatal: true, .. } => error!("{}", line),
            MappingEvent::Failure { fatal: false, .. } => warn!("{}", line),
            _ => info!("{}", line),
        }
    }
}

/// Keeps every reported line. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    lines: Rc<RefCell<Vec<String>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    pub fn clear(&self) {
        self.lines.borrow_mut().clear();
    }
}

impl MappingObserver for RecordingObserver {
    fn notify(&self, _event: &MappingEvent, line: &str) {
        self.lines.borrow_mut().push(line.to_string());
    }
}
