//! Messages from the batch worker to whoever is presenting it.

use tokio::sync::mpsc::UnboundedSender;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub level: LogLevel,
    pub message: String,
}

#[derive(Debug, Clone)]
pub enum BatchEvent {
    Started { total: usize },
    /// Replaces the single-line status text.
    Status(String),
    /// Appended to the log.
    Log(LogLine),
    /// `done` items out of `total` have been processed, whatever their outcome.
    Progress { done: usize, total: usize },
    /// Sent once, after the last item and before the run lock is released.
    Finished {
        completed: usize,
        skipped: usize,
        failed: usize,
    },
}

/// Sending half of the event channel. The worker is its only owner.
///
/// A closed receiver is not an error: the batch keeps running without an audience.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: UnboundedSender<BatchEvent>,
}

impl EventSink {
    pub fn new(tx: UnboundedSender<BatchEvent>) -> Self {
        Self { tx }
    }

    pub fn emit(&self, event: BatchEvent) {
        let _ = self.tx.send(event);
    }

    pub fn status(&self, text: impl Into<String>) {
        self.emit(BatchEvent::Status(text.into()));
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    fn log(&self, level: LogLevel, message: impl Into<String>) {
        self.emit(BatchEvent::Log(LogLine {
            level,
            message: message.into(),
        }));
    }
}
