//! Fire-and-forget user notifications (the toast channel).

use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Progress,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn progress(description: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Progress,
            title: "Working".to_string(),
            description: description.into(),
        }
    }

    pub fn success(description: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: "Saved".to_string(),
            description: description.into(),
        }
    }

    pub fn error(description: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: "Error".to_string(),
            description: description.into(),
        }
    }
}

/// A sink for user-visible messages. Delivery is best effort.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Prints notices for a terminal user: errors to stderr, the rest to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier {
    pub quiet: bool,
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Error => eprintln!("{}: {}", notice.title, notice.description),
            _ if self.quiet => {}
            _ => println!("{}", notice.description),
        }
    }
}

/// Keeps every notice in memory; handy for embedding and for tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|n| n.clone())
            .unwrap_or_default()
    }

    pub fn count(&self, level: NoticeLevel) -> usize {
        self.notices().iter().filter(|n| n.level == level).count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_notifier_counts_levels() {
        let notifier = RecordingNotifier::new();
        notifier.notify(Notice::progress("Processing..."));
        notifier.notify(Notice::error("boom"));
        notifier.notify(Notice::error("again"));

        assert_eq!(notifier.notices().len(), 3);
        assert_eq!(notifier.count(NoticeLevel::Error), 2);
        assert_eq!(notifier.count(NoticeLevel::Success), 0);
    }
}
