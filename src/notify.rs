use std::sync::Mutex;

/// Severity of a single operator-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Warning,
    Error,
}

/// The one user-visible side channel of the scheduling workbench.
///
/// Every mutating operation emits exactly one notification through this
/// trait; nothing else about an operation's outcome reaches the operator.
pub trait Notifier {
    fn notify(&self, severity: Severity, message: &str);

    fn success(&self, message: &str) {
        self.notify(Severity::Success, message);
    }

    fn warning(&self, message: &str) {
        self.notify(Severity::Warning, message);
    }

    fn error(&self, message: &str) {
        self.notify(Severity::Error, message);
    }
}

/// Routes notifications to the log, for CLI use.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Success => log::info!("{}", message),
            Severity::Warning => log::warn!("{}", message),
            Severity::Error => log::error!("{}", message),
        }
    }
}

/// Collects notifications in memory; the web handlers drain it into the
/// response body, and tests assert on it.
#[derive(Default)]
pub struct MemoryNotifier {
    messages: Mutex<Vec<(Severity, String)>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        MemoryNotifier::default()
    }

    pub fn drain(&self) -> Vec<(Severity, String)> {
        std::mem::take(&mut *self.messages.lock().unwrap())
    }

    /// The most recent message, if any, without draining.
    pub fn last(&self) -> Option<(Severity, String)> {
        self.messages.lock().unwrap().last().cloned()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, severity: Severity, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push((severity, message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_notifier_records_in_order_and_drains() {
        let sink = MemoryNotifier::new();
        sink.success("loaded 3 schedules");
        sink.warning("Alice is already in that slot");

        assert_eq!(
            sink.last(),
            Some((Severity::Warning, "Alice is already in that slot".to_string()))
        );

        let drained = sink.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].0, Severity::Success);
        assert!(sink.drain().is_empty());
    }
}
