//! User-facing notification sink.
//!
//! Cart operations report every outcome to a [`Notifier`] in addition to
//! their typed result. Delivery is fire-and-forget; the cart never observes
//! whether a message reached the user.

use tracing::{error, info};

/// Fire-and-forget user-facing message sink.
pub trait Notifier: Send + Sync {
    /// Deliver an informational message.
    fn info(&self, message: &str);

    /// Deliver an error message.
    fn error(&self, message: &str);
}

/// Notifier that emits through `tracing`.
///
/// Stands in for a real delivery channel when the cart runs headless.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn info(&self, message: &str) {
        info!(target: "marmalade_cart::notify", "{message}");
    }

    fn error(&self, message: &str) {
        error!(target: "marmalade_cart::notify", "{message}");
    }
}

/// Recording notifier for tests and doc examples.
pub mod mock {
    use std::sync::Mutex;

    use super::Notifier;

    /// Severity of a recorded message.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Severity {
        Info,
        Error,
    }

    /// Notifier that records every message for later assertions.
    #[derive(Debug, Default)]
    pub struct RecordingNotifier {
        messages: Mutex<Vec<(Severity, String)>>,
    }

    impl RecordingNotifier {
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// All recorded messages in delivery order.
        #[must_use]
        pub fn messages(&self) -> Vec<(Severity, String)> {
            self.messages.lock().expect("notifier lock poisoned").clone()
        }

        /// Error messages only, in delivery order.
        #[must_use]
        pub fn errors(&self) -> Vec<String> {
            self.messages()
                .into_iter()
                .filter(|(severity, _)| *severity == Severity::Error)
                .map(|(_, message)| message)
                .collect()
        }

        /// Info messages only, in delivery order.
        #[must_use]
        pub fn infos(&self) -> Vec<String> {
            self.messages()
                .into_iter()
                .filter(|(severity, _)| *severity == Severity::Info)
                .map(|(_, message)| message)
                .collect()
        }

        /// Discard everything recorded so far.
        pub fn clear(&self) {
            self.messages.lock().expect("notifier lock poisoned").clear();
        }
    }

    impl Notifier for RecordingNotifier {
        fn info(&self, message: &str) {
            self.messages
                .lock()
                .expect("notifier lock poisoned")
                .push((Severity::Info, message.to_string()));
        }

        fn error(&self, message: &str) {
            self.messages
                .lock()
                .expect("notifier lock poisoned")
                .push((Severity::Error, message.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::{RecordingNotifier, Severity};
    use super::*;

    #[test]
    fn test_recording_notifier_keeps_delivery_order() {
        let notifier = RecordingNotifier::new();
        notifier.info("added");
        notifier.error("out of stock");
        notifier.info("removed");

        let messages = notifier.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0], (Severity::Info, "added".to_string()));
        assert_eq!(messages[1], (Severity::Error, "out of stock".to_string()));
        assert_eq!(notifier.errors(), vec!["out of stock".to_string()]);
        assert_eq!(notifier.infos().len(), 2);
    }
}
