use flume::{Receiver, Sender, TrySendError};
use tracing::debug;

/// Single-slot snapshot request shared between producers and the main loop
///
/// At most one request is pending; requests made while one is pending
/// collapse into it.
#[derive(Clone)]
pub struct SnapshotTrigger {
    tx: Sender<()>,
    rx: Receiver<()>,
}

impl SnapshotTrigger {
    pub fn new() -> Self {
        let (tx, rx) = flume::bounded(1);
        Self { tx, rx }
    }

    /// Ask for a snapshot; never blocks
    pub fn request(&self) {
        match self.tx.try_send(()) {
            Ok(()) => debug!("Snapshot requested"),
            Err(TrySendError::Full(())) => debug!("Snapshot already pending"),
            // We hold a receiver ourselves, so the channel cannot disconnect
            Err(TrySendError::Disconnected(())) => {}
        }
    }

    /// Consume the pending request, if any
    pub fn take(&self) -> bool {
        self.rx.try_recv().is_ok()
    }

    pub fn is_pending(&self) -> bool {
        !self.rx.is_empty()
    }
}

impl Default for SnapshotTrigger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_consumes_request() {
        let trigger = SnapshotTrigger::new();
        assert!(!trigger.take());
        trigger.request();
        assert!(trigger.is_pending());
        assert!(trigger.take());
        assert!(!trigger.take());
    }

    #[test]
    fn pending_requests_collapse() {
        let trigger = SnapshotTrigger::new();
        trigger.request();
        trigger.request();
        trigger.request();
        assert!(trigger.take());
        assert!(!trigger.take());
    }

    #[test]
    fn clones_share_the_slot() {
        let trigger = SnapshotTrigger::new();
        let producer = trigger.clone();
        std::thread::spawn(move || producer.request()).join().unwrap();
        assert!(trigger.take());
    }
}
