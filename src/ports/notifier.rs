use crate::domain::row::PersistedRow;

/// Best-effort broadcast of accepted submissions.
///
/// `notify` returns immediately. Delivery happens in the background and its
/// outcome is never reported back to the caller.
pub trait Notifier: Send + Sync {
    fn notify(&self, row: &PersistedRow);
}

/// Used when no chat channel is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _row: &PersistedRow) {
        tracing::debug!("chat notifications not configured; skipping");
    }
}
