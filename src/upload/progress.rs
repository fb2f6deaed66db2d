use crate::upload::types::UploadProgress;
use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex,
};
use tokio::sync::mpsc;

type SubscriptionId = u64;

/// Fans bridge-save progress out to any number of subscribers.
///
/// Subscriptions are removed automatically once their receiver is dropped.
/// Events only flow while a bridge save attempt is in flight; the service
/// disarms the upstream channel when the attempt concludes.
#[derive(Clone, Default)]
pub struct UploadProgressHandle {
    subscriptions: Arc<Mutex<HashMap<SubscriptionId, mpsc::UnboundedSender<UploadProgress>>>>,
    next_id: Arc<AtomicU64>,
}

impl UploadProgressHandle {
    pub fn new() -> Self {
        UploadProgressHandle::default()
    }

    /// Subscribe to progress updates for all future save attempts
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<UploadProgress> {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.subscriptions.lock().unwrap().insert(id, tx);
        rx
    }

    /// Deliver an event to every live subscriber, pruning dropped ones
    pub(crate) fn emit(&self, progress: UploadProgress) {
        let mut subs = self.subscriptions.lock().unwrap();
        let mut to_remove = Vec::new();

        for (id, tx) in subs.iter() {
            if tx.send(progress.clone()).is_err() {
                to_remove.push(*id);
            }
        }
        for id in to_remove {
            subs.remove(&id);
        }
    }

    #[cfg(test)]
    fn subscriber_count(&self) -> usize {
        self.subscriptions.lock().unwrap().len()
    }
}
