use std::sync::atomic::{AtomicU64, Ordering};

/// Produces correlation tokens unique for the life of the process.
///
/// A monotonic counter combined with wall-clock millis; uniqueness is the
/// requirement here, not unpredictability.
#[derive(Default)]
pub(crate) struct RequestIdGenerator {
    counter: AtomicU64,
}

impl RequestIdGenerator {
    pub fn new() -> Self {
        RequestIdGenerator::default()
    }

    pub fn next(&self) -> String {
        let count = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let millis = chrono::Utc::now().timestamp_millis();
        format!("req_{}_{}", count, millis)
    }
}
