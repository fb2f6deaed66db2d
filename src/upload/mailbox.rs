use crate::upload::types::{
    HandshakePayload, ProgressPayload, SaveResultPayload, UploadProgress, UploadResult,
};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

/// Handshake round-trip outcome, already fail-closed by the listener
#[derive(Debug)]
pub(crate) struct HandshakeOutcome {
    pub supported: bool,
    pub version: Option<String>,
    pub capabilities: Vec<String>,
}

/// Bridge save outcome as resolved by the listener
#[derive(Debug)]
pub(crate) struct SaveOutcome {
    pub success: bool,
    pub song_id: Option<String>,
    pub error: Option<String>,
}

struct Pending<T> {
    request_id: String,
    tx: oneshot::Sender<T>,
}

#[derive(Default)]
struct Slots {
    handshake: Option<Pending<HandshakeOutcome>>,
    save: Option<Pending<SaveOutcome>>,
    progress: Option<mpsc::UnboundedSender<UploadProgress>>,
    legacy: Option<oneshot::Sender<UploadResult>>,
    last_save_ack: Option<String>,
}

/// Correlation mailbox between the orchestrator and the transport callbacks.
///
/// One single-slot channel per operation kind; arming a slot replaces
/// whatever a previous attempt left behind, so a stale completion can never
/// be mistaken for the new request's. A completion arriving after its
/// receiver was dropped (timeout) lands on a closed channel and is discarded.
pub(crate) struct Mailbox {
    slots: Arc<Mutex<Slots>>,
}

impl Mailbox {
    pub fn new() -> Self {
        Mailbox {
            slots: Arc::new(Mutex::new(Slots::default())),
        }
    }

    /// Inbound half, handed to transport glue
    pub fn listener(&self) -> UploadListener {
        UploadListener {
            slots: self.slots.clone(),
        }
    }

    /// Clear the handshake slot and arm it for `request_id`.
    /// Call immediately before sending the handshake request.
    pub fn arm_handshake(&self, request_id: &str) -> oneshot::Receiver<HandshakeOutcome> {
        let (tx, rx) = oneshot::channel();
        self.slots.lock().unwrap().handshake = Some(Pending {
            request_id: request_id.to_string(),
            tx,
        });
        rx
    }

    /// Clear the save and progress slots and arm them for `request_id`.
    /// Call immediately before sending the bridge save request.
    pub fn arm_save(
        &self,
        request_id: &str,
    ) -> (
        oneshot::Receiver<SaveOutcome>,
        mpsc::UnboundedReceiver<UploadProgress>,
    ) {
        let (tx, rx) = oneshot::channel();
        let (progress_tx, progress_rx) = mpsc::unbounded_channel();
        let mut slots = self.slots.lock().unwrap();
        slots.save = Some(Pending {
            request_id: request_id.to_string(),
            tx,
        });
        slots.progress = Some(progress_tx);
        slots.last_save_ack = None;
        (rx, progress_rx)
    }

    /// Disarm the save and progress slots once a bridge attempt has concluded
    /// (success, failure or timeout); progress must not fire afterwards.
    pub fn conclude_save(&self) {
        let mut slots = self.slots.lock().unwrap();
        slots.save = None;
        slots.progress = None;
    }

    /// Clear and arm the legacy result slot.
    /// Call immediately before sending the legacy save request.
    pub fn arm_legacy(&self) -> oneshot::Receiver<UploadResult> {
        let (tx, rx) = oneshot::channel();
        self.slots.lock().unwrap().legacy = Some(tx);
        rx
    }

    /// Request id of the last acknowledged bridge save, for diagnostics
    pub fn last_save_ack(&self) -> Option<String> {
        self.slots.lock().unwrap().last_save_ack.clone()
    }
}

/// Inbound callback surface the embedding transport glue invokes when the
/// host pushes a response. Clonable; all hooks take raw JSON and never
/// return an error; there is no caller stack to unwind into, so parse
/// failures resolve the operation fail-closed instead.
#[derive(Clone)]
pub struct UploadListener {
    slots: Arc<Mutex<Slots>>,
}

impl UploadListener {
    /// Bridge handshake response
    pub fn handshake_result(&self, json: &str) {
        debug!("Bridge handshake result: {}", json);
        let mut slots = self.slots.lock().unwrap();
        let Some(pending) = slots.handshake.take() else {
            debug!("No handshake in flight, discarding result");
            return;
        };

        match serde_json::from_str::<HandshakePayload>(json) {
            Ok(payload) => {
                if let Some(id) = &payload.request_id {
                    if *id != pending.request_id {
                        warn!(
                            "Handshake result for request {} but {} is in flight, discarding",
                            id, pending.request_id
                        );
                        slots.handshake = Some(pending);
                        return;
                    }
                }
                let _ = pending.tx.send(HandshakeOutcome {
                    supported: payload.supported,
                    version: payload.version,
                    capabilities: payload.capabilities,
                });
            }
            Err(e) => {
                warn!("Failed to parse handshake result: {}", e);
                // Fail closed: never assume capability
                let _ = pending.tx.send(HandshakeOutcome {
                    supported: false,
                    version: None,
                    capabilities: Vec::new(),
                });
            }
        }
    }

    /// Bridge save acknowledgment. Recorded for diagnostics only, nothing
    /// waits on it.
    pub fn save_ack(&self, request_id: &str) {
        debug!("Bridge save acknowledged: {}", request_id);
        self.slots.lock().unwrap().last_save_ack = Some(request_id.to_string());
    }

    /// Bridge save progress notification
    pub fn save_progress(&self, json: &str) {
        let payload = match serde_json::from_str::<ProgressPayload>(json) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Failed to parse progress: {}", e);
                return;
            }
        };

        let slots = self.slots.lock().unwrap();
        if let (Some(id), Some(pending)) = (&payload.request_id, &slots.save) {
            if *id != pending.request_id {
                warn!(
                    "Progress for request {} but {} is in flight, discarding",
                    id, pending.request_id
                );
                return;
            }
        }
        if let Some(tx) = &slots.progress {
            let _ = tx.send(UploadProgress {
                percent: (payload.percent / 100.0).clamp(0.0, 1.0),
                stage: payload.stage,
            });
        }
    }

    /// Bridge save final result
    pub fn save_result(&self, json: &str) {
        debug!("Bridge save result: {}", json);
        let mut slots = self.slots.lock().unwrap();
        let Some(pending) = slots.save.take() else {
            debug!("No bridge save in flight, discarding result");
            return;
        };

        match serde_json::from_str::<SaveResultPayload>(json) {
            Ok(payload) => {
                if let Some(id) = &payload.request_id {
                    if *id != pending.request_id {
                        warn!(
                            "Save result for request {} but {} is in flight, discarding",
                            id, pending.request_id
                        );
                        slots.save = Some(pending);
                        return;
                    }
                }
                let _ = pending.tx.send(SaveOutcome {
                    success: payload.success,
                    song_id: payload.song_id,
                    error: payload.error,
                });
            }
            Err(e) => {
                warn!("Failed to parse save result: {}", e);
                let _ = pending.tx.send(SaveOutcome {
                    success: false,
                    song_id: None,
                    error: Some(format!("Failed to parse save result: {}", e)),
                });
            }
        }
    }

    /// Legacy tier upload result. The legacy wire carries no request id; the
    /// armed slot is the only correlation.
    pub fn legacy_result(&self, json: &str) {
        debug!("Legacy upload result: {}", json);
        let Some(tx) = self.slots.lock().unwrap().legacy.take() else {
            debug!("No legacy save in flight, discarding result");
            return;
        };

        let result = serde_json::from_str::<UploadResult>(json).unwrap_or_else(|e| {
            warn!("Error deserializing legacy result: {}", e);
            UploadResult::failure(format!("Error deserializing upload result: {}", e))
        });
        let _ = tx.send(result);
    }
}
