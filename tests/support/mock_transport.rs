use serde_json::json;
use songport::{BridgeTransport, LegacyTransport, UploadListener};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Scripted handshake behavior for the mock bridge
#[derive(Clone, Copy)]
pub enum BridgeHandshake {
    Supported,
    Unsupported,
    Malformed,
    /// Never answers; the negotiator must time out
    Silent,
}

/// Scripted save behavior for the mock bridge
#[derive(Clone)]
pub enum BridgeSave {
    Success(&'static str),
    Failure(&'static str),
    Malformed,
    /// Never answers; the save wait must time out
    Silent,
    /// Answers success, but for a token that is not in flight
    WrongToken,
}

/// Mock bridge transport for testing
///
/// Answers through the `UploadListener` inline, the way the real host pushes
/// callbacks; the service arms its slots before sending, so inline delivery
/// is race-free.
pub struct MockBridgeTransport {
    handshake_reply: BridgeHandshake,
    save_reply: BridgeSave,
    /// (wire percent 0-100, stage) events emitted before the save result
    progress_stages: Vec<(f32, &'static str)>,
    listener: Mutex<Option<UploadListener>>,
    pub init_calls: AtomicUsize,
    pub handshake_calls: AtomicUsize,
    pub save_calls: AtomicUsize,
    payloads: Mutex<Vec<String>>,
}

impl MockBridgeTransport {
    pub fn new(handshake_reply: BridgeHandshake, save_reply: BridgeSave) -> Self {
        MockBridgeTransport {
            handshake_reply,
            save_reply,
            progress_stages: Vec::new(),
            listener: Mutex::new(None),
            init_calls: AtomicUsize::new(0),
            handshake_calls: AtomicUsize::new(0),
            save_calls: AtomicUsize::new(0),
            payloads: Mutex::new(Vec::new()),
        }
    }

    pub fn with_progress(mut self, stages: Vec<(f32, &'static str)>) -> Self {
        self.progress_stages = stages;
        self
    }

    pub fn last_payload(&self) -> Option<String> {
        self.payloads.lock().unwrap().last().cloned()
    }
}

#[async_trait::async_trait]
impl BridgeTransport for MockBridgeTransport {
    async fn init(&self, listener: UploadListener) {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        *self.listener.lock().unwrap() = Some(listener);
    }

    async fn handshake(&self, request_id: &str) {
        self.handshake_calls.fetch_add(1, Ordering::SeqCst);
        let Some(listener) = self.listener.lock().unwrap().clone() else {
            return;
        };

        match self.handshake_reply {
            BridgeHandshake::Supported => listener.handshake_result(
                &json!({
                    "supported": true,
                    "capabilities": ["saveSong"],
                    "version": "1.0",
                    "requestId": request_id,
                })
                .to_string(),
            ),
            BridgeHandshake::Unsupported => listener.handshake_result(
                &json!({ "supported": false, "requestId": request_id }).to_string(),
            ),
            BridgeHandshake::Malformed => listener.handshake_result("this is not json"),
            BridgeHandshake::Silent => {}
        }
    }

    async fn save_song(&self, request_id: &str, payload_json: &str) {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        self.payloads.lock().unwrap().push(payload_json.to_string());
        let Some(listener) = self.listener.lock().unwrap().clone() else {
            return;
        };

        listener.save_ack(request_id);
        for (percent, stage) in &self.progress_stages {
            listener.save_progress(
                &json!({ "requestId": request_id, "percent": percent, "stage": stage })
                    .to_string(),
            );
        }

        match &self.save_reply {
            BridgeSave::Success(song_id) => listener.save_result(
                &json!({ "requestId": request_id, "success": true, "songId": song_id })
                    .to_string(),
            ),
            BridgeSave::Failure(error) => listener.save_result(
                &json!({ "requestId": request_id, "success": false, "error": error })
                    .to_string(),
            ),
            BridgeSave::Malformed => listener.save_result("garbage"),
            BridgeSave::Silent => {}
            BridgeSave::WrongToken => listener.save_result(
                &json!({ "requestId": "req_999_0", "success": true, "songId": "stale" })
                    .to_string(),
            ),
        }
    }
}

/// Scripted behavior for the mock legacy transport
#[derive(Clone)]
pub enum LegacyReply {
    Success(&'static str),
    Failure(&'static str),
    Malformed,
    /// Never answers; the legacy wait must time out
    Silent,
}

/// Mock legacy transport for testing
pub struct MockLegacyTransport {
    reply: LegacyReply,
    pub save_calls: AtomicUsize,
    payloads: Mutex<Vec<String>>,
}

impl MockLegacyTransport {
    pub fn new(reply: LegacyReply) -> Self {
        MockLegacyTransport {
            reply,
            save_calls: AtomicUsize::new(0),
            payloads: Mutex::new(Vec::new()),
        }
    }

    pub fn last_payload(&self) -> Option<String> {
        self.payloads.lock().unwrap().last().cloned()
    }
}

#[async_trait::async_trait]
impl LegacyTransport for MockLegacyTransport {
    async fn save_song(&self, payload_json: &str, listener: UploadListener) {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        self.payloads.lock().unwrap().push(payload_json.to_string());

        match &self.reply {
            LegacyReply::Success(song_id) => listener.legacy_result(
                &json!({ "success": true, "message": "Song saved via legacy", "songId": song_id })
                    .to_string(),
            ),
            LegacyReply::Failure(message) => listener
                .legacy_result(&json!({ "success": false, "message": message }).to_string()),
            LegacyReply::Malformed => listener.legacy_result("garbage"),
            LegacyReply::Silent => {}
        }
    }
}
