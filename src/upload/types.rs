use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Whether the bridge protocol has been probed yet, and what it answered.
///
/// Owned per service instance; moves out of `Unknown` via the handshake and
/// back to `Unknown` only through an explicit reset. A failed or timed-out
/// bridge save downgrades `Available` to `Unavailable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationState {
    Unknown,
    Available,
    Unavailable,
}

impl fmt::Display for NegotiationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NegotiationState::Unknown => write!(f, "unknown"),
            NegotiationState::Available => write!(f, "available"),
            NegotiationState::Unavailable => write!(f, "unavailable"),
        }
    }
}

/// Everything needed to upload one rendered artifact
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Path of the artifact on local disk; deleted best-effort after upload
    pub source_file: PathBuf,
    /// Title prefix; the payload title gets a timestamp suffix appended
    pub title: String,
    pub collection_id: String,
    pub bpm: u32,
    pub tags: Vec<String>,
    /// Defaults to a stock description when absent
    pub description: Option<String>,
    /// Exact payload title, bypassing timestamp generation
    pub override_name: Option<String>,
}

/// Terminal outcome of one save call.
///
/// Also the wire shape of the legacy tier's result payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResult {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "songId", default)]
    pub song_id: Option<String>,
}

impl UploadResult {
    pub fn failure(message: impl Into<String>) -> Self {
        UploadResult {
            success: false,
            message: message.into(),
            song_id: None,
        }
    }
}

/// Progress of an in-flight bridge save, as delivered to subscribers
#[derive(Debug, Clone, PartialEq)]
pub struct UploadProgress {
    /// 0.0 to 1.0
    pub percent: f32,
    pub stage: String,
}

/// Request body sent to both tiers
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SavePayload {
    pub title: String,
    pub collection_id: String,
    pub bpm: u32,
    /// Free-form tags with the collection id appended
    pub tags: Vec<String>,
    pub description: String,
    /// Base64-encoded bytes of the artifact
    pub audio_data: String,
    pub format: String,
    pub duration: f32,
    pub file_size: usize,
    pub sample_rate: u32,
    pub channels: u16,
    pub is_public: bool,
}

/// Bridge handshake response
#[derive(Debug, Deserialize)]
pub(crate) struct HandshakePayload {
    #[serde(default)]
    pub supported: bool,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(rename = "requestId", default)]
    pub request_id: Option<String>,
}

/// Bridge save progress notification
#[derive(Debug, Deserialize)]
pub(crate) struct ProgressPayload {
    #[serde(rename = "requestId", default)]
    pub request_id: Option<String>,
    /// 0 to 100 on the wire
    pub percent: f32,
    #[serde(default)]
    pub stage: String,
}

/// Bridge save final result
#[derive(Debug, Deserialize)]
pub(crate) struct SaveResultPayload {
    #[serde(rename = "requestId", default)]
    pub request_id: Option<String>,
    pub success: bool,
    #[serde(rename = "songId", default)]
    pub song_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
