// # Upload Service - Orchestrator
//
// Coordinates one save at a time across the two delivery tiers:
// - HandshakeNegotiation: probe whether the bridge protocol is usable
// - Bridge tier: correlated save with progress notifications
// - Legacy tier: fire-and-forget save with a single result callback
//
// The service decides handshake-if-needed, attempts the bridge tier, falls
// back to the legacy tier on timeout or failure, and always returns exactly
// one terminal result. Callers must serialize save calls; there is a single
// correlation slot per operation kind.

use crate::config::Config;
use crate::upload::mailbox::{Mailbox, UploadListener};
use crate::upload::progress::UploadProgressHandle;
use crate::upload::request_id::RequestIdGenerator;
use crate::upload::transport::{BridgeTransport, LegacyTransport};
use crate::upload::types::{NegotiationState, SavePayload, UploadRequest, UploadResult};
use crate::wav;
use base64::Engine;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::time::timeout;
use tracing::{error, info, warn};

const DEFAULT_DESCRIPTION: &str = "An original composition.";

/// How a bridge attempt ended when it did not produce a terminal result
enum BridgeAttempt {
    Success(UploadResult),
    /// Cause of the fallback, for the log line
    Fallback(String),
}

/// Tiered save orchestrator.
///
/// Owns the negotiation state, the correlation mailbox and the progress
/// fan-out; transports are injected at construction so the embedding decides
/// which protocols exist (and tests inject mocks).
pub struct UploadService {
    bridge: Arc<dyn BridgeTransport>,
    legacy: Arc<dyn LegacyTransport>,
    config: Config,
    mailbox: Mailbox,
    progress: UploadProgressHandle,
    request_ids: RequestIdGenerator,
    negotiation: Mutex<NegotiationState>,
    initialized: AtomicBool,
}

impl UploadService {
    pub fn new(
        bridge: Arc<dyn BridgeTransport>,
        legacy: Arc<dyn LegacyTransport>,
        config: Config,
    ) -> Self {
        UploadService {
            bridge,
            legacy,
            config,
            mailbox: Mailbox::new(),
            progress: UploadProgressHandle::new(),
            request_ids: RequestIdGenerator::new(),
            negotiation: Mutex::new(NegotiationState::Unknown),
            initialized: AtomicBool::new(false),
        }
    }

    /// Inbound callback surface for the embedding transport glue
    pub fn listener(&self) -> UploadListener {
        self.mailbox.listener()
    }

    /// Subscription point for save progress events
    pub fn progress(&self) -> UploadProgressHandle {
        self.progress.clone()
    }

    pub fn negotiation_state(&self) -> NegotiationState {
        *self.negotiation.lock().unwrap()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Forget the cached handshake answer; the next save re-negotiates.
    /// Must not be called while a save is in flight.
    pub fn reset_negotiation_state(&self) {
        *self.negotiation.lock().unwrap() = NegotiationState::Unknown;
        info!("Negotiation state reset");
    }

    /// Upload the artifact described by `request`, trying the bridge tier
    /// first and falling back to the legacy tier. Always returns a terminal
    /// result; tier failures are recovered internally, never raised.
    pub async fn save(&self, request: &UploadRequest) -> UploadResult {
        let result = self.save_inner(request).await;
        if result.success {
            info!(
                "Upload succeeded: {} | song id: {}",
                result.message,
                result.song_id.as_deref().unwrap_or("(none)")
            );
        } else {
            error!("Upload failed: {}", result.message);
        }
        result
    }

    /// [`save`](Self::save) with a completion callback
    pub async fn save_with<F>(&self, request: &UploadRequest, callback: F) -> UploadResult
    where
        F: FnOnce(&UploadResult),
    {
        let result = self.save(request).await;
        callback(&result);
        result
    }

    async fn save_inner(&self, request: &UploadRequest) -> UploadResult {
        let path = request.source_file.as_path();
        info!("Uploading: {}", path.display());

        // Precondition: nothing is attempted for a missing artifact,
        // not even transport init
        let file_data = match tokio::fs::read(path).await {
            Ok(data) => data,
            Err(e) => {
                error!("File not found: {} ({})", path.display(), e);
                return UploadResult::failure("File not found");
            }
        };

        self.ensure_initialized().await;

        let payload = self.build_payload(request, &file_data);
        let payload_json = match serde_json::to_string(&payload) {
            Ok(json) => json,
            Err(e) => return UploadResult::failure(format!("Failed to encode payload: {}", e)),
        };

        let mut state = self.negotiation_state();
        if state == NegotiationState::Unknown {
            info!("Bridge status unknown, attempting handshake");
            state = self.negotiate().await;
            *self.negotiation.lock().unwrap() = state;
        }

        let mut result = None;
        if state == NegotiationState::Available {
            match self.try_save_via_bridge(&payload_json).await {
                BridgeAttempt::Success(bridge_result) => result = Some(bridge_result),
                BridgeAttempt::Fallback(cause) => {
                    warn!("Bridge save failed ({}), falling back to legacy", cause);
                    *self.negotiation.lock().unwrap() = NegotiationState::Unavailable;
                }
            }
        }

        let result = match result {
            Some(result) => result,
            None => self.save_via_legacy(&payload_json).await,
        };

        // Clean up the local artifact whichever tier produced the result
        match tokio::fs::remove_file(path).await {
            Ok(()) => info!("Cleaned up local file: {}", path.display()),
            Err(e) => warn!("Could not delete local file: {}", e),
        }

        result
    }

    async fn ensure_initialized(&self) {
        if !self.initialized.swap(true, Ordering::SeqCst) {
            self.bridge.init(self.mailbox.listener()).await;
            info!("Upload service initialized");
        }
    }

    fn build_payload(&self, request: &UploadRequest, file_data: &[u8]) -> SavePayload {
        let audio_data = base64::engine::general_purpose::STANDARD.encode(file_data);
        info!(
            "File size: {} bytes, base64 length: {}",
            file_data.len(),
            audio_data.len()
        );

        let info = wav::probe(file_data);
        let mut tags = request.tags.clone();
        tags.push(request.collection_id.clone());

        SavePayload {
            title: request
                .override_name
                .clone()
                .unwrap_or_else(|| generate_file_name(&request.title)),
            collection_id: request.collection_id.clone(),
            bpm: request.bpm,
            tags,
            description: request
                .description
                .clone()
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            audio_data,
            format: "wav".to_string(),
            duration: wav::duration_seconds(file_data),
            file_size: file_data.len(),
            sample_rate: info.map(|i| i.sample_rate).unwrap_or(44100),
            channels: info.map(|i| i.channels).unwrap_or(2),
            is_public: self.config.is_public,
        }
    }

    /// Capability discovery: one handshake round trip with the shared
    /// timeout. Anything but an affirmative answer within the bound is
    /// Unavailable; never assume capability.
    async fn negotiate(&self) -> NegotiationState {
        let request_id = self.request_ids.next();
        let rx = self.mailbox.arm_handshake(&request_id);

        info!("Starting bridge handshake: {}", request_id);
        self.bridge.handshake(&request_id).await;

        match timeout(self.config.timeout, rx).await {
            Ok(Ok(outcome)) if outcome.supported => {
                info!(
                    "Bridge handshake successful (version {}, capabilities: {:?})",
                    outcome.version.as_deref().unwrap_or("unknown"),
                    outcome.capabilities
                );
                NegotiationState::Available
            }
            Ok(Ok(_)) => {
                info!("Bridge handshake responded but not supported");
                NegotiationState::Unavailable
            }
            Ok(Err(_)) => {
                warn!("Bridge handshake channel closed");
                NegotiationState::Unavailable
            }
            Err(_) => {
                warn!("Bridge handshake timed out");
                NegotiationState::Unavailable
            }
        }
    }

    /// One bridge save attempt. Progress events are relayed to subscribers
    /// while the result is awaited; both timeout and an explicit failure
    /// payload end in `Fallback`. Only a successful result short-circuits
    /// the legacy tier.
    async fn try_save_via_bridge(&self, payload_json: &str) -> BridgeAttempt {
        let request_id = self.request_ids.next();
        let (mut result_rx, mut progress_rx) = self.mailbox.arm_save(&request_id);

        info!("Saving via bridge: {}", request_id);
        self.bridge.save_song(&request_id, payload_json).await;

        let deadline = tokio::time::sleep(self.config.timeout);
        tokio::pin!(deadline);

        let attempt = loop {
            tokio::select! {
                // Drain progress that arrived before the result
                biased;
                Some(event) = progress_rx.recv() => {
                    self.progress.emit(event);
                }
                outcome = &mut result_rx => {
                    match outcome {
                        Ok(outcome) if outcome.success => {
                            break BridgeAttempt::Success(UploadResult {
                                success: true,
                                message: "Song saved via bridge".to_string(),
                                song_id: outcome.song_id,
                            });
                        }
                        Ok(outcome) => {
                            break BridgeAttempt::Fallback(
                                outcome
                                    .error
                                    .unwrap_or_else(|| "bridge save failed".to_string()),
                            );
                        }
                        Err(_) => break BridgeAttempt::Fallback("result channel closed".to_string()),
                    }
                }
                _ = &mut deadline => {
                    match self.mailbox.last_save_ack() {
                        Some(ack) => warn!("Bridge save timed out (request {} was acknowledged)", ack),
                        None => warn!("Bridge save timed out before acknowledgment"),
                    }
                    break BridgeAttempt::Fallback("timed out".to_string());
                }
            }
        };

        // The attempt has concluded; progress must not fire past this point
        // and a late result lands on a closed channel.
        self.mailbox.conclude_save();
        attempt
    }

    /// Legacy fire-and-forget save. Terminal: a timeout or an undecodable
    /// response becomes the failure result, there is no further tier.
    async fn save_via_legacy(&self, payload_json: &str) -> UploadResult {
        info!("Saving via legacy transport");

        // The legacy host needs the listener fully attached before the call
        tokio::time::sleep(self.config.legacy_send_delay).await;

        let rx = self.mailbox.arm_legacy();
        self.legacy
            .save_song(payload_json, self.mailbox.listener())
            .await;

        match timeout(self.config.timeout, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => UploadResult::failure("Upload result channel closed"),
            Err(_) => {
                warn!("Legacy save timed out");
                UploadResult::failure("Legacy save timed out")
            }
        }
    }
}

/// Append a `MMdd_HHmm` timestamp so repeated uploads of the same title
/// stay distinguishable on the platform
fn generate_file_name(prefix: &str) -> String {
    let timestamp = chrono::Local::now().format("%m%d_%H%M");
    format!("{} - {}", prefix, timestamp)
}
