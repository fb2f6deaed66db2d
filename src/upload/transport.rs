use crate::upload::mailbox::UploadListener;

/// Outbound half of the bridge protocol (allows mocking for tests).
///
/// Every call is fire-and-forget; the host answers later through the
/// [`UploadListener`] hooks handed over in `init`.
#[async_trait::async_trait]
pub trait BridgeTransport: Send + Sync {
    /// Attach the listener the host will deliver callbacks to.
    /// Called once, before any other bridge call.
    async fn init(&self, listener: UploadListener);

    /// Capability-discovery round trip; answered via
    /// [`UploadListener::handshake_result`]
    async fn handshake(&self, request_id: &str);

    /// Submit a save; answered via [`UploadListener::save_ack`],
    /// [`UploadListener::save_progress`] and [`UploadListener::save_result`]
    async fn save_song(&self, request_id: &str, payload_json: &str);
}

/// Outbound half of the legacy fire-and-forget protocol.
///
/// The single callback carries no correlation id, which is why the caller
/// must keep at most one legacy save in flight.
#[async_trait::async_trait]
pub trait LegacyTransport: Send + Sync {
    /// Submit a save; answered via [`UploadListener::legacy_result`]
    async fn save_song(&self, payload_json: &str, listener: UploadListener);
}
