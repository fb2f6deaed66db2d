pub mod mock_transport;

pub use mock_transport::{
    BridgeHandshake, BridgeSave, LegacyReply, MockBridgeTransport, MockLegacyTransport,
};

use songport::wav::{self, WavSpec};
use songport::{Config, UploadRequest, UploadService};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Initialize tracing for tests with proper test output handling
#[allow(unused)]
pub fn tracing_init() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Short timeouts so timeout-path tests stay fast
pub fn fast_config() -> Config {
    Config {
        timeout: Duration::from_millis(200),
        legacy_send_delay: Duration::from_millis(10),
        export_dir: None,
        is_public: false,
    }
}

/// Write a small valid WAV artifact (100ms of stereo silence)
pub fn write_test_wav(dir: &Path, filename: &str) -> PathBuf {
    let samples = vec![0.0f32; 4410 * 2];
    let bytes = wav::encode(&samples, WavSpec::default());
    let path = dir.join(filename);
    std::fs::write(&path, bytes).expect("Failed to write test wav");
    path
}

pub fn request_for(path: &Path) -> UploadRequest {
    UploadRequest {
        source_file: path.to_path_buf(),
        title: "Test Song".to_string(),
        collection_id: "collection-1".to_string(),
        bpm: 120,
        tags: vec!["test".to_string(), "automated".to_string()],
        description: Some("Automated test song".to_string()),
        override_name: None,
    }
}

pub fn service_with(
    bridge: &Arc<MockBridgeTransport>,
    legacy: &Arc<MockLegacyTransport>,
) -> UploadService {
    UploadService::new(bridge.clone(), legacy.clone(), fast_config())
}
