use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration for the upload service
/// In debug builds: loads from .env file
/// In release builds: uses the built-in defaults
#[derive(Clone, Debug)]
pub struct Config {
    /// Single timeout applied to the handshake, bridge save and legacy save waits
    pub timeout: Duration,
    /// Delay before issuing the legacy save, so the listener is fully attached
    pub legacy_send_delay: Duration,
    /// Directory rendered artifacts are written into
    pub export_dir: Option<PathBuf>,
    /// Whether uploaded songs are publicly visible
    pub is_public: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            timeout: Duration::from_secs(15),
            legacy_send_delay: Duration::from_secs(1),
            export_dir: None,
            is_public: false,
        }
    }
}

impl Config {
    /// Load configuration based on build mode
    pub fn load() -> Self {
        #[cfg(debug_assertions)]
        {
            if dotenvy::dotenv().is_ok() {
                tracing::info!("Dev mode activated - loaded .env file");
            }
            Self::from_env()
        }

        #[cfg(not(debug_assertions))]
        {
            Self::default()
        }
    }

    /// Load configuration from environment variables (dev mode)
    #[cfg(debug_assertions)]
    fn from_env() -> Self {
        let defaults = Config::default();

        let timeout = std::env::var("SONGPORT_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.timeout);

        let legacy_send_delay = std::env::var("SONGPORT_LEGACY_SEND_DELAY_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.legacy_send_delay);

        let export_dir = std::env::var("SONGPORT_EXPORT_DIR")
            .ok()
            .map(PathBuf::from);

        let is_public = std::env::var("SONGPORT_IS_PUBLIC")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(defaults.is_public);

        Config {
            timeout,
            legacy_send_delay,
            export_dir,
            is_public,
        }
    }

    /// Directory artifacts are rendered into, falling back to the OS temp dir
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }
}
