// Library exports for integration tests and embedding applications

pub mod config;
pub mod export;
pub mod mixdown;
pub mod upload;
pub mod wav;

pub use config::Config;
pub use export::{render_to_file, ExportError, ExportOptions};
pub use mixdown::{Clip, Envelope, Mixdown};
pub use upload::{
    BridgeTransport, LegacyTransport, NegotiationState, UploadListener, UploadProgress,
    UploadProgressHandle, UploadRequest, UploadResult, UploadService,
};
