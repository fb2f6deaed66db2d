// # Upload Module
//
// Tiered delivery of a rendered artifact to the hosting platform:
//
// - **Mailbox / UploadListener**: correlates asynchronous host callbacks
//   with the request that is in flight
// - **BridgeTransport / LegacyTransport**: outbound capability interfaces,
//   injected at construction
// - **UploadProgressHandle**: fans bridge-save progress out to subscribers
// - **UploadService**: negotiates the protocol tier and orchestrates the
//   save with timeout-based fallback
//
// Public API:
// - `UploadService`: create and drive saves
// - `UploadRequest` / `UploadResult`: one save call's input and outcome
// - `UploadListener`: inbound callback hooks for transport glue
// - `UploadProgress`: progress events for subscribers

mod mailbox;
mod progress;
mod request_id;
mod service;
mod transport;
mod types;

// Public API exports
pub use mailbox::UploadListener;
pub use progress::UploadProgressHandle;
pub use service::UploadService;
pub use transport::{BridgeTransport, LegacyTransport};
pub use types::{NegotiationState, UploadProgress, UploadRequest, UploadResult};
