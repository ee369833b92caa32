//! RFQ engine: REST client, real-time sockets and effect execution.
mod api;
mod config;
mod download;
mod engine;
mod models;
mod persist;
mod resources;
mod socket;
mod submit;
mod types;

pub use api::{ApiClient, ApiEnvelope, ApiError, Page, PageRequest};
pub use config::{
    ClientConfig, ConfigError, API_URL_VAR, DEFAULT_API_URL, LEGACY_API_URL_VAR,
    RECONNECT_INTERVAL_VAR, WEBSOCKET_ENABLED_VAR, WS_URL_VAR,
};
pub use engine::EngineHandle;
pub use models::{
    AnalysisAvailability, AnalysisReport, DocumentRef, DocumentType, DocumentTypeInput,
    EvaluationCriterion, EvaluationCriterionInput, NewProject, Project, Rfq, RfqChanges,
    RfqPayload, RfqVendor, Vendor, VendorAnalysis, VendorInput, VendorRequirementPayload,
};
pub use persist::{ensure_download_dir, sanitize_filename, AtomicFileWriter, PersistError};
pub use socket::{
    ChannelSocketSink, ReconnectDecision, ReconnectPolicy, ReconnectTracker, SocketHandle,
    SocketSink,
};
pub use submit::{
    placeholder_project_id, submit_rfq, PartialFailure, ProjectSelection, RfqBackend, RfqCreated,
    SubmissionRequest, DRAFT_STATUS,
};
pub use types::{
    EngineEvent, FetchRequest, FetchResult, SocketChannel, SocketEvent, SocketEventKind,
    SocketState,
};
