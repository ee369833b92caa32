//! RFQ dashboard core: pure state machine for the creation wizard and the
//! real-time aggregation, plus view-model helpers.
mod bounded;
mod connection;
mod effect;
mod event;
mod msg;
mod realtime;
mod state;
mod toast;
mod update;
mod view_model;
mod wizard;

pub use bounded::BoundedLog;
pub use connection::{aggregate_state, endpoint_path, Channel, ConnectionState};
pub use effect::Effect;
pub use event::{
    parse_frame, DocumentStatus, DocumentUpdate, InboundEvent, InboundFrame, RfqEventKind,
    RfqUpdate, SystemEventKind, SystemUpdate,
};
pub use msg::Msg;
pub use realtime::{
    DocumentProcessingView, RealtimeState, RfqStatusView, SystemStatusView,
    DOCUMENT_UPDATE_CAPACITY, RECENT_DOCUMENT_UPDATES, RECENT_SYSTEM_UPDATES,
    RFQ_UPDATE_CAPACITY, SYSTEM_UPDATE_CAPACITY,
};
pub use state::AppState;
pub use toast::{connection_lost, connection_opened, toast_for_event, Toast, ToastLevel};
pub use update::update;
pub use view_model::{AppViewModel, ChannelStatus, WizardView};
pub use wizard::{
    generate_rfq_id, is_valid_rfq_id, validate_step, FieldKey, NewProjectDraft, ProjectMode,
    ProjectRef, RfqDraft, RfqSubmission, RfqSubmitted, ValidationErrors, VendorRequirement, WizardState,
    WizardStep, MIN_DESCRIPTION_CHARS,
};
