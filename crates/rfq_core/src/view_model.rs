use crate::realtime::{DocumentProcessingView, RfqStatusView, SystemStatusView};
use crate::wizard::{FieldKey, RfqSubmitted, WizardStep};
use crate::{Channel, ConnectionState};

#[derive(Debug, Clone, PartialEq)]
pub struct AppViewModel {
    pub connection_state: ConnectionState,
    pub is_connected: bool,
    pub channels: Vec<ChannelStatus>,
    pub processing: DocumentProcessingView,
    pub rfq_status: Option<RfqStatusView>,
    pub system: SystemStatusView,
    pub wizard: WizardView,
    pub last_submission: Option<RfqSubmitted>,
    pub dirty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelStatus {
    pub channel: Channel,
    pub state: ConnectionState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardView {
    pub is_open: bool,
    pub step: WizardStep,
    pub step_number: u8,
    pub can_go_back: bool,
    pub is_submitting: bool,
    pub rfq_id: String,
    pub requirement_count: usize,
    pub errors: Vec<(FieldKey, String)>,
}
