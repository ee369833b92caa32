use chrono::{DateTime, NaiveDate, Utc};

use crate::{Channel, ConnectionState, ProjectMode, RfqSubmitted};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Application finished starting; opens the long-lived sockets.
    AppStarted,
    /// User opened the create-RFQ wizard.
    WizardOpened,
    /// User dismissed the wizard; the draft is discarded.
    WizardClosed { now: DateTime<Utc> },
    RfqIdChanged(String),
    DescriptionChanged(String),
    DeadlineChanged(Option<NaiveDate>),
    ProjectModeChanged(ProjectMode),
    ProjectSelected(Option<String>),
    NewProjectNameChanged(String),
    NewProjectDescriptionChanged(String),
    VendorRequirementAdded,
    VendorRequirementRemoved { index: usize },
    RequirementVendorSelected { index: usize, vendor_id: String },
    RequirementDocumentToggled { index: usize, document_type: String },
    NextClicked { today: NaiveDate },
    BackClicked,
    SubmitClicked { now: DateTime<Utc> },
    /// Engine finished the submission. `failures` is empty when every backend
    /// call succeeded.
    SubmissionFinished {
        submitted: RfqSubmitted,
        failures: Vec<String>,
        now: DateTime<Utc>,
    },
    /// Transport lifecycle change for one socket.
    ConnectionChanged {
        channel: Channel,
        state: ConnectionState,
    },
    /// Raw text frame from one socket.
    FrameReceived { channel: Channel, text: String },
    ReconnectScheduled { channel: Channel, attempt: u32 },
    ReconnectsExhausted { channel: Channel },
    SubscribeToRfq(String),
    UnsubscribeFromRfq,
    SendRequested { channel: Channel, message: String },
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
