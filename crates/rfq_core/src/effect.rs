use crate::{Channel, RfqSubmission, Toast};

/// Side effects requested by `update`, executed by the application shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Open (or re-open) the socket for `channel`. An empty path leaves the
    /// channel disconnected.
    OpenSocket { channel: Channel, path: String },
    CloseSocket { channel: Channel },
    SendSocket { channel: Channel, message: String },
    /// Create the project (if new) and then the RFQ.
    SubmitRfq(RfqSubmission),
    ShowToast(Toast),
}
