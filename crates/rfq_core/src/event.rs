use serde::Deserialize;
use serde_json::Value;

/// Raw socket frame as sent by the backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InboundFrame {
    pub event_type: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
}

pub fn parse_frame(text: &str) -> Result<InboundFrame, serde_json::Error> {
    serde_json::from_str(text)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentStatus {
    Started,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RfqEventKind {
    StatusUpdated,
    VendorSelected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemEventKind {
    Status,
    EmailProcessed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentUpdate {
    pub status: DocumentStatus,
    pub document_id: Option<String>,
    pub filename: Option<String>,
    pub rfq_id: Option<String>,
    pub vendor_id: Option<String>,
    pub vendor_name: Option<String>,
    pub score: Option<f64>,
    pub error: Option<String>,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RfqUpdate {
    pub kind: RfqEventKind,
    pub rfq_id: Option<String>,
    pub status: Option<String>,
    pub completion_percentage: Option<f64>,
    pub selected_vendor: Option<String>,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SystemUpdate {
    pub kind: SystemEventKind,
    pub status: Option<String>,
    pub message: Option<String>,
    pub subject: Option<String>,
    pub rfq_detected: bool,
    pub rfq_id: Option<String>,
    pub timestamp: String,
}

impl SystemUpdate {
    /// Statuses other than the healthy ones warrant a notification.
    pub fn is_abnormal(&self) -> bool {
        match self.status.as_deref() {
            Some(status) => !matches!(
                status.to_ascii_lowercase().as_str(),
                "healthy" | "ok" | "online" | "operational"
            ),
            None => false,
        }
    }

    pub fn is_rfq_email(&self) -> bool {
        self.kind == SystemEventKind::EmailProcessed && self.rfq_detected && self.subject.is_some()
    }
}

/// A socket frame classified by its `event_type` tag.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    Document(DocumentUpdate),
    Rfq(RfqUpdate),
    System(SystemUpdate),
    ConnectionEstablished { message: Option<String> },
    Unknown { event_type: String },
}

impl InboundEvent {
    pub fn from_frame(frame: &InboundFrame) -> Self {
        let data = &frame.data;
        let timestamp = frame.timestamp.clone().unwrap_or_default();
        let document = |status| {
            InboundEvent::Document(DocumentUpdate {
                status,
                document_id: text(data, "document_id"),
                filename: text(data, "filename"),
                rfq_id: text(data, "rfq_id"),
                vendor_id: text(data, "vendor_id"),
                vendor_name: text(data, "vendor_name"),
                score: number(data, "score"),
                error: text(data, "error"),
                timestamp: timestamp.clone(),
            })
        };
        let rfq = |kind| {
            InboundEvent::Rfq(RfqUpdate {
                kind,
                rfq_id: text(data, "rfq_id"),
                status: text(data, "status"),
                completion_percentage: number(data, "completion_percentage"),
                selected_vendor: text(data, "selected_vendor")
                    .or_else(|| text(data, "vendor_name"))
                    .or_else(|| text(data, "vendor_id")),
                timestamp: timestamp.clone(),
            })
        };
        let system = |kind| {
            InboundEvent::System(SystemUpdate {
                kind,
                status: text(data, "status"),
                message: text(data, "message"),
                subject: text(data, "subject"),
                rfq_detected: flag(data, "rfq_detected"),
                rfq_id: text(data, "rfq_id"),
                timestamp: timestamp.clone(),
            })
        };

        match frame.event_type.as_str() {
            "document_processing_started" => document(DocumentStatus::Started),
            "document_processing_completed" => document(DocumentStatus::Completed),
            "document_processing_failed" => document(DocumentStatus::Failed),
            "rfq_status_updated" => rfq(RfqEventKind::StatusUpdated),
            "vendor_selection_completed" => rfq(RfqEventKind::VendorSelected),
            "system_status" => system(SystemEventKind::Status),
            "new_email_processed" => system(SystemEventKind::EmailProcessed),
            "connection_established" => InboundEvent::ConnectionEstablished {
                message: text(data, "message"),
            },
            other => InboundEvent::Unknown {
                event_type: other.to_string(),
            },
        }
    }
}

// Ids arrive as either strings or numbers depending on the backend route.
fn text(data: &Value, key: &str) -> Option<String> {
    match data.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn number(data: &Value, key: &str) -> Option<f64> {
    match data.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn flag(data: &Value, key: &str) -> bool {
    match data.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}
