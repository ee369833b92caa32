use crate::connection::Channel;
use crate::event::{
    DocumentStatus, DocumentUpdate, InboundEvent, RfqEventKind, RfqUpdate, SystemEventKind,
    SystemUpdate,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A transient user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub title: String,
    pub message: String,
}

impl Toast {
    pub fn new(level: ToastLevel, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ToastLevel::Info, title, message)
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ToastLevel::Success, title, message)
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ToastLevel::Warning, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ToastLevel::Error, title, message)
    }
}

/// Notification for a classified socket event, if it deserves one.
pub fn toast_for_event(event: &InboundEvent) -> Option<Toast> {
    match event {
        InboundEvent::Document(update) => Some(document_toast(update)),
        InboundEvent::Rfq(update) => Some(rfq_toast(update)),
        InboundEvent::System(update) => system_toast(update),
        InboundEvent::ConnectionEstablished { .. } | InboundEvent::Unknown { .. } => None,
    }
}

pub fn connection_opened(channel: Channel) -> Toast {
    Toast::success(
        "Real-time updates connected",
        format!("Live {} updates are active.", channel.label()),
    )
}

pub fn connection_lost(channel: Channel) -> Toast {
    Toast::error(
        "Connection lost",
        format!(
            "Real-time {} updates stopped. Please refresh to reconnect.",
            channel.label()
        ),
    )
}

fn document_toast(update: &DocumentUpdate) -> Toast {
    let subject = describe_document(update);
    match update.status {
        DocumentStatus::Started => Toast::info("Processing started", subject),
        DocumentStatus::Completed => match update.score {
            Some(score) => Toast::success(
                "Document processed",
                format!("{subject} scored {}/10", format_number(score)),
            ),
            None => Toast::success("Document processed", subject),
        },
        DocumentStatus::Failed => Toast::error(
            "Document processing failed",
            format!(
                "{subject}: {}",
                update.error.as_deref().unwrap_or("unknown error")
            ),
        ),
    }
}

fn describe_document(update: &DocumentUpdate) -> String {
    let mut subject = update
        .filename
        .clone()
        .unwrap_or_else(|| "Document".to_string());
    if let Some(rfq_id) = &update.rfq_id {
        subject.push_str(&format!(" for {rfq_id}"));
    }
    if let Some(vendor) = update.vendor_name.as_ref().or(update.vendor_id.as_ref()) {
        subject.push_str(&format!(" from {vendor}"));
    }
    subject
}

fn rfq_toast(update: &RfqUpdate) -> Toast {
    let rfq_id = update.rfq_id.as_deref().unwrap_or("RFQ");
    match update.kind {
        RfqEventKind::StatusUpdated => {
            let status = update.status.as_deref().unwrap_or("updated");
            let message = match update.completion_percentage {
                Some(pct) => format!("{rfq_id} is {status} ({}% complete)", format_number(pct)),
                None => format!("{rfq_id} is {status}"),
            };
            Toast::info("RFQ status updated", message)
        }
        RfqEventKind::VendorSelected => {
            let vendor = update.selected_vendor.as_deref().unwrap_or("A vendor");
            Toast::success(
                "Vendor selection completed",
                format!("{vendor} was selected for {rfq_id}"),
            )
        }
    }
}

fn system_toast(update: &SystemUpdate) -> Option<Toast> {
    match update.kind {
        SystemEventKind::Status if update.is_abnormal() => Some(Toast::warning(
            format!(
                "System status: {}",
                update.status.as_deref().unwrap_or_default()
            ),
            update.message.clone().unwrap_or_default(),
        )),
        SystemEventKind::EmailProcessed if update.rfq_detected => {
            let subject = update.subject.as_deref().unwrap_or("(no subject)");
            let message = match &update.rfq_id {
                Some(rfq_id) => format!("{subject} ({rfq_id})"),
                None => subject.to_string(),
            };
            Some(Toast::info("New RFQ email detected", message))
        }
        _ => None,
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}
