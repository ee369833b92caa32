use rfq_core::{
    AppViewModel, ConnectionState, DocumentStatus, DocumentUpdate, FieldKey, RfqUpdate,
    SystemUpdate, Toast, ToastLevel, WizardStep, WizardView,
};
use rfq_engine::{ApiError, FetchRequest, FetchResult};

/// One-line summary, reprinted whenever it changes.
pub fn status_line(view: &AppViewModel) -> String {
    let channels = view
        .channels
        .iter()
        .map(|status| format!("{} {}", status.channel.label(), state_label(status.state)))
        .collect::<Vec<_>>()
        .join(", ");
    let mut line = format!(
        "Real-time: {} ({})",
        state_label(view.connection_state),
        channels
    );
    if view.processing.is_processing {
        line.push_str(&format!(
            " | processing {} document(s)",
            view.processing.processing_ids.len()
        ));
    }
    if let Some(rfq) = &view.rfq_status {
        let status = rfq
            .latest
            .as_ref()
            .and_then(|update| update.status.as_deref())
            .unwrap_or("no updates yet");
        line.push_str(&format!(" | {}: {}", rfq.rfq_id, status));
    }
    if view.wizard.is_open {
        line.push_str(&format!(
            " | wizard step {}/4 ({})",
            view.wizard.step_number,
            step_label(view.wizard.step)
        ));
    }
    line
}

/// Full report for the `status` command.
pub fn render_status(view: &AppViewModel) -> Vec<String> {
    let mut lines = vec![status_line(view)];

    if !view.processing.processing_ids.is_empty() {
        lines.push(format!(
            "In progress: {}",
            view.processing.processing_ids.join(", ")
        ));
    }
    if !view.processing.recent_updates.is_empty() {
        lines.push("Recent documents:".to_string());
        lines.extend(view.processing.recent_updates.iter().map(document_row));
    }
    if let Some(rfq) = &view.rfq_status {
        lines.push(format!("Updates for {}:", rfq.rfq_id));
        if rfq.updates.is_empty() {
            lines.push("  (none)".to_string());
        }
        lines.extend(rfq.updates.iter().map(rfq_row));
    }
    if let Some(email) = &view.system.last_rfq_email {
        lines.push(format!(
            "Last RFQ email: {}",
            email.subject.as_deref().unwrap_or_default()
        ));
    }
    if !view.system.recent.is_empty() {
        lines.push("System:".to_string());
        lines.extend(view.system.recent.iter().map(system_row));
    }
    if let Some(submitted) = &view.last_submission {
        lines.push(format!(
            "Last submitted: {} ({}, project {}, {} vendor(s), due {})",
            submitted.rfq_id,
            submitted.status,
            submitted.project_id,
            submitted.vendor_requirements.len(),
            submitted.deadline
        ));
    }
    if view.wizard.is_open {
        lines.extend(render_wizard(&view.wizard));
    }
    lines
}

pub fn render_wizard(wizard: &WizardView) -> Vec<String> {
    let mut lines = vec![format!(
        "Create RFQ {} - step {}/4: {}{}",
        wizard.rfq_id,
        wizard.step_number,
        step_label(wizard.step),
        if wizard.is_submitting {
            " (submitting...)"
        } else {
            ""
        }
    )];
    if wizard.step == WizardStep::Vendors || wizard.step == WizardStep::Review {
        lines.push(format!("  vendor requirements: {}", wizard.requirement_count));
    }
    lines.extend(
        wizard
            .errors
            .iter()
            .map(|(field, message)| format!("  ! {}: {}", field_label(*field), message)),
    );
    lines
}

pub fn render_toast(toast: &Toast) -> String {
    let level = match toast.level {
        ToastLevel::Info => "INFO",
        ToastLevel::Success => "OK",
        ToastLevel::Warning => "WARN",
        ToastLevel::Error => "ERROR",
    };
    format!("[{level}] {}: {}", toast.title, toast.message)
}

pub fn render_fetch(request: &FetchRequest, result: &Result<FetchResult, ApiError>) -> Vec<String> {
    let result = match result {
        Ok(result) => result,
        Err(err) => {
            return vec![format!(
                "[ERROR] {} failed: {}",
                request_label(request),
                err.user_message()
            )]
        }
    };
    match result {
        FetchResult::Projects(projects) => {
            let mut lines = vec![format!("{} project(s)", projects.len())];
            lines.extend(
                projects
                    .iter()
                    .map(|project| format!("  {}  {}", project.id, project.name)),
            );
            lines
        }
        FetchResult::Vendors(page) => {
            let mut lines = vec![format!(
                "Vendors page {}/{} ({} total)",
                page.page, page.total_pages, page.total_count
            )];
            lines.extend(page.items.iter().map(|vendor| {
                format!(
                    "  {}  {}{}",
                    vendor.id,
                    vendor.name,
                    vendor
                        .email
                        .as_deref()
                        .map(|email| format!(" <{email}>"))
                        .unwrap_or_default()
                )
            }));
            if page.has_more {
                lines.push(format!("  more: vendors {}", page.page + 1));
            }
            lines
        }
        FetchResult::DocumentTypes(types) => {
            let mut lines = vec![format!("{} document type(s)", types.len())];
            lines.extend(types.iter().map(|doc_type| {
                format!(
                    "  {}  {}{}",
                    doc_type.id,
                    doc_type.name,
                    if doc_type.required { " (required)" } else { "" }
                )
            }));
            lines
        }
        FetchResult::AnalysisAvailability(availability) => {
            let subject = match request {
                FetchRequest::AnalysisAvailability { rfq_id } => rfq_id.as_str(),
                _ => "RFQ",
            };
            if availability.available {
                vec![format!(
                    "Vendor analysis for {subject} is available ({} vendor(s))",
                    availability.vendor_count.unwrap_or_default()
                )]
            } else {
                vec![format!(
                    "Vendor analysis for {subject} is not available yet{}",
                    availability
                        .message
                        .as_deref()
                        .map(|message| format!(": {message}"))
                        .unwrap_or_default()
                )]
            }
        }
        FetchResult::AnalysisReport(report) => {
            let mut lines = vec![format!("Vendor analysis for {}", report.rfq_id)];
            if let Some(summary) = &report.summary {
                lines.push(format!("  {summary}"));
            }
            for (rank, vendor) in report.ranked_vendors().into_iter().enumerate() {
                let name = vendor.vendor_name.as_deref().unwrap_or(&vendor.vendor_id);
                let score = vendor
                    .overall_score
                    .map(|score| format!("{score:.1}"))
                    .unwrap_or_else(|| "-".to_string());
                let marker = if report.recommended_vendor.as_deref() == Some(vendor.vendor_id.as_str()) {
                    " (recommended)"
                } else {
                    ""
                };
                lines.push(format!("  {}. {name}  {score}{marker}", rank + 1));
            }
            lines
        }
        FetchResult::Saved(path) => vec![format!("Saved {}", path.display())],
    }
}

fn request_label(request: &FetchRequest) -> String {
    match request {
        FetchRequest::Projects => "Loading projects".to_string(),
        FetchRequest::Vendors { page, .. } => format!("Loading vendors page {page}"),
        FetchRequest::DocumentTypes => "Loading document types".to_string(),
        FetchRequest::AnalysisAvailability { rfq_id } => format!("Checking analysis for {rfq_id}"),
        FetchRequest::AnalysisReport { rfq_id } => format!("Loading analysis for {rfq_id}"),
        FetchRequest::Document { .. } => "Download".to_string(),
        FetchRequest::AnalysisPdf { rfq_id, .. } => format!("Analysis PDF for {rfq_id}"),
    }
}

fn document_row(update: &DocumentUpdate) -> String {
    let status = match update.status {
        DocumentStatus::Started => "started",
        DocumentStatus::Completed => "done",
        DocumentStatus::Failed => "failed",
    };
    format!(
        "  {} {} {}",
        update.timestamp,
        status,
        update
            .filename
            .as_deref()
            .or(update.document_id.as_deref())
            .unwrap_or("document")
    )
}

fn rfq_row(update: &RfqUpdate) -> String {
    let mut row = format!(
        "  {} {}",
        update.timestamp,
        update.status.as_deref().unwrap_or("updated")
    );
    if let Some(pct) = update.completion_percentage {
        row.push_str(&format!(" ({pct:.0}%)"));
    }
    if let Some(vendor) = &update.selected_vendor {
        row.push_str(&format!(" selected {vendor}"));
    }
    row
}

fn system_row(update: &SystemUpdate) -> String {
    let text = update
        .message
        .as_deref()
        .or(update.subject.as_deref())
        .or(update.status.as_deref())
        .unwrap_or("");
    format!("  {} {}", update.timestamp, text)
}

fn state_label(state: ConnectionState) -> &'static str {
    match state {
        ConnectionState::Connecting => "connecting",
        ConnectionState::Connected => "connected",
        ConnectionState::Disconnected => "disconnected",
        ConnectionState::Error => "error",
    }
}

fn step_label(step: WizardStep) -> &'static str {
    match step {
        WizardStep::Details => "Details",
        WizardStep::Project => "Project",
        WizardStep::Vendors => "Vendors",
        WizardStep::Review => "Review",
    }
}

fn field_label(field: FieldKey) -> String {
    match field {
        FieldKey::RfqId => "RFQ ID".to_string(),
        FieldKey::Description => "Description".to_string(),
        FieldKey::Deadline => "Deadline".to_string(),
        FieldKey::Project => "Project".to_string(),
        FieldKey::ProjectName => "Project name".to_string(),
        FieldKey::VendorRequirements => "Vendors".to_string(),
        FieldKey::RequirementVendor(row) => format!("Row {} vendor", row + 1),
        FieldKey::RequirementDocuments(row) => format!("Row {} documents", row + 1),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use rfq_core::{update, AppState, Channel, Msg};
    use rfq_engine::{AnalysisReport, VendorAnalysis};

    use super::*;

    fn state() -> AppState {
        AppState::new(Utc.with_ymd_and_hms(2026, 5, 4, 9, 30, 0).unwrap())
    }

    #[test]
    fn status_line_summarises_connections() {
        let (state, _) = update(
            state(),
            Msg::ConnectionChanged {
                channel: Channel::Documents,
                state: ConnectionState::Connected,
            },
        );
        assert_eq!(
            status_line(&state.view()),
            "Real-time: connected (dashboard disconnected, documents connected, rfq disconnected)"
        );
    }

    #[test]
    fn status_shows_last_submission() {
        let (state, _) = update(
            state(),
            Msg::SubmissionFinished {
                submitted: rfq_core::RfqSubmitted {
                    rfq_id: "RFQ_000009".to_string(),
                    project_id: "proj-1".to_string(),
                    status: "draft".to_string(),
                    deadline: chrono::NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
                    vendor_requirements: Vec::new(),
                    created_at: Utc.with_ymd_and_hms(2026, 5, 4, 9, 30, 0).unwrap(),
                },
                failures: Vec::new(),
                now: Utc.with_ymd_and_hms(2026, 5, 4, 9, 31, 0).unwrap(),
            },
        );
        let lines = render_status(&state.view());
        assert!(lines.contains(
            &"Last submitted: RFQ_000009 (draft, project proj-1, 0 vendor(s), due 2026-06-01)"
                .to_string()
        ));
    }

    #[test]
    fn wizard_errors_name_their_row() {
        let (state, _) = update(state(), Msg::WizardOpened);
        let (state, _) = update(state, Msg::DescriptionChanged("short".to_string()));
        let (state, _) = update(
            state,
            Msg::NextClicked {
                today: chrono::NaiveDate::from_ymd_opt(2026, 5, 4).unwrap(),
            },
        );
        let lines = render_wizard(&state.view().wizard);
        assert!(lines[0].contains("step 1/4: Details"));
        assert!(lines
            .iter()
            .any(|line| line == "  ! Description: Description must be at least 10 characters"));
    }

    #[test]
    fn report_lists_ranked_vendors() {
        let report = AnalysisReport {
            rfq_id: "RFQ_1".to_string(),
            summary: None,
            recommended_vendor: Some("v-2".to_string()),
            vendors: vec![
                VendorAnalysis {
                    vendor_id: "v-1".to_string(),
                    vendor_name: Some("Acme".to_string()),
                    overall_score: Some(6.0),
                    strengths: Vec::new(),
                    weaknesses: Vec::new(),
                },
                VendorAnalysis {
                    vendor_id: "v-2".to_string(),
                    vendor_name: None,
                    overall_score: Some(8.3),
                    strengths: Vec::new(),
                    weaknesses: Vec::new(),
                },
            ],
            generated_at: None,
        };
        let lines = render_fetch(
            &FetchRequest::AnalysisReport {
                rfq_id: "RFQ_1".to_string(),
            },
            &Ok(FetchResult::AnalysisReport(report)),
        );
        assert_eq!(
            lines,
            vec![
                "Vendor analysis for RFQ_1".to_string(),
                "  1. v-2  8.3 (recommended)".to_string(),
                "  2. Acme  6.0".to_string(),
            ]
        );
    }

    #[test]
    fn failed_fetch_shows_server_message() {
        let lines = render_fetch(
            &FetchRequest::Projects,
            &Err(ApiError::HttpStatus {
                status: 503,
                message: "Maintenance".to_string(),
            }),
        );
        assert_eq!(lines, vec!["[ERROR] Loading projects failed: Maintenance".to_string()]);
    }
}
