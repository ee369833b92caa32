use std::sync::Once;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use pretty_assertions::assert_eq;
use rfq_core::{
    is_valid_rfq_id, update, validate_step, AppState, Effect, FieldKey, Msg, ProjectMode,
    ProjectRef, RfqDraft, RfqSubmission, RfqSubmitted, ToastLevel, WizardStep,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(rfq_logging::initialize_for_tests);
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 9, 30, 0).unwrap()
}

fn today() -> NaiveDate {
    now().date_naive()
}

fn apply(state: AppState, msgs: Vec<Msg>) -> (AppState, Vec<Effect>) {
    let mut state = state;
    let mut effects = Vec::new();
    for msg in msgs {
        let (next, mut produced) = update(state, msg);
        state = next;
        effects.append(&mut produced);
    }
    (state, effects)
}

// What the engine reports back for `submission` once the RFQ is stored.
fn submitted(submission: &RfqSubmission, project_id: &str) -> RfqSubmitted {
    RfqSubmitted {
        rfq_id: submission.rfq_id.clone(),
        project_id: project_id.to_string(),
        status: "draft".to_string(),
        deadline: submission.deadline,
        vendor_requirements: submission.vendor_requirements.clone(),
        created_at: submission.requested_at,
    }
}

fn fill_details(state: AppState) -> AppState {
    let (state, _) = apply(
        state,
        vec![
            Msg::WizardOpened,
            Msg::RfqIdChanged("RFQ_123456".to_string()),
            Msg::DescriptionChanged("Steel beams".to_string() + "!"),
            Msg::DeadlineChanged(Some(today() + Duration::days(7))),
            Msg::NextClicked { today: today() },
        ],
    );
    state
}

fn fill_vendor(state: AppState) -> AppState {
    let (state, _) = apply(
        state,
        vec![
            Msg::VendorRequirementAdded,
            Msg::RequirementVendorSelected {
                index: 0,
                vendor_id: "vendor-7".to_string(),
            },
            Msg::RequirementDocumentToggled {
                index: 0,
                document_type: "vendor_quote".to_string(),
            },
            Msg::RequirementDocumentToggled {
                index: 0,
                document_type: "technical_spec".to_string(),
            },
        ],
    );
    state
}

#[test]
fn generated_id_matches_pattern() {
    let draft = RfqDraft::new(now());
    assert!(is_valid_rfq_id(&draft.rfq_id), "{}", draft.rfq_id);
    assert_eq!(draft.rfq_id.len(), "RFQ_".len() + 6);
}

#[test]
fn rfq_id_pattern_rejects_other_strings() {
    for bad in ["", "RFQ_", "rfq_123", "RFQ-123", "RFQ_12a", " RFQ_1x", "XRFQ_1"] {
        assert!(!is_valid_rfq_id(bad), "{bad:?} should be rejected");
    }
    assert!(is_valid_rfq_id("RFQ_1"));

    let mut draft = RfqDraft::new(now());
    draft.rfq_id = "RFQ-123".to_string();
    let errors = validate_step(WizardStep::Details, &draft, today());
    assert!(errors.get(FieldKey::RfqId).is_some());
}

#[test]
fn padded_rfq_id_fails_details() {
    let mut draft = RfqDraft::new(now());
    draft.description = "Twelve chars".to_string();
    draft.deadline = Some(today() + Duration::days(1));

    draft.rfq_id = " RFQ_123 ".to_string();
    let errors = validate_step(WizardStep::Details, &draft, today());
    assert_eq!(
        errors.get(FieldKey::RfqId),
        Some("RFQ ID must match the format RFQ_123456")
    );

    draft.rfq_id = "RFQ_123".to_string();
    assert!(validate_step(WizardStep::Details, &draft, today()).is_empty());
}

#[test]
fn deadline_today_fails_and_tomorrow_passes() {
    let mut draft = RfqDraft::new(now());
    draft.description = "Twelve chars".to_string();

    draft.deadline = Some(today());
    let errors = validate_step(WizardStep::Details, &draft, today());
    assert_eq!(errors.get(FieldKey::Deadline), Some("Deadline must be in the future"));

    draft.deadline = Some(today() - Duration::days(3));
    assert!(!validate_step(WizardStep::Details, &draft, today()).is_empty());

    draft.deadline = Some(today() + Duration::days(1));
    assert!(validate_step(WizardStep::Details, &draft, today()).is_empty());
}

#[test]
fn short_description_blocks_details() {
    init_logging();
    let (state, _) = apply(
        AppState::new(now()),
        vec![
            Msg::WizardOpened,
            Msg::DescriptionChanged("too short".to_string()),
            Msg::DeadlineChanged(Some(today() + Duration::days(2))),
            Msg::NextClicked { today: today() },
        ],
    );
    let wizard = state.wizard();
    assert_eq!(wizard.step(), WizardStep::Details);
    assert_eq!(
        wizard.errors().get(FieldKey::Description),
        Some("Description must be at least 10 characters")
    );
}

#[test]
fn new_project_without_name_blocks_project_step() {
    init_logging();
    let state = fill_details(AppState::new(now()));
    assert_eq!(state.wizard().step(), WizardStep::Project);

    let (state, _) = apply(
        state,
        vec![
            Msg::ProjectModeChanged(ProjectMode::New),
            Msg::NewProjectNameChanged("   ".to_string()),
            Msg::NextClicked { today: today() },
        ],
    );
    assert_eq!(state.wizard().step(), WizardStep::Project);
    assert_eq!(
        state.wizard().errors().get(FieldKey::ProjectName),
        Some("Project name is required.")
    );
}

#[test]
fn back_navigation_keeps_entered_data() {
    init_logging();
    let state = fill_details(AppState::new(now()));
    let (state, _) = apply(
        state,
        vec![
            Msg::ProjectSelected(Some("proj-1".to_string())),
            Msg::NextClicked { today: today() },
        ],
    );
    assert_eq!(state.wizard().step(), WizardStep::Vendors);

    let (state, _) = apply(state, vec![Msg::BackClicked]);
    assert_eq!(state.wizard().step(), WizardStep::Project);
    assert_eq!(state.wizard().draft().project_id.as_deref(), Some("proj-1"));

    let (mut state, _) = apply(state, vec![Msg::BackClicked]);
    let draft = state.wizard().draft();
    assert_eq!(state.wizard().step(), WizardStep::Details);
    assert_eq!(draft.rfq_id, "RFQ_123456");
    assert_eq!(draft.description, "Steel beams!");
    assert!(state.consume_dirty());

    // Already on the first step: nothing changes.
    let (mut state, effects) = update(state, Msg::BackClicked);
    assert!(effects.is_empty());
    assert_eq!(state.wizard().step(), WizardStep::Details);
    assert!(!state.consume_dirty());
}

#[test]
fn vendor_errors_are_attributed_to_rows() {
    init_logging();
    let state = fill_details(AppState::new(now()));
    let (state, _) = apply(
        state,
        vec![
            Msg::ProjectSelected(Some("proj-1".to_string())),
            Msg::NextClicked { today: today() },
            Msg::NextClicked { today: today() },
        ],
    );
    assert_eq!(
        state.wizard().errors().get(FieldKey::VendorRequirements),
        Some("At least one vendor requirement is required")
    );

    let state = fill_vendor(state);
    let (state, _) = apply(
        state,
        vec![
            Msg::VendorRequirementAdded,
            Msg::RequirementDocumentToggled {
                index: 1,
                document_type: "vendor_quote".to_string(),
            },
            Msg::VendorRequirementAdded,
            Msg::RequirementVendorSelected {
                index: 2,
                vendor_id: "vendor-9".to_string(),
            },
            Msg::NextClicked { today: today() },
        ],
    );

    let errors = state.wizard().errors();
    assert_eq!(state.wizard().step(), WizardStep::Vendors);
    assert_eq!(errors.get(FieldKey::RequirementVendor(1)), Some("Vendor is required"));
    assert!(errors.get(FieldKey::RequirementDocuments(1)).is_none());
    assert!(errors.get(FieldKey::RequirementDocuments(2)).is_some());
    assert!(errors.get(FieldKey::RequirementVendor(2)).is_none());
    assert_eq!(errors.requirement_rows().into_iter().collect::<Vec<_>>(), vec![1, 2]);
}

#[test]
fn toggling_a_document_twice_removes_it() {
    init_logging();
    let (state, _) = apply(
        AppState::new(now()),
        vec![
            Msg::VendorRequirementAdded,
            Msg::RequirementDocumentToggled {
                index: 0,
                document_type: "vendor_quote".to_string(),
            },
            Msg::RequirementDocumentToggled {
                index: 0,
                document_type: "vendor_quote".to_string(),
            },
        ],
    );
    assert!(state.wizard().draft().vendor_requirements[0]
        .required_documents
        .is_empty());

    let (mut state, _) = apply(state, vec![Msg::Tick]);
    state.consume_dirty();
    let (mut state, _) = update(state, Msg::VendorRequirementRemoved { index: 5 });
    assert!(!state.consume_dirty());
}

#[test]
fn full_submission_with_existing_project() {
    init_logging();
    let state = fill_details(AppState::new(now()));
    let (state, _) = apply(
        state,
        vec![
            Msg::ProjectSelected(Some("proj-1".to_string())),
            Msg::NextClicked { today: today() },
        ],
    );
    let state = fill_vendor(state);
    let (state, _) = apply(state, vec![Msg::NextClicked { today: today() }]);
    assert_eq!(state.wizard().step(), WizardStep::Review);

    let (state, effects) = update(state, Msg::SubmitClicked { now: now() });
    assert_eq!(effects.len(), 1);
    let Effect::SubmitRfq(submission) = &effects[0] else {
        panic!("expected submit effect, got {effects:?}");
    };
    assert_eq!(submission.rfq_id, "RFQ_123456");
    assert_eq!(
        submission.project,
        ProjectRef::Existing {
            project_id: "proj-1".to_string()
        }
    );
    assert_eq!(submission.vendor_requirements.len(), 1);
    assert_eq!(submission.vendor_requirements[0].required_documents.len(), 2);
    assert!(state.wizard().is_submitting());

    // A second click while in flight does nothing.
    let (state, effects) = update(state, Msg::SubmitClicked { now: now() });
    assert!(effects.is_empty());

    let later = now() + Duration::seconds(5);
    let (state, effects) = update(
        state,
        Msg::SubmissionFinished {
            submitted: submitted(&submission, "proj-1"),
            failures: Vec::new(),
            now: later,
        },
    );
    match effects.as_slice() {
        [Effect::ShowToast(toast)] => {
            assert_eq!(toast.level, ToastLevel::Success);
            assert!(toast.message.contains("proj-1"), "{}", toast.message);
        }
        other => panic!("unexpected effects {other:?}"),
    }
    let delivered = state.last_submission().expect("submission recorded");
    assert_eq!(delivered.rfq_id, "RFQ_123456");
    assert_eq!(delivered.project_id, "proj-1");
    assert_eq!(delivered.status, "draft");
    assert_eq!(delivered.created_at, now());
    assert_eq!(delivered.vendor_requirements.len(), 1);
    assert_eq!(state.view().last_submission.as_ref(), Some(delivered));
    let wizard = state.wizard();
    assert_eq!(wizard.step(), WizardStep::Details);
    assert!(!wizard.is_open());
    assert!(!wizard.is_submitting());
    assert!(wizard.draft().vendor_requirements.is_empty());
    assert_eq!(wizard.draft().rfq_id, rfq_core::generate_rfq_id(later));
}

#[test]
fn partial_failure_is_reported_as_warning() {
    init_logging();
    let (state, effects) = update(
        AppState::new(now()),
        Msg::SubmissionFinished {
            submitted: RfqSubmitted {
                rfq_id: "RFQ_1".to_string(),
                project_id: "PRJ_1773135000000".to_string(),
                status: "draft".to_string(),
                deadline: today() + Duration::days(7),
                vendor_requirements: Vec::new(),
                created_at: now(),
            },
            failures: vec!["create project: network error".to_string()],
            now: now(),
        },
    );
    match effects.as_slice() {
        [Effect::ShowToast(toast)] => {
            assert_eq!(toast.level, ToastLevel::Warning);
            assert!(toast.message.contains("network error"));
        }
        other => panic!("unexpected effects {other:?}"),
    }
    assert_eq!(state.wizard().step(), WizardStep::Details);
    assert_eq!(
        state.last_submission().map(|s| s.project_id.as_str()),
        Some("PRJ_1773135000000")
    );
}

#[test]
fn submit_revalidates_and_returns_to_failing_step() {
    init_logging();
    let state = fill_details(AppState::new(now()));
    let (state, _) = apply(
        state,
        vec![
            Msg::ProjectSelected(Some("proj-1".to_string())),
            Msg::NextClicked { today: today() },
        ],
    );
    let state = fill_vendor(state);
    let (state, _) = apply(state, vec![Msg::NextClicked { today: today() }]);

    // The deadline was a week out; submitting ten days later must fail.
    let late = now() + Duration::days(10);
    let (state, effects) = update(state, Msg::SubmitClicked { now: late });
    assert!(effects.is_empty());
    assert_eq!(state.wizard().step(), WizardStep::Details);
    assert!(state.wizard().errors().get(FieldKey::Deadline).is_some());
    assert!(!state.wizard().is_submitting());
}
