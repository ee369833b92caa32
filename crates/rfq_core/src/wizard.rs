use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};

pub const MIN_DESCRIPTION_CHARS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WizardStep {
    #[default]
    Details,
    Project,
    Vendors,
    Review,
}

impl WizardStep {
    pub fn number(self) -> u8 {
        match self {
            WizardStep::Details => 1,
            WizardStep::Project => 2,
            WizardStep::Vendors => 3,
            WizardStep::Review => 4,
        }
    }

    pub fn next(self) -> Option<Self> {
        match self {
            WizardStep::Details => Some(WizardStep::Project),
            WizardStep::Project => Some(WizardStep::Vendors),
            WizardStep::Vendors => Some(WizardStep::Review),
            WizardStep::Review => None,
        }
    }

    pub fn previous(self) -> Option<Self> {
        match self {
            WizardStep::Details => None,
            WizardStep::Project => Some(WizardStep::Details),
            WizardStep::Vendors => Some(WizardStep::Project),
            WizardStep::Review => Some(WizardStep::Vendors),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectMode {
    #[default]
    Existing,
    New,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewProjectDraft {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VendorRequirement {
    pub vendor_id: String,
    pub required_documents: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RfqDraft {
    pub rfq_id: String,
    pub description: String,
    pub deadline: Option<NaiveDate>,
    pub project_mode: ProjectMode,
    pub project_id: Option<String>,
    pub new_project: NewProjectDraft,
    pub vendor_requirements: Vec<VendorRequirement>,
}

impl RfqDraft {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            rfq_id: generate_rfq_id(now),
            description: String::new(),
            deadline: None,
            project_mode: ProjectMode::Existing,
            project_id: None,
            new_project: NewProjectDraft::default(),
            vendor_requirements: Vec::new(),
        }
    }
}

/// `RFQ_` followed by the last six digits of the millisecond clock.
pub fn generate_rfq_id(now: DateTime<Utc>) -> String {
    format!("RFQ_{:06}", now.timestamp_millis().rem_euclid(1_000_000))
}

/// Matches `^RFQ_\d+$`.
pub fn is_valid_rfq_id(rfq_id: &str) -> bool {
    rfq_id
        .strip_prefix("RFQ_")
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// Form field an error is attached to. Requirement fields carry the row index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldKey {
    RfqId,
    Description,
    Deadline,
    Project,
    ProjectName,
    VendorRequirements,
    RequirementVendor(usize),
    RequirementDocuments(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors {
    fields: BTreeMap<FieldKey, String>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn get(&self, field: FieldKey) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldKey, &str)> + '_ {
        self.fields.iter().map(|(key, msg)| (*key, msg.as_str()))
    }

    /// Indices of vendor requirement rows that have at least one error.
    pub fn requirement_rows(&self) -> BTreeSet<usize> {
        self.fields
            .keys()
            .filter_map(|key| match key {
                FieldKey::RequirementVendor(i) | FieldKey::RequirementDocuments(i) => Some(*i),
                _ => None,
            })
            .collect()
    }

    fn insert(&mut self, field: FieldKey, message: &str) {
        self.fields.insert(field, message.to_string());
    }

    fn remove(&mut self, field: FieldKey) {
        self.fields.remove(&field);
    }

    fn clear_requirements(&mut self) {
        self.fields.retain(|key, _| {
            !matches!(
                key,
                FieldKey::VendorRequirements
                    | FieldKey::RequirementVendor(_)
                    | FieldKey::RequirementDocuments(_)
            )
        });
    }
}

/// Runs the gate for `step`. The review step has no gate of its own.
pub fn validate_step(step: WizardStep, draft: &RfqDraft, today: NaiveDate) -> ValidationErrors {
    let mut errors = ValidationErrors::default();
    match step {
        WizardStep::Details => {
            let rfq_id = draft.rfq_id.as_str();
            if rfq_id.trim().is_empty() {
                errors.insert(FieldKey::RfqId, "RFQ ID is required");
            } else if !is_valid_rfq_id(rfq_id) {
                errors.insert(FieldKey::RfqId, "RFQ ID must match the format RFQ_123456");
            }

            let description = draft.description.trim();
            if description.is_empty() {
                errors.insert(FieldKey::Description, "Description is required");
            } else if description.chars().count() < MIN_DESCRIPTION_CHARS {
                errors.insert(
                    FieldKey::Description,
                    "Description must be at least 10 characters",
                );
            }

            match draft.deadline {
                None => errors.insert(FieldKey::Deadline, "Deadline is required"),
                Some(deadline) if deadline <= today => {
                    errors.insert(FieldKey::Deadline, "Deadline must be in the future")
                }
                Some(_) => {}
            }
        }
        WizardStep::Project => match draft.project_mode {
            ProjectMode::Existing => {
                if draft.project_id.as_deref().is_none_or(str::is_empty) {
                    errors.insert(FieldKey::Project, "Please select a project");
                }
            }
            ProjectMode::New => {
                if draft.new_project.name.trim().is_empty() {
                    errors.insert(FieldKey::ProjectName, "Project name is required.");
                }
            }
        },
        WizardStep::Vendors => {
            if draft.vendor_requirements.is_empty() {
                errors.insert(
                    FieldKey::VendorRequirements,
                    "At least one vendor requirement is required",
                );
            }
            for (index, requirement) in draft.vendor_requirements.iter().enumerate() {
                if requirement.vendor_id.trim().is_empty() {
                    errors.insert(FieldKey::RequirementVendor(index), "Vendor is required");
                }
                if requirement.required_documents.is_empty() {
                    errors.insert(
                        FieldKey::RequirementDocuments(index),
                        "Select at least one required document type",
                    );
                }
            }
        }
        WizardStep::Review => {}
    }
    errors
}

/// Project the RFQ will reference once submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectRef {
    Existing { project_id: String },
    New { name: String, description: String },
}

/// Everything the engine needs to create the RFQ, captured at submit time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RfqSubmission {
    pub rfq_id: String,
    pub description: String,
    pub deadline: NaiveDate,
    pub project: ProjectRef,
    pub vendor_requirements: Vec<VendorRequirement>,
    pub requested_at: DateTime<Utc>,
}

/// The RFQ as the backend was asked to store it, reported back once the
/// submission finishes. Delivered even when a backend call failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RfqSubmitted {
    pub rfq_id: String,
    /// Resolved id: the selected or newly created project, or a placeholder.
    pub project_id: String,
    pub status: String,
    pub deadline: NaiveDate,
    pub vendor_requirements: Vec<VendorRequirement>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardState {
    step: WizardStep,
    draft: RfqDraft,
    errors: ValidationErrors,
    is_open: bool,
    is_submitting: bool,
}

impl WizardState {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            step: WizardStep::Details,
            draft: RfqDraft::new(now),
            errors: ValidationErrors::default(),
            is_open: false,
            is_submitting: false,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn draft(&self) -> &RfqDraft {
        &self.draft
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    pub fn open(&mut self) {
        self.is_open = true;
    }

    /// Discards the draft and returns to the first step with a fresh id.
    pub fn reset(&mut self, now: DateTime<Utc>) {
        *self = Self::new(now);
    }

    pub fn set_rfq_id(&mut self, rfq_id: String) {
        self.draft.rfq_id = rfq_id;
        self.errors.remove(FieldKey::RfqId);
    }

    pub fn set_description(&mut self, description: String) {
        self.draft.description = description;
        self.errors.remove(FieldKey::Description);
    }

    pub fn set_deadline(&mut self, deadline: Option<NaiveDate>) {
        self.draft.deadline = deadline;
        self.errors.remove(FieldKey::Deadline);
    }

    pub fn set_project_mode(&mut self, mode: ProjectMode) {
        self.draft.project_mode = mode;
        self.errors.remove(FieldKey::Project);
        self.errors.remove(FieldKey::ProjectName);
    }

    pub fn select_project(&mut self, project_id: Option<String>) {
        self.draft.project_id = project_id;
        self.errors.remove(FieldKey::Project);
    }

    pub fn set_new_project_name(&mut self, name: String) {
        self.draft.new_project.name = name;
        self.errors.remove(FieldKey::ProjectName);
    }

    pub fn set_new_project_description(&mut self, description: String) {
        self.draft.new_project.description = description;
    }

    pub fn add_requirement(&mut self) {
        self.draft
            .vendor_requirements
            .push(VendorRequirement::default());
        self.errors.remove(FieldKey::VendorRequirements);
    }

    pub fn remove_requirement(&mut self, index: usize) -> bool {
        if index >= self.draft.vendor_requirements.len() {
            return false;
        }
        self.draft.vendor_requirements.remove(index);
        // Row indices shift, so stale per-row errors would point at the wrong row.
        self.errors.clear_requirements();
        true
    }

    pub fn select_requirement_vendor(&mut self, index: usize, vendor_id: String) -> bool {
        let Some(requirement) = self.draft.vendor_requirements.get_mut(index) else {
            return false;
        };
        requirement.vendor_id = vendor_id;
        self.errors.remove(FieldKey::RequirementVendor(index));
        true
    }

    /// Adds the document type if absent, removes it otherwise.
    pub fn toggle_requirement_document(&mut self, index: usize, document_type: String) -> bool {
        let Some(requirement) = self.draft.vendor_requirements.get_mut(index) else {
            return false;
        };
        if !requirement.required_documents.remove(&document_type) {
            requirement.required_documents.insert(document_type);
        }
        self.errors.remove(FieldKey::RequirementDocuments(index));
        true
    }

    /// Validates the current step and advances on success.
    pub fn go_next(&mut self, today: NaiveDate) -> bool {
        let Some(next) = self.step.next() else {
            return false;
        };
        self.errors = validate_step(self.step, &self.draft, today);
        if !self.errors.is_empty() {
            return false;
        }
        self.step = next;
        true
    }

    /// Steps back one page, keeping everything entered so far.
    pub fn go_back(&mut self) -> bool {
        match self.step.previous() {
            Some(previous) if !self.is_submitting => {
                self.step = previous;
                self.errors = ValidationErrors::default();
                true
            }
            _ => false,
        }
    }

    /// Re-runs every gate and, if all pass, captures the submission.
    ///
    /// On failure the wizard moves to the first failing step with its errors.
    pub fn begin_submit(&mut self, now: DateTime<Utc>) -> Option<RfqSubmission> {
        if self.step != WizardStep::Review || self.is_submitting {
            return None;
        }
        let today = now.date_naive();
        for step in [WizardStep::Details, WizardStep::Project, WizardStep::Vendors] {
            let errors = validate_step(step, &self.draft, today);
            if !errors.is_empty() {
                self.step = step;
                self.errors = errors;
                return None;
            }
        }
        let deadline = self.draft.deadline?;

        let draft = &self.draft;
        let project = match draft.project_mode {
            ProjectMode::Existing => ProjectRef::Existing {
                project_id: draft.project_id.clone().unwrap_or_default(),
            },
            ProjectMode::New => ProjectRef::New {
                name: draft.new_project.name.trim().to_string(),
                description: draft.new_project.description.trim().to_string(),
            },
        };
        let submission = RfqSubmission {
            rfq_id: draft.rfq_id.clone(),
            description: draft.description.trim().to_string(),
            deadline,
            project,
            vendor_requirements: draft.vendor_requirements.clone(),
            requested_at: now,
        };
        self.is_submitting = true;
        Some(submission)
    }
}
