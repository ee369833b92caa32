use chrono::{DateTime, NaiveDate, Utc};
use rfq_logging::{rfq_error, rfq_info};
use thiserror::Error;

use crate::api::{ApiClient, ApiError};
use crate::models::{NewProject, Project, Rfq, RfqPayload, VendorRequirementPayload};

pub const DRAFT_STATUS: &str = "draft";

/// The two backend calls a wizard submission needs.
#[async_trait::async_trait]
pub trait RfqBackend: Send + Sync {
    async fn create_project(&self, project: &NewProject) -> Result<Project, ApiError>;
    async fn create_rfq(&self, rfq: &RfqPayload) -> Result<Rfq, ApiError>;
}

#[async_trait::async_trait]
impl RfqBackend for ApiClient {
    async fn create_project(&self, project: &NewProject) -> Result<Project, ApiError> {
        ApiClient::create_project(self, project).await
    }

    async fn create_rfq(&self, rfq: &RfqPayload) -> Result<Rfq, ApiError> {
        ApiClient::create_rfq(self, rfq).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectSelection {
    Existing(String),
    New(NewProject),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    pub rfq_id: String,
    pub description: String,
    pub deadline: NaiveDate,
    pub project: ProjectSelection,
    pub vendor_requirements: Vec<VendorRequirementPayload>,
    /// Stamped as both `created_at` and `updated_at`.
    pub requested_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RfqCreated {
    pub payload: RfqPayload,
    pub rfq: Rfq,
}

/// At least one backend call failed. The assembled payload is still
/// delivered so the caller can keep the RFQ locally and warn the user.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("RFQ {} submitted with backend failures", .payload.rfq_id)]
pub struct PartialFailure {
    pub payload: RfqPayload,
    pub project_error: Option<ApiError>,
    pub rfq_error: Option<ApiError>,
}

impl PartialFailure {
    pub fn failures(&self) -> Vec<String> {
        let mut failures = Vec::new();
        if let Some(err) = &self.project_error {
            failures.push(format!("project not created ({})", err.user_message()));
        }
        if let Some(err) = &self.rfq_error {
            failures.push(format!("RFQ not saved ({})", err.user_message()));
        }
        failures
    }
}

/// Creates the project (when new) and then the RFQ, strictly in that order.
///
/// A failed project creation does not abort: a placeholder id derived from
/// the request time is used instead and the RFQ is still sent.
pub async fn submit_rfq<B>(
    backend: &B,
    request: SubmissionRequest,
) -> Result<RfqCreated, PartialFailure>
where
    B: RfqBackend + ?Sized,
{
    let mut project_error = None;
    let project_id = match &request.project {
        ProjectSelection::Existing(project_id) => project_id.clone(),
        ProjectSelection::New(project) => match backend.create_project(project).await {
            Ok(created) => {
                rfq_info!("Created project {} for {}", created.id, request.rfq_id);
                created.id
            }
            Err(err) => {
                rfq_error!("Creating project {:?} failed: {}", project.name, err);
                project_error = Some(err);
                placeholder_project_id(request.requested_at)
            }
        },
    };

    let now = request.requested_at;
    let payload = RfqPayload {
        rfq_id: request.rfq_id,
        description: request.description,
        deadline: request.deadline,
        project_id,
        vendor_requirements: request.vendor_requirements,
        status: DRAFT_STATUS.to_string(),
        created_at: now,
        updated_at: now,
    };

    let created = backend.create_rfq(&payload).await;
    match created {
        Ok(rfq) if project_error.is_none() => Ok(RfqCreated { payload, rfq }),
        Ok(_) => Err(PartialFailure {
            payload,
            project_error,
            rfq_error: None,
        }),
        Err(err) => {
            rfq_error!("Creating {} failed: {}", payload.rfq_id, err);
            Err(PartialFailure {
                payload,
                project_error,
                rfq_error: Some(err),
            })
        }
    }
}

pub fn placeholder_project_id(now: DateTime<Utc>) -> String {
    format!("PRJ_{}", now.timestamp_millis())
}
