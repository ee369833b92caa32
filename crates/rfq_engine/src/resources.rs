//! Resource endpoints of the RFQ backend.
use reqwest::Method;
use serde::Serialize;

use crate::api::{ApiClient, ApiError, Page, PageRequest};
use crate::models::{
    AnalysisAvailability, AnalysisReport, DocumentType, DocumentTypeInput, EvaluationCriterion,
    EvaluationCriterionInput, NewProject, Project, Rfq, RfqChanges, RfqPayload, RfqVendor, Vendor,
    VendorInput,
};

#[derive(Debug, Serialize)]
struct RfqVendorInput<'a> {
    vendor_id: &'a str,
    required_documents: &'a [String],
}

impl ApiClient {
    pub async fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        self.get(self.url(&["projects"])).await
    }

    pub async fn create_project(&self, project: &NewProject) -> Result<Project, ApiError> {
        self.send_json(Method::POST, self.url(&["projects"]), project)
            .await
    }

    pub async fn list_vendors(&self, page: &PageRequest) -> Result<Page<Vendor>, ApiError> {
        self.get_page(self.url(&["vendors"]), page).await
    }

    pub async fn get_vendor(&self, vendor_id: &str) -> Result<Vendor, ApiError> {
        self.get(self.url(&["vendors", vendor_id])).await
    }

    pub async fn create_vendor(&self, vendor: &VendorInput) -> Result<Vendor, ApiError> {
        self.send_json(Method::POST, self.url(&["vendors"]), vendor)
            .await
    }

    pub async fn update_vendor(
        &self,
        vendor_id: &str,
        vendor: &VendorInput,
    ) -> Result<Vendor, ApiError> {
        self.send_json(Method::PUT, self.url(&["vendors", vendor_id]), vendor)
            .await
    }

    pub async fn delete_vendor(&self, vendor_id: &str) -> Result<(), ApiError> {
        self.delete(self.url(&["vendors", vendor_id])).await
    }

    pub async fn list_rfqs(&self, page: &PageRequest) -> Result<Page<Rfq>, ApiError> {
        self.get_page(self.url(&["rfqs"]), page).await
    }

    pub async fn get_rfq(&self, rfq_id: &str) -> Result<Rfq, ApiError> {
        self.get(self.url(&["rfqs", rfq_id])).await
    }

    pub async fn create_rfq(&self, rfq: &RfqPayload) -> Result<Rfq, ApiError> {
        self.send_json(Method::POST, self.url(&["rfqs"]), rfq).await
    }

    pub async fn update_rfq(&self, rfq_id: &str, changes: &RfqChanges) -> Result<Rfq, ApiError> {
        self.send_json(Method::PUT, self.url(&["rfqs", rfq_id]), changes)
            .await
    }

    pub async fn delete_rfq(&self, rfq_id: &str) -> Result<(), ApiError> {
        self.delete(self.url(&["rfqs", rfq_id])).await
    }

    pub async fn list_rfq_vendors(&self, rfq_id: &str) -> Result<Vec<RfqVendor>, ApiError> {
        self.get(self.url(&["rfqs", rfq_id, "vendors"])).await
    }

    pub async fn add_rfq_vendor(
        &self,
        rfq_id: &str,
        vendor_id: &str,
        required_documents: &[String],
    ) -> Result<RfqVendor, ApiError> {
        let body = RfqVendorInput {
            vendor_id,
            required_documents,
        };
        self.send_json(Method::POST, self.url(&["rfqs", rfq_id, "vendors"]), &body)
            .await
    }

    pub async fn remove_rfq_vendor(&self, rfq_id: &str, vendor_id: &str) -> Result<(), ApiError> {
        self.delete(self.url(&["rfqs", rfq_id, "vendors", vendor_id]))
            .await
    }

    pub async fn list_document_types(&self) -> Result<Vec<DocumentType>, ApiError> {
        self.get(self.url(&["document-types"])).await
    }

    pub async fn create_document_type(
        &self,
        document_type: &DocumentTypeInput,
    ) -> Result<DocumentType, ApiError> {
        self.send_json(Method::POST, self.url(&["document-types"]), document_type)
            .await
    }

    pub async fn update_document_type(
        &self,
        type_id: &str,
        document_type: &DocumentTypeInput,
    ) -> Result<DocumentType, ApiError> {
        self.send_json(
            Method::PUT,
            self.url(&["document-types", type_id]),
            document_type,
        )
        .await
    }

    pub async fn delete_document_type(&self, type_id: &str) -> Result<(), ApiError> {
        self.delete(self.url(&["document-types", type_id])).await
    }

    pub async fn list_evaluation_criteria(
        &self,
        rfq_id: &str,
    ) -> Result<Vec<EvaluationCriterion>, ApiError> {
        self.get(self.url(&["rfqs", rfq_id, "evaluation-criteria"]))
            .await
    }

    pub async fn create_evaluation_criterion(
        &self,
        rfq_id: &str,
        criterion: &EvaluationCriterionInput,
    ) -> Result<EvaluationCriterion, ApiError> {
        validate_weight(criterion)?;
        self.send_json(
            Method::POST,
            self.url(&["rfqs", rfq_id, "evaluation-criteria"]),
            criterion,
        )
        .await
    }

    pub async fn update_evaluation_criterion(
        &self,
        rfq_id: &str,
        criterion_id: &str,
        criterion: &EvaluationCriterionInput,
    ) -> Result<EvaluationCriterion, ApiError> {
        validate_weight(criterion)?;
        self.send_json(
            Method::PUT,
            self.url(&["rfqs", rfq_id, "evaluation-criteria", criterion_id]),
            criterion,
        )
        .await
    }

    pub async fn delete_evaluation_criterion(
        &self,
        rfq_id: &str,
        criterion_id: &str,
    ) -> Result<(), ApiError> {
        self.delete(self.url(&["rfqs", rfq_id, "evaluation-criteria", criterion_id]))
            .await
    }

    pub async fn analysis_availability(
        &self,
        rfq_id: &str,
    ) -> Result<AnalysisAvailability, ApiError> {
        self.get(self.url(&["ai-analysis", rfq_id, "availability"]))
            .await
    }

    pub async fn analysis_report(&self, rfq_id: &str) -> Result<AnalysisReport, ApiError> {
        self.get(self.url(&["ai-analysis", rfq_id, "report"])).await
    }
}

fn validate_weight(criterion: &EvaluationCriterionInput) -> Result<(), ApiError> {
    if criterion.name.trim().is_empty() {
        return Err(ApiError::InvalidRequest("criterion name is required".into()));
    }
    if !(0.0..=100.0).contains(&criterion.weight) {
        return Err(ApiError::InvalidRequest(format!(
            "criterion weight {} is outside 0-100",
            criterion.weight
        )));
    }
    Ok(())
}
