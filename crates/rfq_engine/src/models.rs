//! Request and response bodies of the RFQ backend.
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Backend routes disagree on whether ids are strings or integers.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(text) => text,
            RawId::Number(number) => number.to_string(),
        }
    }
}

fn id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    RawId::deserialize(deserializer).map(String::from)
}

fn optional_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Option::<RawId>::deserialize(deserializer).map(|raw| raw.map(String::from))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(deserialize_with = "id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewProject {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vendor {
    #[serde(deserialize_with = "id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct VendorInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorRequirementPayload {
    pub vendor_id: String,
    pub required_documents: Vec<String>,
}

/// Body sent to create an RFQ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RfqPayload {
    pub rfq_id: String,
    pub description: String,
    pub deadline: NaiveDate,
    pub project_id: String,
    pub vendor_requirements: Vec<VendorRequirementPayload>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rfq {
    #[serde(deserialize_with = "id")]
    pub rfq_id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default, deserialize_with = "optional_id")]
    pub project_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub vendor_requirements: Vec<VendorRequirementPayload>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RfqChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RfqVendor {
    #[serde(deserialize_with = "id")]
    pub rfq_id: String,
    #[serde(deserialize_with = "id")]
    pub vendor_id: String,
    #[serde(default)]
    pub required_documents: Vec<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentType {
    #[serde(deserialize_with = "id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub file_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DocumentTypeInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub required: bool,
    pub file_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationCriterion {
    #[serde(deserialize_with = "id")]
    pub id: String,
    #[serde(default, deserialize_with = "optional_id")]
    pub rfq_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub weight: f64,
    #[serde(default)]
    pub max_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct EvaluationCriterionInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub weight: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisAvailability {
    pub available: bool,
    #[serde(default, deserialize_with = "optional_id")]
    pub rfq_id: Option<String>,
    #[serde(default)]
    pub vendor_count: Option<u32>,
    #[serde(default)]
    pub generated_at: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorAnalysis {
    #[serde(deserialize_with = "id")]
    pub vendor_id: String,
    #[serde(default)]
    pub vendor_name: Option<String>,
    #[serde(default)]
    pub overall_score: Option<f64>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
}

/// AI-generated vendor comparison for one RFQ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(deserialize_with = "id")]
    pub rfq_id: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub recommended_vendor: Option<String>,
    #[serde(default)]
    pub vendors: Vec<VendorAnalysis>,
    #[serde(default)]
    pub generated_at: Option<String>,
}

impl AnalysisReport {
    /// Vendors ordered by descending score; unscored vendors last.
    pub fn ranked_vendors(&self) -> Vec<&VendorAnalysis> {
        let mut ranked: Vec<&VendorAnalysis> = self.vendors.iter().collect();
        ranked.sort_by(|a, b| {
            b.overall_score
                .unwrap_or(f64::NEG_INFINITY)
                .total_cmp(&a.overall_score.unwrap_or(f64::NEG_INFINITY))
        });
        ranked
    }
}

/// Stored vendor document, addressed by id or by its storage blob name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentRef {
    #[serde(default, deserialize_with = "optional_id")]
    pub document_id: Option<String>,
    #[serde(default)]
    pub blob_name: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn numeric_ids_decode_as_text() {
        let rfq: Rfq = serde_json::from_value(json!({
            "rfq_id": "RFQ_000007",
            "project_id": 77
        }))
        .unwrap();
        assert_eq!(rfq.project_id.as_deref(), Some("77"));

        let vendor: RfqVendor =
            serde_json::from_value(json!({"rfq_id": "RFQ_000007", "vendor_id": 12})).unwrap();
        assert_eq!(vendor.vendor_id, "12");

        let rfq: Rfq = serde_json::from_value(json!({"rfq_id": "RFQ_000008"})).unwrap();
        assert_eq!(rfq.project_id, None);
    }
}
