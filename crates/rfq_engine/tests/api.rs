use std::fs;
use std::time::Duration;

use pretty_assertions::assert_eq;
use rfq_engine::{
    ApiClient, ApiError, ClientConfig, DocumentRef, EvaluationCriterionInput, PageRequest,
    VendorInput,
};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> ApiClient {
    let config = ClientConfig::new(&format!("{}/api/v1", server.uri())).expect("config");
    ApiClient::new(config).expect("client")
}

#[tokio::test]
async fn lists_vendors_with_pagination() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/vendors"))
        .and(query_param("page", "2"))
        .and(query_param("per_page", "1"))
        .and(query_param("search", "steel"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [{"id": "v-2", "name": "Acme Steel", "email": "sales@acme.test"}],
            "message": "ok",
            "timestamp": "2026-01-01T00:00:00Z",
            "total_count": 3,
            "page": 2,
            "per_page": 1,
            "has_more": true,
            "total_pages": 3
        })))
        .mount(&server)
        .await;

    let page = client(&server)
        .list_vendors(&PageRequest {
            page: 2,
            per_page: 1,
            search: Some(" steel ".to_string()),
        })
        .await
        .expect("vendors");

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].name, "Acme Steel");
    assert_eq!(page.items[0].email.as_deref(), Some("sales@acme.test"));
    assert_eq!(page.total_count, 3);
    assert!(page.has_more);
    assert_eq!(page.total_pages, 3);
}

#[tokio::test]
async fn page_without_data_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/vendors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "total_count": 0
        })))
        .mount(&server)
        .await;

    let page = client(&server)
        .list_vendors(&PageRequest::default())
        .await
        .expect("vendors");

    assert!(page.items.is_empty());
    assert_eq!(page.total_count, 0);
    assert!(!page.has_more);
}

#[tokio::test]
async fn missing_data_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/vendors/v-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    let err = client(&server).get_vendor("v-9").await.unwrap_err();

    assert_eq!(err, ApiError::Decode("response has no data".to_string()));
}

#[tokio::test]
async fn http_errors_carry_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/vendors"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "success": false,
            "message": "Vendor email already exists"
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .create_vendor(&VendorInput {
            name: "Acme".to_string(),
            email: Some("dup@acme.test".to_string()),
            ..VendorInput::default()
        })
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ApiError::HttpStatus {
            status: 422,
            message: "Vendor email already exists".to_string()
        }
    );
    assert_eq!(err.user_message(), "Vendor email already exists");
}

#[tokio::test]
async fn unsuccessful_envelope_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "data": null,
            "message": "Database unavailable"
        })))
        .mount(&server)
        .await;

    let err = client(&server).list_projects().await.unwrap_err();
    assert_eq!(err, ApiError::Rejected("Database unavailable".to_string()));
}

#[tokio::test]
async fn slow_responses_time_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/document-types"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({"success": true, "data": []})),
        )
        .mount(&server)
        .await;

    let mut config = ClientConfig::new(&format!("{}/api/v1", server.uri())).unwrap();
    config.request_timeout = Duration::from_millis(50);
    let err = ApiClient::new(config)
        .unwrap()
        .list_document_types()
        .await
        .unwrap_err();
    assert_eq!(err, ApiError::Timeout);
}

#[tokio::test]
async fn rfq_vendor_association_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/rfqs/RFQ_100/vendors"))
        .and(body_partial_json(json!({
            "vendor_id": "v-1",
            "required_documents": ["vendor_quote"]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "success": true,
            "data": {"rfq_id": "RFQ_100", "vendor_id": "v-1", "required_documents": ["vendor_quote"]}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/rfqs/RFQ_100/vendors/v-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": null,
            "message": "removed"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server);
    let link = api
        .add_rfq_vendor("RFQ_100", "v-1", &["vendor_quote".to_string()])
        .await
        .expect("add");
    assert_eq!(link.vendor_id, "v-1");
    api.remove_rfq_vendor("RFQ_100", "v-1")
        .await
        .expect("remove");
}

#[tokio::test]
async fn criterion_weight_is_checked_before_sending() {
    let server = MockServer::start().await;
    let err = client(&server)
        .create_evaluation_criterion(
            "RFQ_1",
            &EvaluationCriterionInput {
                name: "Price".to_string(),
                weight: 140.0,
                ..EvaluationCriterionInput::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidRequest(_)));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn analysis_report_ranks_vendors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/ai-analysis/RFQ_5/report"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "rfq_id": "RFQ_5",
                "recommended_vendor": "v-2",
                "vendors": [
                    {"vendor_id": "v-1", "overall_score": 6.5},
                    {"vendor_id": "v-3"},
                    {"vendor_id": "v-2", "overall_score": 8.75}
                ]
            }
        })))
        .mount(&server)
        .await;

    let report = client(&server).analysis_report("RFQ_5").await.expect("report");
    let ranked: Vec<&str> = report
        .ranked_vendors()
        .iter()
        .map(|vendor| vendor.vendor_id.as_str())
        .collect();
    assert_eq!(ranked, vec!["v-2", "v-1", "v-3"]);
}

#[tokio::test]
async fn stream_url_prefers_document_id() {
    let server = MockServer::start().await;
    let api = client(&server);

    let by_id = api
        .document_stream_url(&DocumentRef {
            document_id: Some("doc 9".to_string()),
            blob_name: Some("ignored.pdf".to_string()),
            filename: None,
        })
        .unwrap();
    assert_eq!(by_id.path(), "/api/v1/documents/doc%209/stream");

    let by_blob = api
        .document_stream_url(&DocumentRef {
            blob_name: Some("rfq/quote.pdf".to_string()),
            ..DocumentRef::default()
        })
        .unwrap();
    assert_eq!(by_blob.path(), "/api/v1/documents/stream");
    assert_eq!(by_blob.query(), Some("blob_name=rfq%2Fquote.pdf"));

    assert!(api.document_stream_url(&DocumentRef::default()).is_none());
}

#[tokio::test]
async fn downloads_document_to_directory() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/documents/doc-1/stream"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"%PDF-1.7 data".to_vec(), "application/pdf"))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let saved = client(&server)
        .download_document(
            &DocumentRef {
                document_id: Some("doc-1".to_string()),
                filename: Some("../quote:final.pdf".to_string()),
                ..DocumentRef::default()
            },
            temp.path(),
        )
        .await
        .expect("download");

    assert_eq!(saved.parent(), Some(temp.path()));
    assert_eq!(saved.file_name().unwrap(), "quote_final.pdf");
    assert_eq!(fs::read(&saved).unwrap(), b"%PDF-1.7 data");
}

#[tokio::test]
async fn missing_pdf_is_an_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/ai-analysis/RFQ_2/report/pdf"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Report not ready"})))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let err = client(&server)
        .download_analysis_pdf("RFQ_2", temp.path())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ApiError::HttpStatus {
            status: 404,
            message: "Report not ready".to_string()
        }
    );
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
}
