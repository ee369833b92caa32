use std::time::Duration;

use pretty_assertions::assert_eq;
use rfq_engine::{
    ClientConfig, EngineEvent, EngineHandle, FetchRequest, FetchResult, ProjectSelection,
    SocketChannel, SocketEventKind, SocketState, SubmissionRequest,
};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn next_event<F>(engine: &EngineHandle, mut wanted: F) -> EngineEvent
where
    F: FnMut(&EngineEvent) -> bool,
{
    for _ in 0..500 {
        while let Some(event) = engine.try_recv() {
            if wanted(&event) {
                return event;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("engine produced no matching event");
}

#[tokio::test(flavor = "multi_thread")]
async fn fetches_projects_on_the_background_runtime() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [{"id": "P1", "name": "Bridge"}, {"id": "P2", "name": "Tunnel"}]
        })))
        .mount(&server)
        .await;

    let config = ClientConfig::new(&format!("{}/api/v1", server.uri())).unwrap();
    let engine = EngineHandle::new(config).unwrap();
    engine.fetch(FetchRequest::Projects);

    let event = next_event(&engine, |event| matches!(event, EngineEvent::Fetched { .. })).await;
    let EngineEvent::Fetched { request, result } = event else {
        unreachable!();
    };
    assert_eq!(request, FetchRequest::Projects);
    let Ok(FetchResult::Projects(projects)) = result else {
        panic!("unexpected result {result:?}");
    };
    let names: Vec<&str> = projects.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Bridge", "Tunnel"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn submission_result_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/rfqs"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "success": true,
            "data": {"rfq_id": "RFQ_000042"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig::new(&format!("{}/api/v1", server.uri())).unwrap();
    let engine = EngineHandle::new(config).unwrap();
    engine.submit(SubmissionRequest {
        rfq_id: "RFQ_000042".to_string(),
        description: "Pumps and valves".to_string(),
        deadline: chrono::NaiveDate::from_ymd_opt(2027, 1, 15).unwrap(),
        project: ProjectSelection::Existing("P1".to_string()),
        vendor_requirements: Vec::new(),
        requested_at: chrono::Utc::now(),
    });

    let event = next_event(&engine, |event| {
        matches!(event, EngineEvent::SubmissionFinished(_))
    })
    .await;
    let EngineEvent::SubmissionFinished(Ok(created)) = event else {
        panic!("submission failed: {event:?}");
    };
    assert_eq!(created.rfq.rfq_id, "RFQ_000042");
}

#[tokio::test(flavor = "multi_thread")]
async fn disabled_websockets_leave_channels_disconnected() {
    let mut config = ClientConfig::new("http://127.0.0.1:9/api/v1").unwrap();
    config.websocket_enabled = false;
    let engine = EngineHandle::new(config).unwrap();
    engine.open_socket(SocketChannel::Dashboard, "/ws/dashboard");

    let event = next_event(&engine, |event| matches!(event, EngineEvent::Socket(_))).await;
    let EngineEvent::Socket(socket) = event else {
        unreachable!();
    };
    assert_eq!(socket.channel, SocketChannel::Dashboard);
    assert_eq!(
        socket.kind,
        SocketEventKind::StateChanged(SocketState::Disconnected)
    );
}
