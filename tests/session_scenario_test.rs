//! End-to-end session tests
//!
//! Drives the controller and question session against a wiremock backend:
//! upload, ask, batch and saved-response refresh.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use wiremock::{
    matchers::{body_string_contains, method, path},
    Mock, MockServer, ResponseTemplate,
};

use code_analysis_assistant::backend::BackendClient;
use code_analysis_assistant::config::{BackendConfig, RequestConfig};
use code_analysis_assistant::controller::Controller;
use code_analysis_assistant::session::SessionState;
use code_analysis_assistant::upload::UploadPair;
use code_analysis_assistant::view::Section;

const ANALYSIS: &str = r#"{
    "function_call_chains": {
        "app_py": { "main": ["fetch_users"], "render": [] },
        "api_py": { "fetch_users": ["get"], "create_user": ["post"], "health": [] }
    },
    "class_hierarchy": { "api_py": { "UserClient": { "parent_classes": ["BaseClient"], "methods": ["get"] } } },
    "node_type_frequencies": { "app_py": { "call": 4 }, "api_py": { "call": 6, "Name": 9 } },
    "async_functions": { "api_py": ["fetch_users"] }
}"#;

fn create_controller(base_url: &str) -> Controller {
    let config = BackendConfig {
        base_url: base_url.to_string(),
    };
    let client = BackendClient::new(&config, RequestConfig::default()).expect("Failed to create client");
    Controller::new(Arc::new(client))
}

fn today_path() -> String {
    format!("/gpt/responses/{}", Utc::now().date_naive().format("%Y-%m-%d"))
}

async fn mount_analysis(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/analyze/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ANALYSIS))
        .expect(1)
        .mount(server)
        .await;
}

fn upload_pair(dir: &tempfile::TempDir) -> UploadPair {
    let app = dir.path().join("app.py");
    let api = dir.path().join("api.py");
    std::fs::write(&app, "from api import fetch_users\n").unwrap();
    std::fs::write(&api, "async def fetch_users():\n    pass\n").unwrap();
    UploadPair::new(app, api).unwrap()
}

#[tokio::test]
async fn test_upload_then_ask_refreshes_todays_log() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_analysis(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/gpt/"))
        .and(body_string_contains("What functions does api.py have?"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "3 functions",
            "file_path": "/data/2024-01-01/001.json"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Once on mount, once after the answer.
    Mock::given(method("GET"))
        .and(path(today_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "responses": [
                { "question": "What functions does api.py have?", "response": "3 functions",
                  "timestamp": "2024-01-01T12:00:00", "file_path": "/data/2024-01-01/001.json" }
            ]
        })))
        .expect(2)
        .mount(&mock_server)
        .await;

    let mut controller = create_controller(&mock_server.uri());
    let record = controller.load_analysis(&upload_pair(&dir)).await.unwrap();
    assert_eq!(record.function_call_chains.api_py.len(), 3);

    let sections = controller.view();
    let Some(Section::File(api_view)) = sections.get(1) else {
        panic!("expected API block second, got {:?}", sections);
    };
    assert_eq!(api_view.metrics.function_count, 3);
    assert_eq!(api_view.metrics.class_count, 1);
    assert_eq!(api_view.metrics.call_count, 6);

    let session = controller.session_mut().unwrap();
    let interaction = session
        .ask("What functions does api.py have?")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(interaction.response, "3 functions");
    assert_eq!(session.history()[0].response, "3 functions");
    assert_eq!(session.history()[0].storage_id(), Some("001.json"));
    assert_eq!(session.saved_len(), 1);
    assert_eq!(session.state(), SessionState::Idle);
}

#[tokio::test]
async fn test_batch_after_single_ask() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_analysis(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/gpt/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "earlier answer",
            "file_path": "/data/2024-01-01/001.json"
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/gpt/batch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "question": "q1", "response": "a1", "timestamp": "2024-01-01T12:00:01", "file_path": "/data/2024-01-01/002.json" },
            { "question": "q2", "response": "a2", "timestamp": "2024-01-01T12:00:02", "file_path": "/data/2024-01-01/003.json" }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(today_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "responses": [] })))
        .mount(&mock_server)
        .await;

    let mut controller = create_controller(&mock_server.uri());
    controller.load_analysis(&upload_pair(&dir)).await.unwrap();
    let session = controller.session_mut().unwrap();

    session.ask("earlier").await.unwrap();
    session.enqueue("q1");
    session.enqueue("q2");
    session.submit_batch().await.unwrap();

    let questions: Vec<&str> = session.history().iter().map(|i| i.question.as_str()).collect();
    assert_eq!(questions, vec!["q1", "q2", "earlier"]);
    assert!(session.batch_queue().is_empty());
}

#[tokio::test]
async fn test_saved_refresh_failure_does_not_surface() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_analysis(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/gpt/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "fine",
            "file_path": null
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(today_path()))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "detail": "log unavailable" })))
        .mount(&mock_server)
        .await;

    let mut controller = create_controller(&mock_server.uri());
    controller.load_analysis(&upload_pair(&dir)).await.unwrap();
    let session = controller.session_mut().unwrap();

    let interaction = session.ask("q").await.unwrap();

    assert!(interaction.is_some());
    assert!(session.error().is_none());
    assert_eq!(session.saved_len(), 0);
    assert!(!session.is_loading_saved());
}

#[tokio::test]
async fn test_failed_ask_surfaces_detail_and_keeps_draft() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_analysis(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/gpt/"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "detail": "OpenAI request failed"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(today_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "responses": [] })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut controller = create_controller(&mock_server.uri());
    controller.load_analysis(&upload_pair(&dir)).await.unwrap();
    let session = controller.session_mut().unwrap();

    assert!(session.ask("How many imports are present in app.py?").await.is_err());

    assert_eq!(session.error(), Some("OpenAI request failed"));
    assert_eq!(session.draft(), "How many imports are present in app.py?");
    assert!(session.history().is_empty());
}
