//! Integration tests for the analyzer backend client
//!
//! Tests HTTP client behavior using wiremock for request/response mocking.

use chrono::NaiveDate;
use serde_json::json;
use wiremock::{
    matchers::{body_string_contains, header_exists, method, path},
    Mock, MockServer, ResponseTemplate,
};

use code_analysis_assistant::analysis::AnalysisRecord;
use code_analysis_assistant::backend::{AnalyzerBackend, BackendClient, DiagramType};
use code_analysis_assistant::config::{BackendConfig, RequestConfig};
use code_analysis_assistant::error::BackendError;
use code_analysis_assistant::upload::UploadPair;

/// Create a test client pointing to mock server
fn create_test_client(base_url: &str) -> BackendClient {
    let config = BackendConfig {
        base_url: base_url.to_string(),
    };
    BackendClient::new(&config, RequestConfig::default()).expect("Failed to create client")
}

fn small_record() -> AnalysisRecord {
    AnalysisRecord::from_json_str(r#"{ "async_functions": { "api_py": ["fetch"] } }"#)
        .expect("valid record")
}

#[cfg(test)]
mod analyze_tests {
    use super::*;

    fn upload_pair(dir: &tempfile::TempDir) -> UploadPair {
        let app = dir.path().join("app.py");
        let api = dir.path().join("api.py");
        std::fs::write(&app, "import api\n\ndef main():\n    api.fetch()\n").unwrap();
        std::fs::write(&api, "async def fetch():\n    pass\n").unwrap();
        UploadPair::new(app, api).unwrap()
    }

    #[tokio::test]
    async fn test_analyze_uploads_both_files_and_decodes_record() {
        let mock_server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();

        Mock::given(method("POST"))
            .and(path("/analyze/"))
            .and(header_exists("content-type"))
            .and(body_string_contains("name=\"app_file\"; filename=\"app.py\""))
            .and(body_string_contains("name=\"api_file\"; filename=\"api.py\""))
            .and(body_string_contains("async def fetch()"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{
                    "node_type_frequencies": { "app_py": { "Name": 3, "Call": 5, "Import": 5 } },
                    "function_parameters": { "api_py": [
                        { "function": "fetch", "parameters": [{ "name": "url", "type": "str" }] }
                    ] },
                    "decorated_functions": { "api_py": [{ "name": "fetch", "is_async": true }] },
                    "summary": "kept"
                }"#,
            ))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri());
        let record = client.analyze(&upload_pair(&dir)).await;

        assert!(record.is_ok(), "Analyze should succeed: {:?}", record.err());
        let record = record.unwrap();
        let keys: Vec<&str> = record.node_type_frequencies.app_py.keys().collect();
        assert_eq!(keys, vec!["Name", "Call", "Import"]);
        assert_eq!(record.decorated_functions.api_py[0].parameters[0].name, "url");
        assert_eq!(record.extra["summary"], "kept");
    }

    #[tokio::test]
    async fn test_analyze_detail_is_reported_verbatim() {
        let mock_server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();

        Mock::given(method("POST"))
            .and(path("/analyze/"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "detail": "Both files must be Python files"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri());
        let err = client.analyze(&upload_pair(&dir)).await.unwrap_err();

        assert_eq!(err.to_string(), "Both files must be Python files");
        assert_eq!(err.status(), Some(400));
    }

    #[tokio::test]
    async fn test_analyze_embedded_error_is_rejected() {
        let mock_server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();

        Mock::given(method("POST"))
            .and(path("/analyze/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": "Syntax error in app.py"
            })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri());
        let err = client.analyze(&upload_pair(&dir)).await.unwrap_err();

        assert!(matches!(err, BackendError::InvalidResponse { ref message } if message == "Syntax error in app.py"));
    }
}

#[cfg(test)]
mod question_tests {
    use super::*;

    #[tokio::test]
    async fn test_ask_sends_record_and_question() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/gpt/"))
            .and(body_string_contains("\"question\":\"What functions does api.py have?\""))
            .and(body_string_contains("\"analysis_data\":{"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "response": "3 functions",
                "file_path": "/data/2024-01-01/001.json"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri());
        let answer = client
            .ask(&small_record(), "What functions does api.py have?")
            .await
            .unwrap();

        assert_eq!(answer.response, "3 functions");
        assert_eq!(answer.file_path.as_deref(), Some("/data/2024-01-01/001.json"));
    }

    #[tokio::test]
    async fn test_ask_server_error_without_detail() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/gpt/"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri());
        let err = client.ask(&small_record(), "q").await.unwrap_err();

        assert!(matches!(err, BackendError::Api { status: 502, .. }));
        assert_eq!(err.to_string(), "API error: 502 - Bad Gateway");
    }

    #[tokio::test]
    async fn test_ask_malformed_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/gpt/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri());
        let err = client.ask(&small_record(), "q").await.unwrap_err();

        assert!(matches!(err, BackendError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn test_batch_keeps_response_order() {
        let mock_server = MockServer::start().await;
        let record = small_record();

        Mock::given(method("POST"))
            .and(path("/gpt/batch"))
            .and(body_string_contains("\"questions\":[\"q1\",\"q2\"]"))
            .and(body_string_contains("\"api_py\":[\"fetch\"]"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "question": "q1", "response": "a1", "timestamp": "2024-01-01T10:00:00", "file_path": "/data/2024-01-01/001.json" },
                { "question": "q2", "response": "a2", "timestamp": "2024-01-01T10:00:01", "file_path": "/data/2024-01-01/002.json" }
            ])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri());
        let answers = client
            .ask_batch(&record, &["q1".to_string(), "q2".to_string()])
            .await
            .unwrap();

        let questions: Vec<&str> = answers.iter().map(|a| a.question.as_str()).collect();
        assert_eq!(questions, vec!["q1", "q2"]);
        assert_eq!(answers[1].storage_id(), Some("002.json"));
    }
}

#[cfg(test)]
mod saved_response_tests {
    use super::*;

    #[tokio::test]
    async fn test_responses_for_date_uses_iso_date_path() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/gpt/responses/2024-01-05"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "date": "2024-01-05",
                "responses": [
                    { "question": "q", "response": "a", "timestamp": "2024-01-05T08:30:00Z", "file_path": "/data/2024-01-05/001.json" }
                ]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri());
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let responses = client.responses_for_date(date).await.unwrap();

        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].response, "a");
    }

    #[tokio::test]
    async fn test_responses_for_date_with_no_log() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/gpt/responses/2024-01-06"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "responses": null })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri());
        let date = NaiveDate::from_ymd_opt(2024, 1, 6).unwrap();

        assert!(client.responses_for_date(date).await.unwrap().is_empty());
    }
}

#[cfg(test)]
mod diagram_tests {
    use super::*;

    #[tokio::test]
    async fn test_diagram_returns_mermaid_code() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/mermaid/"))
            .and(body_string_contains("\"diagram_type\":\"class\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "mermaid_code": "classDiagram\n  class Client"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri());
        let code = client
            .generate_diagram(&small_record(), DiagramType::Class)
            .await
            .unwrap();

        assert_eq!(code, "classDiagram\n  class Client");
    }

    #[tokio::test]
    async fn test_diagram_error_body_is_an_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/mermaid/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": "Unsupported diagram type"
            })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri());
        let err = client
            .generate_diagram(&small_record(), DiagramType::Flowchart)
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Diagram generation failed: Unsupported diagram type"
        );
    }
}

#[cfg(test)]
mod connection_tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_backend_is_http_error() {
        // Nothing listens on port 9 locally.
        let client = create_test_client("http://127.0.0.1:9");
        let err = client.ask(&small_record(), "q").await.unwrap_err();

        assert!(matches!(err, BackendError::Http(_)));
    }
}
