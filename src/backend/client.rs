use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use super::types::{
    AskRequest, AskResponse, BatchAskRequest, DiagramRequest, DiagramResponse, DiagramType,
    ErrorBody, Interaction, SavedResponses,
};
use super::AnalyzerBackend;
use crate::analysis::AnalysisRecord;
use crate::config::{BackendConfig, RequestConfig};
use crate::error::{BackendError, BackendResult};
use crate::upload::UploadPair;

/// HTTP client for the analyzer backend
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
    request_config: RequestConfig,
}

impl BackendClient {
    /// Create a new backend client
    pub fn new(config: &BackendConfig, request_config: RequestConfig) -> BackendResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout_ms) = request_config.timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }
        let client = builder.build().map_err(BackendError::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            request_config,
        })
    }

    /// Get the base URL (for testing)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and decode a successful JSON body (internal)
    async fn execute<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        request: RequestBuilder,
    ) -> BackendResult<T> {
        debug!(endpoint, "Calling analyzer backend");
        let start = Instant::now();

        let result = self.send(request).await;
        let latency = start.elapsed();

        match result {
            Ok(response) => {
                let body = response
                    .json::<T>()
                    .await
                    .map_err(|e| BackendError::InvalidResponse {
                        message: format!("Failed to parse {} response: {}", endpoint, e),
                    });
                match &body {
                    Ok(_) => info!(
                        endpoint,
                        latency_ms = latency.as_millis(),
                        "Backend call succeeded"
                    ),
                    Err(e) => error!(endpoint, error = %e, "Backend returned unreadable body"),
                }
                body
            }
            Err(e) => {
                error!(
                    endpoint,
                    error = %e,
                    status = ?e.status(),
                    latency_ms = latency.as_millis(),
                    "Backend call failed"
                );
                Err(e)
            }
        }
    }

    /// Dispatch and map transport/status failures (internal)
    async fn send(&self, request: RequestBuilder) -> BackendResult<Response> {
        let response = request.send().await.map_err(|e| {
            match (e.is_timeout(), self.request_config.timeout_ms) {
                (true, Some(timeout_ms)) => BackendError::Timeout { timeout_ms },
                _ => BackendError::Http(e),
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ErrorBody>(&error_body) {
            Ok(body) => Err(BackendError::Detail {
                status: status.as_u16(),
                detail: body.message(),
            }),
            Err(_) => Err(BackendError::Api {
                status: status.as_u16(),
                message: error_body,
            }),
        }
    }

    /// Build the multipart body for an upload (internal)
    async fn upload_form(upload: &UploadPair) -> BackendResult<Form> {
        let app_bytes = tokio::fs::read(upload.app_path()).await?;
        let api_bytes = tokio::fs::read(upload.api_path()).await?;

        Ok(Form::new()
            .part(
                "app_file",
                Part::bytes(app_bytes).file_name(upload.app_file_name()),
            )
            .part(
                "api_file",
                Part::bytes(api_bytes).file_name(upload.api_file_name()),
            ))
    }
}

#[async_trait]
impl AnalyzerBackend for BackendClient {
    async fn analyze(&self, upload: &UploadPair) -> BackendResult<AnalysisRecord> {
        let form = Self::upload_form(upload).await?;
        let request = self.client.post(self.url("/analyze/")).multipart(form);

        let record: AnalysisRecord = self.execute("analyze", request).await?;
        if let Some(message) = record.backend_error() {
            return Err(BackendError::InvalidResponse {
                message: message.to_string(),
            });
        }
        Ok(record.normalize())
    }

    async fn ask(&self, analysis: &AnalysisRecord, question: &str) -> BackendResult<AskResponse> {
        let body = AskRequest {
            analysis_data: analysis,
            question,
        };
        let request = self.client.post(self.url("/gpt/")).json(&body);
        self.execute("ask", request).await
    }

    async fn ask_batch(
        &self,
        analysis: &AnalysisRecord,
        questions: &[String],
    ) -> BackendResult<Vec<Interaction>> {
        debug!(question_count = questions.len(), "Submitting question batch");
        let body = BatchAskRequest {
            analysis_data: analysis,
            questions,
        };
        let request = self.client.post(self.url("/gpt/batch")).json(&body);
        self.execute("ask_batch", request).await
    }

    async fn responses_for_date(&self, date: NaiveDate) -> BackendResult<Vec<Interaction>> {
        let path = format!("/gpt/responses/{}", date.format("%Y-%m-%d"));
        let request = self.client.get(self.url(&path));
        let saved: SavedResponses = self.execute("responses_for_date", request).await?;
        Ok(saved.responses)
    }

    async fn generate_diagram(
        &self,
        analysis: &AnalysisRecord,
        diagram_type: DiagramType,
    ) -> BackendResult<String> {
        let body = DiagramRequest {
            analysis_data: analysis,
            diagram_type,
        };
        let request = self.client.post(self.url("/mermaid/")).json(&body);
        let response: DiagramResponse = self.execute("generate_diagram", request).await?;

        match response {
            DiagramResponse {
                error: Some(message),
                ..
            } => Err(BackendError::Diagram { message }),
            DiagramResponse {
                mermaid_code: Some(code),
                ..
            } => Ok(code),
            _ => Err(BackendError::InvalidResponse {
                message: "Diagram response carried neither code nor error".to_string(),
            }),
        }
    }
}
