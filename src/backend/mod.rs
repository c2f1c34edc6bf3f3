//! Analyzer backend contract and HTTP client.
//!
//! The backend analyzes an uploaded file pair, answers questions about a
//! record, keeps a per-day log of answers, and generates Mermaid diagrams.
//! [`AnalyzerBackend`] is the seam the rest of the crate talks to;
//! [`BackendClient`] implements it over HTTP.

mod client;
mod types;


pub use client::BackendClient;
pub use types::*;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::analysis::AnalysisRecord;
use crate::error::BackendResult;
use crate::upload::UploadPair;

/// Operations offered by the analyzer backend.
///
/// Every call is a single request: nothing is retried.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalyzerBackend: Send + Sync {
    /// Analyze an application/API file pair (`POST /analyze/`).
    async fn analyze(&self, upload: &UploadPair) -> BackendResult<AnalysisRecord>;

    /// Ask one question about a record (`POST /gpt/`).
    async fn ask(&self, analysis: &AnalysisRecord, question: &str) -> BackendResult<AskResponse>;

    /// Ask several questions at once (`POST /gpt/batch`).
    ///
    /// Answers come back in the order the questions were sent.
    async fn ask_batch(
        &self,
        analysis: &AnalysisRecord,
        questions: &[String],
    ) -> BackendResult<Vec<Interaction>>;

    /// Fetch the answer log for one calendar day (`GET /gpt/responses/{date}`).
    async fn responses_for_date(&self, date: NaiveDate) -> BackendResult<Vec<Interaction>>;

    /// Generate Mermaid source for a record (`POST /mermaid/`).
    async fn generate_diagram(
        &self,
        analysis: &AnalysisRecord,
        diagram_type: DiagramType,
    ) -> BackendResult<String>;
}
