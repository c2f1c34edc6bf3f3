//! Top-level owner of the current analysis.
//!
//! The [`Controller`] holds the analysis record shared read-only with the
//! question session and the view. A new analysis replaces the record and
//! the session wholesale; nothing edits a record in place.

use std::sync::Arc;

use tracing::{info, warn};

use crate::analysis::AnalysisRecord;
use crate::backend::{AnalyzerBackend, DiagramType};
use crate::error::{AppResult, ValidationError};
use crate::session::QuestionSession;
use crate::upload::UploadPair;
use crate::view::{compose, Section};

/// Diagram generation state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagramPanel {
    /// Kind used for the next generation.
    pub kind: DiagramType,
    /// Mermaid source of the last successful generation.
    pub code: Option<String>,
    pub generating: bool,
    pub error: Option<String>,
}

/// Owns the backend handle, the current analysis and its question session.
pub struct Controller {
    backend: Arc<dyn AnalyzerBackend>,
    analysis: Option<Arc<AnalysisRecord>>,
    session: Option<QuestionSession>,
    diagram: DiagramPanel,
}

impl Controller {
    /// Create a controller with no analysis loaded.
    pub fn new(backend: Arc<dyn AnalyzerBackend>) -> Self {
        Self {
            backend,
            analysis: None,
            session: None,
            diagram: DiagramPanel::default(),
        }
    }

    /// Upload `upload` for analysis and install the result.
    ///
    /// On failure the previous analysis and session stay untouched.
    pub async fn load_analysis(&mut self, upload: &UploadPair) -> AppResult<Arc<AnalysisRecord>> {
        let record = match self.backend.analyze(upload).await {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "Analysis failed");
                return Err(e.into());
            }
        };
        info!(
            app = %upload.app_file_name(),
            api = %upload.api_file_name(),
            "Analysis loaded"
        );
        Ok(self.adopt_record(record).await)
    }

    /// Install an already decoded record and start a fresh session for it.
    pub async fn adopt_record(&mut self, record: AnalysisRecord) -> Arc<AnalysisRecord> {
        let record = Arc::new(record);
        let mut session = QuestionSession::new(Arc::clone(&self.backend), Arc::clone(&record));
        session.mount().await;

        self.analysis = Some(Arc::clone(&record));
        self.session = Some(session);
        self.diagram.code = None;
        self.diagram.error = None;
        record
    }

    pub fn analysis(&self) -> Option<&Arc<AnalysisRecord>> {
        self.analysis.as_ref()
    }

    pub fn session(&self) -> Option<&QuestionSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut QuestionSession> {
        self.session.as_mut()
    }

    /// Composed view of the current analysis; empty when none is loaded.
    pub fn view(&self) -> Vec<Section> {
        self.analysis
            .as_deref()
            .map(compose)
            .unwrap_or_default()
    }

    pub fn diagram(&self) -> &DiagramPanel {
        &self.diagram
    }

    pub fn dismiss_diagram_error(&mut self) {
        self.diagram.error = None;
    }

    /// Generate a diagram of `kind` for the current analysis.
    ///
    /// A failure is kept as the panel error and the previous diagram stays.
    pub async fn generate_diagram(&mut self, kind: DiagramType) -> AppResult<&str> {
        let analysis = self
            .analysis
            .clone()
            .ok_or(ValidationError::MissingAnalysis)?;

        self.diagram.kind = kind;
        self.diagram.error = None;
        self.diagram.generating = true;
        let result = self.backend.generate_diagram(&analysis, kind).await;
        self.diagram.generating = false;

        match result {
            Ok(code) => {
                info!(%kind, "Diagram generated");
                Ok(self.diagram.code.insert(code).as_str())
            }
            Err(e) => {
                warn!(%kind, error = %e, "Diagram generation failed");
                self.diagram.error = Some(e.to_string());
                Err(e.into())
            }
        }
    }
}
