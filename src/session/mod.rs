//! Question/answer session over one analysis record.
//!
//! A [`QuestionSession`] owns the in-memory history of answers, the queue of
//! questions waiting to be sent as a batch, and a copy of the backend's log
//! of today's answers. The session log and the backend log are independent:
//! the backend log is only ever re-fetched, never merged.
//!
//! ```text
//! Idle --ask--> Asking --done/failed--> Idle
//! Idle --submit_batch--> Batching --done/failed--> Idle
//! ```
//!
//! Every mutating operation takes `&mut self`, so at most one ask or batch
//! is in flight per session. While one is pending the owner is borrowed;
//! observers follow the state through [`QuestionSession::subscribe_state`].


use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::analysis::AnalysisRecord;
use crate::backend::{AnalyzerBackend, Interaction};
use crate::error::AppResult;

/// Where the session is in its ask/batch cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Idle,
    Asking,
    Batching,
}

/// Interactive question session bound to one analysis record.
pub struct QuestionSession {
    backend: Arc<dyn AnalyzerBackend>,
    analysis: Arc<AnalysisRecord>,
    state: watch::Sender<SessionState>,
    draft: String,
    history: Vec<Interaction>,
    batch_queue: Vec<String>,
    saved_responses: Vec<Interaction>,
    loading_saved: bool,
    latest_response: Option<String>,
    error: Option<String>,
}

impl QuestionSession {
    /// Create a session for `analysis`. Nothing is fetched until [`mount`].
    ///
    /// [`mount`]: QuestionSession::mount
    pub fn new(backend: Arc<dyn AnalyzerBackend>, analysis: Arc<AnalysisRecord>) -> Self {
        Self {
            backend,
            analysis,
            state: watch::channel(SessionState::Idle).0,
            draft: String::new(),
            history: Vec::new(),
            batch_queue: Vec::new(),
            saved_responses: Vec::new(),
            loading_saved: false,
            latest_response: None,
            error: None,
        }
    }

    /// Initial load of today's saved answers.
    pub async fn mount(&mut self) {
        self.refresh_saved().await;
    }

    // Accessors

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Follow state changes, including while an ask or batch is pending.
    pub fn subscribe_state(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn analysis(&self) -> &AnalysisRecord {
        &self.analysis
    }

    /// Current input text.
    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Answers from this session, newest first.
    pub fn history(&self) -> &[Interaction] {
        &self.history
    }

    pub fn batch_queue(&self) -> &[String] {
        &self.batch_queue
    }

    /// Today's answers as last fetched from the backend log.
    pub fn saved_responses(&self) -> &[Interaction] {
        &self.saved_responses
    }

    pub fn is_loading_saved(&self) -> bool {
        self.loading_saved
    }

    /// Response text of the most recent successful single ask.
    pub fn latest_response(&self) -> Option<&str> {
        self.latest_response.as_deref()
    }

    /// Error from the last failed ask or batch, until dismissed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn saved_len(&self) -> usize {
        self.saved_responses.len()
    }

    // Single ask

    /// Ask `question`.
    ///
    /// The question becomes the draft first, so a failed ask leaves it in
    /// place for a retry. Returns `Ok(None)` without contacting the backend
    /// when the question is blank.
    pub async fn ask(&mut self, question: impl Into<String>) -> AppResult<Option<Interaction>> {
        self.draft = question.into();
        self.submit_draft().await
    }

    /// Ask the current draft.
    pub async fn submit_draft(&mut self) -> AppResult<Option<Interaction>> {
        if self.draft.trim().is_empty() {
            debug!("Ignoring blank question");
            return Ok(None);
        }

        let question = self.draft.clone();
        self.error = None;
        self.state.send_replace(SessionState::Asking);

        let result = self.backend.ask(&self.analysis, &question).await;
        self.state.send_replace(SessionState::Idle);

        match result {
            Ok(answer) => {
                let interaction =
                    Interaction::new(question, answer.response.clone(), answer.file_path);
                info!(
                    history = self.history.len() + 1,
                    stored = interaction.file_path.is_some(),
                    "Question answered"
                );
                self.latest_response = Some(answer.response);
                self.history.insert(0, interaction.clone());
                self.draft.clear();
                self.refresh_saved().await;
                Ok(Some(interaction))
            }
            Err(e) => {
                warn!(error = %e, "Question failed");
                self.error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    // Batch queue

    /// Queue a question for the next batch. Blank input is ignored.
    pub fn enqueue(&mut self, question: impl AsRef<str>) -> bool {
        let question = question.as_ref().trim();
        if question.is_empty() {
            return false;
        }
        self.batch_queue.push(question.to_string());
        true
    }

    /// Queue the current draft and clear it.
    pub fn enqueue_draft(&mut self) -> bool {
        let draft = std::mem::take(&mut self.draft);
        let queued = self.enqueue(&draft);
        if !queued {
            self.draft = draft;
        }
        queued
    }

    /// Remove the queued question at `index`.
    pub fn dequeue(&mut self, index: usize) -> Option<String> {
        (index < self.batch_queue.len()).then(|| self.batch_queue.remove(index))
    }

    /// Send every queued question in one request.
    ///
    /// Answers are placed at the top of the history as one block, in the
    /// order the questions were queued. The queue is cleared only on
    /// success. Returns the new answers; empty when the queue was empty.
    pub async fn submit_batch(&mut self) -> AppResult<Vec<Interaction>> {
        if self.batch_queue.is_empty() {
            debug!("Ignoring empty batch");
            return Ok(Vec::new());
        }

        self.error = None;
        self.state.send_replace(SessionState::Batching);

        let result = self.backend.ask_batch(&self.analysis, &self.batch_queue).await;
        self.state.send_replace(SessionState::Idle);

        match result {
            Ok(answers) => {
                if answers.len() != self.batch_queue.len() {
                    warn!(
                        question_count = self.batch_queue.len(),
                        answer_count = answers.len(),
                        "Batch answer count differs from question count"
                    );
                }
                info!(question_count = answers.len(), "Batch answered");
                self.history.splice(0..0, answers.iter().cloned());
                self.batch_queue.clear();
                self.refresh_saved().await;
                Ok(answers)
            }
            Err(e) => {
                warn!(error = %e, question_count = self.batch_queue.len(), "Batch failed");
                self.error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    // Saved responses

    /// Re-fetch today's (UTC) answer log.
    pub async fn refresh_saved(&mut self) {
        self.refresh_saved_for(Utc::now().date_naive()).await;
    }

    /// Re-fetch the answer log for `date`, replacing the saved list.
    ///
    /// Failures are logged and otherwise ignored; the previous list stays.
    pub async fn refresh_saved_for(&mut self, date: NaiveDate) {
        self.loading_saved = true;
        match self.backend.responses_for_date(date).await {
            Ok(responses) => {
                debug!(%date, count = responses.len(), "Saved responses refreshed");
                self.saved_responses = responses;
            }
            Err(e) => {
                warn!(%date, error = %e, "Failed to refresh saved responses");
            }
        }
        self.loading_saved = false;
    }
}
