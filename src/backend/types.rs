use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analysis::{nullable, AnalysisRecord};

/// One question/answer pair.
///
/// Produced locally after a single ask, returned by the backend for batch
/// asks, and listed in the backend's per-day response log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    #[serde(default, deserialize_with = "nullable")]
    pub question: String,
    #[serde(default, deserialize_with = "nullable")]
    pub response: String,
    /// ISO-8601 timestamp
    #[serde(default, deserialize_with = "nullable")]
    pub timestamp: String,
    /// Where the backend stored this answer
    #[serde(default)]
    pub file_path: Option<String>,
}

impl Interaction {
    /// Create an interaction stamped with the current instant
    pub fn new(
        question: impl Into<String>,
        response: impl Into<String>,
        file_path: Option<String>,
    ) -> Self {
        Self {
            question: question.into(),
            response: response.into(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            file_path,
        }
    }

    /// Set an explicit timestamp
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = timestamp.into();
        self
    }

    /// Storage identifier: the last path segment of `file_path`.
    pub fn storage_id(&self) -> Option<&str> {
        self.file_path
            .as_deref()
            .and_then(|path| path.rsplit('/').next())
            .filter(|id| !id.is_empty())
    }

    /// Parse the timestamp.
    ///
    /// Accepts RFC 3339 and offset-less ISO-8601; the latter is taken as UTC.
    pub fn timestamp_utc(&self) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&self.timestamp) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&self.timestamp, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }

    /// Timestamp rendered in the local time zone, or as received when it
    /// cannot be parsed.
    pub fn local_time_display(&self) -> String {
        match self.timestamp_utc() {
            Some(dt) => dt
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            None => self.timestamp.clone(),
        }
    }
}

/// Body of `POST /gpt/`
#[derive(Debug, Clone, Serialize)]
pub struct AskRequest<'a> {
    pub analysis_data: &'a AnalysisRecord,
    pub question: &'a str,
}

/// Response of `POST /gpt/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskResponse {
    pub response: String,
    #[serde(default)]
    pub file_path: Option<String>,
}

/// Body of `POST /gpt/batch`
#[derive(Debug, Clone, Serialize)]
pub struct BatchAskRequest<'a> {
    pub analysis_data: &'a AnalysisRecord,
    pub questions: &'a [String],
}

/// Response of `GET /gpt/responses/{date}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SavedResponses {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub responses: Vec<Interaction>,
}

/// Kind of Mermaid diagram the backend can generate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramType {
    #[default]
    Flowchart,
    Class,
}

impl std::fmt::Display for DiagramType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagramType::Flowchart => write!(f, "flowchart"),
            DiagramType::Class => write!(f, "class"),
        }
    }
}

impl std::str::FromStr for DiagramType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "flowchart" => Ok(DiagramType::Flowchart),
            "class" => Ok(DiagramType::Class),
            _ => Err(format!("Unknown diagram type: {}", s)),
        }
    }
}

/// Body of `POST /mermaid/`
#[derive(Debug, Clone, Serialize)]
pub struct DiagramRequest<'a> {
    pub analysis_data: &'a AnalysisRecord,
    pub diagram_type: DiagramType,
}

/// Response of `POST /mermaid/`: either code or an error message
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiagramResponse {
    #[serde(default)]
    pub mermaid_code: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Error body returned with non-2xx statuses
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub detail: Value,
}

impl ErrorBody {
    /// The detail as display text; validation errors arrive as a list.
    pub fn message(&self) -> String {
        match &self.detail {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}
