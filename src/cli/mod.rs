//! Command-line surface.
//!
//! Every command that needs an analysis takes it either from a saved JSON
//! record (`--analysis`) or by uploading a fresh pair (`--app` and `--api`).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};

use crate::analysis::AnalysisRecord;
use crate::backend::{AnalyzerBackend, DiagramType, Interaction};
use crate::controller::Controller;
use crate::error::{AppError, AppResult, ValidationError};
use crate::prompts::{quick_question, QUICK_QUESTIONS};
use crate::upload::UploadPair;
use crate::view::render_text;

/// Explore static analysis of an app.py/api.py pair and ask questions about it.
#[derive(Parser, Debug)]
#[command(name = "code-analysis-assistant", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Where the analysis record comes from.
#[derive(Args, Debug, Clone, Default)]
pub struct AnalysisSource {
    /// Previously saved analysis record (JSON)
    #[arg(long, value_name = "FILE", conflicts_with_all = ["app", "api"])]
    pub analysis: Option<PathBuf>,

    /// Application source file to upload
    #[arg(long, value_name = "APP_PY")]
    pub app: Option<PathBuf>,

    /// API source file to upload
    #[arg(long, value_name = "API_PY")]
    pub api: Option<PathBuf>,
}

/// CLI subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Show the analysis report
    Analyze {
        #[command(flatten)]
        source: AnalysisSource,

        /// Print the composed sections as JSON
        #[arg(long)]
        json: bool,
    },

    /// Ask one question about the analysis
    Ask {
        #[command(flatten)]
        source: AnalysisSource,

        /// Question text
        #[arg(required_unless_present = "quick")]
        question: Option<String>,

        /// Ask a predefined question by number (see `questions`)
        #[arg(long, conflicts_with = "question")]
        quick: Option<usize>,
    },

    /// Ask several questions in one request
    Batch {
        #[command(flatten)]
        source: AnalysisSource,

        /// Questions, answered in the order given
        #[arg(required = true)]
        questions: Vec<String>,
    },

    /// List the backend's saved answers for a day
    Saved {
        /// Day to list (YYYY-MM-DD); defaults to today (UTC)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Generate Mermaid diagram source
    Diagram {
        #[command(flatten)]
        source: AnalysisSource,

        /// Diagram kind: flowchart or class
        #[arg(long, default_value = "flowchart")]
        kind: DiagramType,
    },

    /// List the predefined quick questions
    Questions,
}

/// Result of CLI command execution.
pub struct CliResult {
    /// Exit code (0 = success)
    pub exit_code: i32,
    /// Output message
    pub message: String,
}

impl CliResult {
    /// Create a success result with the given message.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            message: message.into(),
        }
    }

    /// Create an error result with the given message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            exit_code: 1,
            message: message.into(),
        }
    }
}

impl From<AppResult<String>> for CliResult {
    fn from(result: AppResult<String>) -> Self {
        match result {
            Ok(message) => CliResult::success(message),
            Err(e) => CliResult::error(format!("Error: {}", e)),
        }
    }
}

/// Execute a CLI command against `backend`.
pub async fn execute_command(command: Commands, backend: Arc<dyn AnalyzerBackend>) -> CliResult {
    let result = match command {
        Commands::Analyze { source, json } => execute_analyze(backend, &source, json).await,
        Commands::Ask {
            source,
            question,
            quick,
        } => execute_ask(backend, &source, question, quick).await,
        Commands::Batch { source, questions } => {
            execute_batch(backend, &source, questions).await
        }
        Commands::Saved { date } => execute_saved(backend.as_ref(), date).await,
        Commands::Diagram { source, kind } => execute_diagram(backend, &source, kind).await,
        Commands::Questions => Ok(format_quick_questions()),
    };
    result.into()
}

/// Build a controller with the record from `source` installed.
async fn load(
    backend: Arc<dyn AnalyzerBackend>,
    source: &AnalysisSource,
) -> AppResult<Controller> {
    let mut controller = Controller::new(backend);
    match &source.analysis {
        Some(path) => {
            let record = read_record(path).await?;
            controller.adopt_record(record).await;
        }
        None => {
            let upload = UploadPair::from_options(source.app.clone(), source.api.clone())?;
            controller.load_analysis(&upload).await?;
        }
    }
    Ok(controller)
}

async fn read_record(path: &Path) -> AppResult<AnalysisRecord> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AppError::InvalidRecord {
            message: format!("{}: {}", path.display(), e),
        })?;
    AnalysisRecord::from_json_str(&text).map_err(|e| AppError::InvalidRecord {
        message: format!("{}: {}", path.display(), e),
    })
}

async fn execute_analyze(
    backend: Arc<dyn AnalyzerBackend>,
    source: &AnalysisSource,
    json: bool,
) -> AppResult<String> {
    let controller = load(backend, source).await?;
    let sections = controller.view();
    if json {
        serde_json::to_string_pretty(&sections).map_err(|e| AppError::Internal {
            message: e.to_string(),
        })
    } else {
        Ok(render_text(&sections))
    }
}

async fn execute_ask(
    backend: Arc<dyn AnalyzerBackend>,
    source: &AnalysisSource,
    question: Option<String>,
    quick: Option<usize>,
) -> AppResult<String> {
    let question = match quick {
        Some(number) => quick_question(number)
            .ok_or(ValidationError::UnknownQuickQuestion {
                number,
                count: QUICK_QUESTIONS.len(),
            })?
            .to_string(),
        None => question.unwrap_or_default(),
    };
    if question.trim().is_empty() {
        return Err(ValidationError::EmptyQuestion.into());
    }

    let mut controller = load(backend, source).await?;
    let session = controller.session_mut().ok_or_else(|| AppError::Internal {
        message: "No question session after loading analysis".to_string(),
    })?;
    let interaction = session
        .ask(question)
        .await?
        .ok_or(ValidationError::EmptyQuestion)?;

    let mut output = format_interaction(&interaction);
    output.push_str(&format!(
        "\nSaved responses today: {}\n",
        session.saved_len()
    ));
    Ok(output)
}

async fn execute_batch(
    backend: Arc<dyn AnalyzerBackend>,
    source: &AnalysisSource,
    questions: Vec<String>,
) -> AppResult<String> {
    if questions.iter().all(|q| q.trim().is_empty()) {
        return Err(ValidationError::EmptyQuestion.into());
    }

    let mut controller = load(backend, source).await?;
    let session = controller.session_mut().ok_or_else(|| AppError::Internal {
        message: "No question session after loading analysis".to_string(),
    })?;
    for question in &questions {
        session.enqueue(question);
    }

    let answers = session.submit_batch().await?;
    let mut output = String::new();
    for (i, interaction) in answers.iter().enumerate() {
        output.push_str(&format!("[{}] ", i + 1));
        output.push_str(&format_interaction(interaction));
        output.push('\n');
    }
    output.push_str(&format!("Saved responses today: {}\n", session.saved_len()));
    Ok(output)
}

async fn execute_saved(backend: &dyn AnalyzerBackend, date: Option<NaiveDate>) -> AppResult<String> {
    let date = date.unwrap_or_else(|| Utc::now().date_naive());
    let responses = backend.responses_for_date(date).await?;
    if responses.is_empty() {
        return Ok(format!("No saved responses for {}\n", date));
    }

    let mut output = format!("Saved responses for {} ({})\n\n", date, responses.len());
    for interaction in &responses {
        output.push_str(&format_interaction(interaction));
        output.push('\n');
    }
    Ok(output)
}

async fn execute_diagram(
    backend: Arc<dyn AnalyzerBackend>,
    source: &AnalysisSource,
    kind: DiagramType,
) -> AppResult<String> {
    let mut controller = load(backend, source).await?;
    let code = controller.generate_diagram(kind).await?;
    Ok(format!("{}\n", code))
}

fn format_interaction(interaction: &Interaction) -> String {
    let mut output = format!(
        "Q: {}\nA: {}\n",
        interaction.question, interaction.response
    );
    let mut meta = vec![interaction.local_time_display()];
    if let Some(id) = interaction.storage_id() {
        meta.push(format!("stored as {}", id));
    }
    output.push_str(&format!("   ({})\n", meta.join(", ")));
    output
}

fn format_quick_questions() -> String {
    QUICK_QUESTIONS
        .iter()
        .enumerate()
        .map(|(i, question)| format!("{}. {}\n", i + 1, question))
        .collect()
}
