//! # Code Analysis Assistant
//!
//! Client for an analyzer service that statically analyzes a pair of Python
//! files (an application file and an API file). It presents the analysis,
//! answers natural-language questions about it and requests Mermaid
//! diagrams.
//!
//! ## Features
//!
//! - **Analysis model**: typed, order-preserving decoding of the analyzer's record
//! - **Metrics and projections**: per-file summaries derived from the record
//! - **Question session**: single and batched asks with an answer history
//! - **Saved responses**: the backend's per-day answer log
//! - **View composition**: section layout rendered as text or JSON
//! - **Diagrams**: flowchart and class diagrams as Mermaid source
//!
//! ## Architecture
//!
//! ```text
//! CLI → Controller → QuestionSession ─┐
//!          │                          ├→ AnalyzerBackend (HTTP)
//!          └→ view::compose           │
//!                                     └ analysis record (shared, read-only)
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use code_analysis_assistant::{BackendClient, Config, Controller, UploadPair};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let client = BackendClient::new(&config.backend, config.request.clone())?;
//!     let mut controller = Controller::new(Arc::new(client));
//!     controller.load_analysis(&UploadPair::new("app.py", "api.py")?).await?;
//!     if let Some(session) = controller.session_mut() {
//!         session.ask("What functions does api.py have?").await?;
//!     }
//!     Ok(())
//! }
//! ```

/// Analysis record model, metrics and projections.
pub mod analysis;
/// Analyzer backend contract and HTTP client.
pub mod backend;
/// Command-line commands.
pub mod cli;
/// Configuration management.
pub mod config;
/// Owner of the current analysis, session and diagram state.
pub mod controller;
/// Error types and result aliases for the application.
pub mod error;
/// Predefined questions.
pub mod prompts;
/// Question/answer session state machine.
pub mod session;
/// Upload pair validation.
pub mod upload;
/// Section layout and text rendering.
pub mod view;

pub use analysis::AnalysisRecord;
pub use backend::{AnalyzerBackend, BackendClient};
pub use config::Config;
pub use controller::Controller;
pub use error::{AppError, AppResult};
pub use session::QuestionSession;
pub use upload::UploadPair;
