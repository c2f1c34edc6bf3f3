//! Section layout for presenting an analysis record.
//!
//! [`compose`] decides which sections appear and in what order. The order is
//! fixed; a section is left out only when its projection is empty. Nothing
//! here depends on how sections are eventually drawn.

mod render;

pub use render::render_text;

use serde::Serialize;

use crate::analysis::projection::{self, ClassSummary, FunctionDependency, NodeTypeCount};
use crate::analysis::{
    derive_metrics, AnalysisRecord, ApiCall, CrossReferenceAnalysis, DecoratedFunction, Label,
    Metrics, Relationship,
};

/// A top-level block of the analysis view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "section", rename_all = "snake_case")]
pub enum Section {
    CrossReferences(CrossReferenceAnalysis),
    File(FileView),
    ErrorHandling { app: Vec<String>, api: Vec<String> },
    AsyncFunctions { app: Vec<String>, api: Vec<String> },
}

/// The analysis block for one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileView {
    pub label: Label,
    pub metrics: Metrics,
    pub parts: Vec<FilePart>,
}

/// A sub-section inside a file's analysis block.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "part", content = "items", rename_all = "snake_case")]
pub enum FilePart {
    NodeTypes(Vec<NodeTypeCount>),
    Relationships(Vec<Relationship>),
    Dependencies(Vec<FunctionDependency>),
    ApiCalls(Vec<ApiCall>),
    DecoratedFunctions(Vec<DecoratedFunction>),
    ClassHierarchy(Vec<ClassSummary>),
}

impl FilePart {
    /// Heading shown above this part.
    pub fn title(&self) -> &'static str {
        match self {
            FilePart::NodeTypes(_) => "Node Types Analysis",
            FilePart::Relationships(_) => "Class Relationships",
            FilePart::Dependencies(_) => "Function Dependencies",
            FilePart::ApiCalls(_) => "API Calls",
            FilePart::DecoratedFunctions(_) => "Decorated Functions",
            FilePart::ClassHierarchy(_) => "Class Hierarchy",
        }
    }
}

/// Lay out every non-empty section of `record`.
///
/// Order: cross references, the application block, the API block, error
/// handling, async functions. File blocks always appear because their
/// metrics are meaningful even when zero.
pub fn compose(record: &AnalysisRecord) -> Vec<Section> {
    let mut sections = Vec::new();

    let cross_refs = projection::cross_references(record);
    if !cross_refs.is_empty() {
        sections.push(Section::CrossReferences(cross_refs.clone()));
    }

    for label in Label::ALL {
        sections.push(Section::File(compose_file(record, label)));
    }

    let app_errors = projection::error_handling(record, Label::App);
    let api_errors = projection::error_handling(record, Label::Api);
    if !app_errors.is_empty() || !api_errors.is_empty() {
        sections.push(Section::ErrorHandling {
            app: app_errors.to_vec(),
            api: api_errors.to_vec(),
        });
    }

    let app_async = projection::async_functions(record, Label::App);
    let api_async = projection::async_functions(record, Label::Api);
    if !app_async.is_empty() || !api_async.is_empty() {
        sections.push(Section::AsyncFunctions {
            app: app_async.to_vec(),
            api: api_async.to_vec(),
        });
    }

    sections
}

fn compose_file(record: &AnalysisRecord, label: Label) -> FileView {
    let mut parts = Vec::new();

    push_nonempty(&mut parts, projection::node_types(record, label), FilePart::NodeTypes);
    push_nonempty(
        &mut parts,
        projection::relationships(record, label).to_vec(),
        FilePart::Relationships,
    );
    push_nonempty(
        &mut parts,
        projection::function_dependencies(record, label),
        FilePart::Dependencies,
    );
    if label == Label::App {
        push_nonempty(&mut parts, projection::api_calls(record).to_vec(), FilePart::ApiCalls);
    }
    push_nonempty(
        &mut parts,
        projection::decorated_functions(record, label).to_vec(),
        FilePart::DecoratedFunctions,
    );
    push_nonempty(
        &mut parts,
        projection::class_hierarchy(record, label),
        FilePart::ClassHierarchy,
    );

    FileView {
        label,
        metrics: derive_metrics(record, label),
        parts,
    }
}

fn push_nonempty<T>(parts: &mut Vec<FilePart>, items: Vec<T>, wrap: fn(Vec<T>) -> FilePart) {
    if !items.is_empty() {
        parts.push(wrap(items));
    }
}
