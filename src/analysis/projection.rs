//! Display-ready views extracted from an [`AnalysisRecord`].
//!
//! Each projection reads one part of the record for one file. The record is
//! already normalized, so an absent section simply projects to an empty
//! collection, which the view layer reads as "leave this section out".

use serde::Serialize;

use super::{
    AnalysisRecord, ApiCall, ClassHierarchyEntry, CrossReferenceAnalysis, DecoratedFunction,
    KeyedList, Label, Relationship,
};

/// One row of the node-type table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeTypeCount {
    pub node_type: String,
    pub count: u64,
}

/// A function and the functions it calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionDependency {
    pub function: String,
    pub dependencies: Vec<String>,
    /// Number of dependencies, shown as a badge.
    pub count: usize,
}

/// A class with its parents and methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassSummary {
    pub name: String,
    pub parent_classes: Vec<String>,
    pub methods: Vec<String>,
}

/// Node-type frequencies, highest count first.
///
/// The sort is stable: node types with equal counts keep the order they had
/// in the record, so `{a: 3, b: 5, c: 5}` projects as `b, c, a`.
pub fn node_types(record: &AnalysisRecord, label: Label) -> Vec<NodeTypeCount> {
    let mut rows: Vec<NodeTypeCount> = record
        .node_type_frequencies
        .get(label)
        .iter()
        .map(|(node_type, count)| NodeTypeCount {
            node_type: node_type.to_string(),
            count: *count,
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows
}

/// Class relationships shown under `label`'s analysis.
///
/// Reads the *other* file's relationships: the application view lists
/// `api_analysis.relationships` and the API view lists
/// `app_analysis.relationships`. This mirrors how the analyzer's results
/// have always been presented and is kept as-is until the intended source
/// is confirmed.
pub fn relationships(record: &AnalysisRecord, label: Label) -> &[Relationship] {
    match label.opposite() {
        Label::App => &record.app_analysis.relationships,
        Label::Api => &record.api_analysis.relationships,
    }
}

/// Call dependencies of each function in `label`'s file.
pub fn function_dependencies(record: &AnalysisRecord, label: Label) -> Vec<FunctionDependency> {
    record
        .function_call_chains
        .get(label)
        .iter()
        .map(|(function, deps)| FunctionDependency {
            function: function.to_string(),
            dependencies: deps.clone(),
            count: deps.len(),
        })
        .collect()
}

/// Outbound API calls. Only the application file makes them.
pub fn api_calls(record: &AnalysisRecord) -> &[ApiCall] {
    &record.cross_reference_analysis.api_integration.api_calls
}

pub fn decorated_functions(record: &AnalysisRecord, label: Label) -> &[DecoratedFunction] {
    record.decorated_functions.get(label)
}

pub fn class_hierarchy(record: &AnalysisRecord, label: Label) -> Vec<ClassSummary> {
    let hierarchy: &KeyedList<ClassHierarchyEntry> = record.class_hierarchy.get(label);
    hierarchy
        .iter()
        .map(|(name, entry)| ClassSummary {
            name: name.to_string(),
            parent_classes: entry.parent_classes.clone(),
            methods: entry.methods.clone(),
        })
        .collect()
}

/// Functions with error handling.
pub fn error_handling(record: &AnalysisRecord, label: Label) -> &[String] {
    record.error_handling.get(label)
}

pub fn async_functions(record: &AnalysisRecord, label: Label) -> &[String] {
    record.async_functions.get(label)
}

pub fn cross_references(record: &AnalysisRecord) -> &CrossReferenceAnalysis {
    &record.cross_reference_analysis
}
