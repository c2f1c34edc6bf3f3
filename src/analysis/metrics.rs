use serde::Serialize;

use super::{AnalysisRecord, Label};

/// Node type whose frequency counts call sites.
const CALL_NODE_TYPE: &str = "call";

/// Summary counts shown at the top of each file's analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Metrics {
    /// Distinct functions with recorded call chains.
    pub function_count: usize,
    /// Distinct classes in the hierarchy.
    pub class_count: usize,
    /// Call-site nodes seen by the parser.
    pub call_count: u64,
}

/// Derive summary counts for one file. Missing data counts as zero.
pub fn derive_metrics(record: &AnalysisRecord, label: Label) -> Metrics {
    Metrics {
        function_count: record.function_call_chains.get(label).len(),
        class_count: record.class_hierarchy.get(label).len(),
        call_count: record
            .node_type_frequencies
            .get(label)
            .get(CALL_NODE_TYPE)
            .copied()
            .unwrap_or(0),
    }
}
