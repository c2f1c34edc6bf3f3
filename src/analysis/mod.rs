//! Analysis record model.
//!
//! The analyzer backend answers an upload of two Python files with one
//! nested JSON document. This module gives that document a typed shape in
//! which every collection defaults to empty: a field the backend left out, or
//! sent as `null`, means "nothing detected" and never fails decoding.
//!
//! A record is immutable once received. A new analysis replaces it wholesale.

mod keyed;
pub mod metrics;
pub mod projection;


pub use keyed::KeyedList;
pub use metrics::{derive_metrics, Metrics};

pub(crate) use keyed::nullable;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Which of the two analyzed files a sub-structure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    /// The application file (`app.py`).
    #[serde(rename = "app_py")]
    App,
    /// The API file (`api.py`).
    #[serde(rename = "api_py")]
    Api,
}

impl Label {
    /// Both labels in display order.
    pub const ALL: [Label; 2] = [Label::App, Label::Api];

    /// Key used on the wire.
    pub fn key(self) -> &'static str {
        match self {
            Label::App => "app_py",
            Label::Api => "api_py",
        }
    }

    /// The other file's label.
    pub fn opposite(self) -> Label {
        match self {
            Label::App => Label::Api,
            Label::Api => Label::App,
        }
    }

    /// Heading used when presenting this file's analysis.
    pub fn title(self) -> &'static str {
        match self {
            Label::App => "Application",
            Label::Api => "API",
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Label::App => write!(f, "app"),
            Label::Api => write!(f, "api"),
        }
    }
}

impl std::str::FromStr for Label {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "app" | "app_py" | "app.py" | "application" => Ok(Label::App),
            "api" | "api_py" | "api.py" => Ok(Label::Api),
            _ => Err(format!("Unknown source label: {}", s)),
        }
    }
}

/// A value kept separately for each analyzed file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de> + Default"))]
pub struct PerLabel<T> {
    #[serde(default, deserialize_with = "nullable")]
    pub app_py: T,
    #[serde(default, deserialize_with = "nullable")]
    pub api_py: T,
}

impl<T> PerLabel<T> {
    pub fn get(&self, label: Label) -> &T {
        match label {
            Label::App => &self.app_py,
            Label::Api => &self.api_py,
        }
    }

    pub fn get_mut(&mut self, label: Label) -> &mut T {
        match label {
            Label::App => &mut self.app_py,
            Label::Api => &mut self.api_py,
        }
    }
}

/// Root of one completed analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    #[serde(default, deserialize_with = "nullable")]
    pub cross_reference_analysis: CrossReferenceAnalysis,
    /// Function name → names it calls, per file.
    #[serde(default, deserialize_with = "nullable")]
    pub function_call_chains: PerLabel<KeyedList<Vec<String>>>,
    /// Class name → parents and methods, per file.
    #[serde(default, deserialize_with = "nullable")]
    pub class_hierarchy: PerLabel<KeyedList<ClassHierarchyEntry>>,
    /// Syntax node type → occurrence count, per file.
    #[serde(default, deserialize_with = "nullable")]
    pub node_type_frequencies: PerLabel<KeyedList<u64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub decorated_functions: PerLabel<Vec<DecoratedFunction>>,
    #[serde(default, deserialize_with = "nullable")]
    pub function_parameters: PerLabel<Vec<FunctionParameters>>,
    /// Functions containing a `try` block, per file.
    #[serde(default, deserialize_with = "nullable")]
    pub error_handling: PerLabel<Vec<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub async_functions: PerLabel<Vec<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub app_analysis: FileAnalysis,
    #[serde(default, deserialize_with = "nullable")]
    pub api_analysis: FileAnalysis,
    /// Top-level fields this client does not model, kept so that sending
    /// the record back to the backend loses nothing.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// How the two files reference each other.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrossReferenceAnalysis {
    #[serde(default, deserialize_with = "nullable")]
    pub function_usage: FunctionUsage,
    #[serde(default, deserialize_with = "nullable")]
    pub shared_dependencies: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub api_integration: ApiIntegration,
}

impl CrossReferenceAnalysis {
    pub fn is_empty(&self) -> bool {
        self.function_usage.direct_function_calls.is_empty()
            && self.function_usage.imported_functions.is_empty()
            && self.shared_dependencies.is_empty()
            && self.api_integration.api_calls.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionUsage {
    /// Qualified names such as `api.fetch_user`.
    #[serde(default, deserialize_with = "nullable")]
    pub direct_function_calls: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub imported_functions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiIntegration {
    #[serde(default, deserialize_with = "nullable")]
    pub api_calls: Vec<ApiCall>,
}

/// An outbound HTTP call found in the application file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiCall {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub http_method: String,
    #[serde(default, deserialize_with = "nullable")]
    pub client_library: String,
    #[serde(default, deserialize_with = "nullable")]
    pub arguments: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassHierarchyEntry {
    #[serde(default, deserialize_with = "nullable")]
    pub parent_classes: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub methods: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecoratedFunction {
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub is_async: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub decorators: Vec<Decorator>,
    #[serde(default, deserialize_with = "nullable")]
    pub parameters: Vec<Parameter>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Decorator {
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub arguments: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(rename = "type", default)]
    pub annotation: Option<String>,
    #[serde(default)]
    pub default: Option<String>,
}

impl std::fmt::Display for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(annotation) = &self.annotation {
            write!(f, ": {}", annotation)?;
        }
        if let Some(default) = &self.default {
            write!(f, " = {}", default)?;
        }
        Ok(())
    }
}

/// Parameter list of one function, as reported under `function_parameters`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionParameters {
    #[serde(default, deserialize_with = "nullable")]
    pub function: String,
    #[serde(default, deserialize_with = "nullable")]
    pub parameters: Vec<Parameter>,
}

/// Per-file structures reported outside the label-keyed maps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileAnalysis {
    #[serde(default, deserialize_with = "nullable")]
    pub relationships: Vec<Relationship>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A method defined inside a class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(rename = "class", default, deserialize_with = "nullable")]
    pub class_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub function: String,
    #[serde(default, deserialize_with = "nullable")]
    pub is_async: bool,
}

impl AnalysisRecord {
    /// Decode a record from backend JSON and normalize it.
    ///
    /// Decode from text rather than a `serde_json::Value`: a `Value` has
    /// already sorted its object keys, and map order is part of the record.
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<Self>(json).map(Self::normalize)
    }

    /// One-time normalization applied on receipt.
    ///
    /// Decorated functions that arrive without parameters pick them up from
    /// the `function_parameters` listing for the same file. Applying this
    /// twice is the same as applying it once.
    pub fn normalize(mut self) -> Self {
        for label in Label::ALL {
            let params = self.function_parameters.get(label).clone();
            for func in self.decorated_functions.get_mut(label) {
                if !func.parameters.is_empty() {
                    continue;
                }
                if let Some(found) = params.iter().find(|p| p.function == func.name) {
                    func.parameters = found.parameters.clone();
                }
            }
        }
        self
    }

    /// Error string the backend embeds instead of results, if any.
    pub fn backend_error(&self) -> Option<&str> {
        self.extra.get("error").and_then(Value::as_str)
    }
}
