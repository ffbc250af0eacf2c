//! # Analysis Payloads
//!
//! The request sent to the analysis service and the result stored from its
//! response.
//!
//! A stored result is either a complete success payload or an error payload,
//! never a mix. The service does not enforce a schema on failure, so every
//! response body goes through [`AnalysisResult::from_response`], which decides
//! which of the two it is.
//!
//! ## Example
//!
//! ```rust
//! use analysis_core::analysis::AnalysisResult;
//! use serde_json::json;
//!
//! let result = AnalysisResult::from_response(json!({
//!     "ast": {"type": "Module"},
//!     "trace": [],
//!     "explanation": "Does nothing",
//!     "mermaid": "graph TD; A-->B",
//! }));
//! assert!(result.is_success());
//!
//! let result = AnalysisResult::from_response(json!({"error": "SyntaxError"}));
//! assert_eq!(result.error(), Some("SyntaxError"));
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AssistError;

/// Program shown in the editor before the user types anything
pub const PLACEHOLDER_PROGRAM: &str = "a = 5\nb = a * 2\nprint(b)";

/// Body of the POST sent to the analyze endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub code: String,
}

impl AnalyzeRequest {
    pub fn new(code: impl Into<String>) -> Self {
        AnalyzeRequest { code: code.into() }
    }
}

/// Everything a successful analysis returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Abstract syntax tree, shape decided by the service
    pub ast: Value,
    /// Execution-step records, shape decided by the service
    pub trace: Value,
    /// Newline-delimited explanation
    pub explanation: String,
    /// Flowchart definition in Mermaid syntax
    pub mermaid: String,
}

/// The stored outcome of one completed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisResult {
    Success(AnalysisReport),
    Failure { error: String },
}

impl AnalysisResult {
    /// Classify a parsed response body.
    ///
    /// An object carrying `ast`, `trace`, `explanation` and `mermaid` is a
    /// success (a `null` explanation or diagram counts as empty text), even
    /// when it also carries an `error` key. Anything else is a failure: the
    /// body's own `error` string when it has one, otherwise a message naming
    /// the first missing or mistyped field.
    pub fn from_response(body: Value) -> Self {
        let mut fields = match body {
            Value::Object(fields) => fields,
            other => {
                return AnalysisResult::failure(format!(
                    "Invalid response: expected a JSON object, got {}",
                    json_kind(&other)
                ))
            }
        };

        if let Some(problem) = report_problem(&fields) {
            return match fields.remove("error") {
                Some(Value::String(error)) => AnalysisResult::failure(error),
                _ => AnalysisResult::failure(format!("Invalid response: {}", problem)),
            };
        }

        AnalysisResult::Success(AnalysisReport {
            ast: fields.remove("ast").unwrap_or(Value::Null),
            trace: fields.remove("trace").unwrap_or(Value::Null),
            explanation: take_text(&mut fields, "explanation"),
            mermaid: take_text(&mut fields, "mermaid"),
        })
    }

    /// Collapse any failure in the request chain into an error payload
    pub fn from_error(error: &AssistError) -> Self {
        AnalysisResult::failure(error.to_string())
    }

    pub fn failure(error: impl Into<String>) -> Self {
        AnalysisResult::Failure { error: error.into() }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AnalysisResult::Success(_))
    }

    pub fn report(&self) -> Option<&AnalysisReport> {
        match self {
            AnalysisResult::Success(report) => Some(report),
            AnalysisResult::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            AnalysisResult::Success(_) => None,
            AnalysisResult::Failure { error } => Some(error),
        }
    }

    /// Diagram definition, if this is a success carrying a non-empty one
    pub fn mermaid(&self) -> Option<&str> {
        self.report()
            .map(|report| report.mermaid.as_str())
            .filter(|text| !text.trim().is_empty())
    }
}

/// Why `fields` is not a complete success payload, if it isn't
fn report_problem(fields: &serde_json::Map<String, Value>) -> Option<String> {
    for key in ["ast", "trace", "explanation", "mermaid"] {
        match fields.get(key) {
            None => return Some(format!("missing field '{}'", key)),
            Some(Value::String(_)) | Some(Value::Null) => {}
            Some(other) if key == "explanation" || key == "mermaid" => {
                return Some(format!("field '{}' must be a string, got {}", key, json_kind(other)))
            }
            Some(_) => {}
        }
    }
    None
}

/// Text field of a checked payload; `null` reads as empty
fn take_text(fields: &mut serde_json::Map<String, Value>, key: &str) -> String {
    match fields.remove(key) {
        Some(Value::String(text)) => text,
        _ => String::new(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
