//! # Session
//!
//! All state behind the analysis view: the code being edited, the last
//! stored result, the active tab and the flow tab's diagram container.
//! Front-ends render from [`Session::tab_content`] and feed user actions and
//! network completions back in.
//!
//! ## Request lifecycle
//!
//! ```text
//! idle ──begin_submit──▶ in flight ──complete──▶ idle (result stored, diagram rendered)
//! ```
//!
//! Every submission carries a sequence number. A completion for anything but
//! the latest submission is stale and dropped, so an older, slower response
//! can never overwrite a newer one.
//!
//! ## Example
//!
//! ```rust
//! use analysis_core::session::{Session, Tab, TabContent};
//! use serde_json::json;
//!
//! let mut session = Session::default();
//! let submission = session.begin_submit().unwrap();
//! session.complete(submission.seq, Ok(json!({
//!     "ast": {}, "trace": [], "explanation": "One\nTwo", "mermaid": "",
//! })));
//!
//! session.select_tab(Tab::Explain);
//! assert_eq!(session.current_content(), TabContent::Blocks(vec!["One", "Two"]));
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analysis::{AnalysisResult, AnalyzeRequest, PLACEHOLDER_PROGRAM};
use crate::diagram::{DiagramHost, DiagramRenderer, RenderedDiagram};
use crate::errors::AssistResult;
use crate::transport::AnalysisTransport;

pub const NO_RESULT_TEXT: &str = "No result yet";
pub const NO_TRACE_TEXT: &str = "No trace yet";
pub const NO_EXPLANATION_TEXT: &str = "No explanation yet";

/// Which facet of the result is on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Flow,
    Ast,
    Trace,
    Explain,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Flow, Tab::Ast, Tab::Trace, Tab::Explain];

    /// Short machine name (`flow`, `ast`, ...)
    pub fn name(&self) -> &'static str {
        match self {
            Tab::Flow => "flow",
            Tab::Ast => "ast",
            Tab::Trace => "trace",
            Tab::Explain => "explain",
        }
    }

    /// Label shown on the tab selector
    pub fn label(&self) -> &'static str {
        match self {
            Tab::Flow => "Flowchart",
            Tab::Ast => "AST",
            Tab::Trace => "Trace",
            Tab::Explain => "Explain",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tab::ALL
            .into_iter()
            .find(|tab| tab.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown tab '{}' (expected flow, ast, trace or explain)", s))
    }
}

/// What a tab displays right now
#[derive(Debug, Clone, PartialEq)]
pub enum TabContent<'a> {
    /// Flow tab container; empty until a diagram has been rendered into it
    Diagram(Option<&'a RenderedDiagram>),
    /// Pretty-printed structure
    Text(String),
    /// Fixed text shown before any result
    Placeholder(&'static str),
    /// One visual block per line
    Blocks(Vec<&'a str>),
    /// The stored failure, shown instead of any tab's own content
    Error(&'a str),
}

/// A request ready to send, tagged for [`Session::complete`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub seq: u64,
    pub request: AnalyzeRequest,
}

/// What [`Session::complete`] did with a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Stored as the current result
    Stored { success: bool },
    /// A newer submission exists; dropped
    Stale,
}

/// State and operations of the analysis view.
#[derive(Debug)]
pub struct Session {
    source: String,
    result: Option<AnalysisResult>,
    active_tab: Tab,
    diagram: DiagramHost,
    last_seq: u64,
    in_flight: Option<u64>,
    completed_at: Option<DateTime<Local>>,
}

impl Default for Session {
    fn default() -> Self {
        Session::with_host(DiagramHost::default())
    }
}

impl Session {
    /// Session drawing flowcharts with `renderer`
    pub fn new(renderer: Box<dyn DiagramRenderer>) -> Self {
        Session::with_host(DiagramHost::new(renderer))
    }

    fn with_host(diagram: DiagramHost) -> Self {
        Session {
            source: PLACEHOLDER_PROGRAM.to_string(),
            result: None,
            active_tab: Tab::default(),
            diagram,
            last_seq: 0,
            in_flight: None,
            completed_at: None,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn set_source(&mut self, source: impl Into<String>) {
        self.source = source.into();
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    /// Switch tabs. Never touches the result or the network.
    pub fn select_tab(&mut self, tab: Tab) {
        self.active_tab = tab;
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// When the current result was stored
    pub fn completed_at(&self) -> Option<DateTime<Local>> {
        self.completed_at
    }

    pub fn diagram(&self) -> Option<&RenderedDiagram> {
        self.diagram.current()
    }

    /// Start a request for the current code.
    ///
    /// Returns `None` when there is nothing but whitespace to send. The code
    /// is otherwise sent as-is.
    pub fn begin_submit(&mut self) -> Option<Submission> {
        if self.source.trim().is_empty() {
            tracing::debug!("submit skipped: no code");
            return None;
        }

        self.last_seq += 1;
        self.in_flight = Some(self.last_seq);
        tracing::info!(seq = self.last_seq, "analysis requested");

        Some(Submission {
            seq: self.last_seq,
            request: AnalyzeRequest::new(self.source.clone()),
        })
    }

    /// Store the outcome of submission `seq`.
    ///
    /// Any transport failure becomes an error result. Once the new result is
    /// in place its diagram is rendered into the flow container (or the
    /// container is emptied when there is none).
    pub fn complete(&mut self, seq: u64, outcome: AssistResult<Value>) -> Completion {
        if seq != self.last_seq {
            tracing::debug!(seq, latest = self.last_seq, "dropping stale analysis response");
            return Completion::Stale;
        }
        self.in_flight = None;

        let result = match outcome {
            Ok(body) => AnalysisResult::from_response(body),
            Err(e) => {
                tracing::error!(seq, error = %e, "analysis request failed");
                AnalysisResult::from_error(&e)
            }
        };
        let success = result.is_success();
        tracing::info!(seq, success, "analysis result stored");

        self.result = Some(result);
        self.completed_at = Some(Local::now());
        self.after_commit();

        Completion::Stored { success }
    }

    /// Render hook, run once the new result is committed.
    fn after_commit(&mut self) {
        match self.result.as_ref().and_then(AnalysisResult::mermaid) {
            Some(definition) => self.diagram.render_diagram(Some(definition)),
            None => self.diagram.clear(),
        }
    }

    /// Full round trip through `transport`.
    pub async fn submit(&mut self, transport: &dyn AnalysisTransport) -> Option<Completion> {
        let submission = self.begin_submit()?;
        let outcome = transport.analyze(&submission.request).await;
        Some(self.complete(submission.seq, outcome))
    }

    /// Content of the active tab
    pub fn current_content(&self) -> TabContent<'_> {
        self.tab_content(self.active_tab)
    }

    /// Content of `tab` for the stored result.
    ///
    /// A stored failure replaces every tab's content, placeholders included.
    pub fn tab_content(&self, tab: Tab) -> TabContent<'_> {
        let report = match &self.result {
            Some(AnalysisResult::Failure { error }) => return TabContent::Error(error),
            Some(AnalysisResult::Success(report)) => Some(report),
            None => None,
        };

        match tab {
            Tab::Flow => TabContent::Diagram(self.diagram.current()),
            Tab::Ast => match report {
                Some(report) => TabContent::Text(pretty(&report.ast)),
                None => TabContent::Placeholder(NO_RESULT_TEXT),
            },
            Tab::Trace => match report {
                Some(report) => TabContent::Text(pretty(&report.trace)),
                None => TabContent::Placeholder(NO_TRACE_TEXT),
            },
            Tab::Explain => match report {
                Some(report) if !report.explanation.is_empty() => {
                    TabContent::Blocks(report.explanation.split('\n').collect())
                }
                _ => TabContent::Blocks(vec![NO_EXPLANATION_TEXT]),
            },
        }
    }
}

/// Two-space indented JSON; key order is deterministic
pub fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AssistError;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn success_body() -> Value {
        json!({
            "ast": {"body": [{"type": "Assign"}], "type": "Module"},
            "trace": [{"step": 1, "line": 1}],
            "explanation": "Computes b as twice a\nPrints result",
            "mermaid": "graph TD; A-->B",
        })
    }

    fn stored(session: &mut Session, outcome: AssistResult<Value>) -> Completion {
        let submission = session.begin_submit().unwrap();
        session.complete(submission.seq, outcome)
    }

    #[test]
    fn test_initial_state() {
        let session = Session::default();
        assert_eq!(session.source(), PLACEHOLDER_PROGRAM);
        assert_eq!(session.active_tab(), Tab::Flow);
        assert!(session.result().is_none());
        assert!(!session.is_in_flight());
        assert!(session.completed_at().is_none());
    }

    #[test]
    fn test_placeholders_without_result() {
        let session = Session::default();
        assert_eq!(session.tab_content(Tab::Flow), TabContent::Diagram(None));
        assert_eq!(session.tab_content(Tab::Ast), TabContent::Placeholder("No result yet"));
        assert_eq!(session.tab_content(Tab::Trace), TabContent::Placeholder("No trace yet"));
        assert_eq!(session.tab_content(Tab::Explain), TabContent::Blocks(vec!["No explanation yet"]));
    }

    #[test]
    fn test_blank_code_is_not_submitted() {
        let mut session = Session::default();
        session.set_source("  \n\t");
        assert!(session.begin_submit().is_none());
        assert!(!session.is_in_flight());
    }

    #[test]
    fn test_submission_carries_code_verbatim() {
        let mut session = Session::default();
        session.set_source("x = (");
        let submission = session.begin_submit().unwrap();
        assert_eq!(submission.request.code, "x = (");
        assert!(session.is_in_flight());
    }

    #[test]
    fn test_success_fills_every_tab() {
        let mut session = Session::default();
        assert_eq!(stored(&mut session, Ok(success_body())), Completion::Stored { success: true });
        assert!(!session.is_in_flight());

        let TabContent::Text(ast) = session.tab_content(Tab::Ast) else {
            panic!("expected ast text");
        };
        assert_eq!(ast, "{\n  \"body\": [\n    {\n      \"type\": \"Assign\"\n    }\n  ],\n  \"type\": \"Module\"\n}");

        assert_eq!(
            session.tab_content(Tab::Explain),
            TabContent::Blocks(vec!["Computes b as twice a", "Prints result"])
        );

        let TabContent::Diagram(Some(diagram)) = session.tab_content(Tab::Flow) else {
            panic!("expected rendered diagram");
        };
        assert_eq!(diagram.definition, "graph TD; A-->B");
    }

    #[test]
    fn test_explanation_segments_match_newlines() {
        let mut session = Session::default();
        let mut body = success_body();
        body["explanation"] = json!("one\n\nthree\n");
        stored(&mut session, Ok(body));
        assert_eq!(session.tab_content(Tab::Explain), TabContent::Blocks(vec!["one", "", "three", ""]));
    }

    #[test]
    fn test_empty_explanation_shows_placeholder() {
        let mut session = Session::default();
        let mut body = success_body();
        body["explanation"] = json!("");
        stored(&mut session, Ok(body));
        assert_eq!(session.tab_content(Tab::Explain), TabContent::Blocks(vec![NO_EXPLANATION_TEXT]));
    }

    #[test]
    fn test_failure_replaces_every_tab() {
        let mut session = Session::default();
        stored(&mut session, Ok(success_body()));
        let completion = stored(&mut session, Err(AssistError::network("connection refused")));
        assert_eq!(completion, Completion::Stored { success: false });

        for tab in Tab::ALL {
            assert_eq!(session.tab_content(tab), TabContent::Error("Network error: connection refused"));
        }
        assert!(session.diagram().is_none());
    }

    #[test]
    fn test_select_tab_leaves_result_alone() {
        let mut session = Session::default();
        stored(&mut session, Ok(success_body()));
        let before = session.result().cloned();

        for tab in [Tab::Trace, Tab::Explain, Tab::Ast, Tab::Flow] {
            session.select_tab(tab);
            assert_eq!(session.active_tab(), tab);
        }
        assert_eq!(session.result().cloned(), before);
        assert!(!session.is_in_flight());
    }

    #[test]
    fn test_stale_response_is_dropped() {
        let mut session = Session::default();
        let first = session.begin_submit().unwrap();
        let second = session.begin_submit().unwrap();

        assert_eq!(session.complete(second.seq, Ok(success_body())), Completion::Stored { success: true });
        assert_eq!(
            session.complete(first.seq, Err(AssistError::network("late"))),
            Completion::Stale
        );
        assert!(session.result().unwrap().is_success());
    }

    #[test]
    fn test_in_flight_until_latest_completes() {
        let mut session = Session::default();
        let first = session.begin_submit().unwrap();
        let second = session.begin_submit().unwrap();
        session.complete(first.seq, Ok(success_body()));
        assert!(session.is_in_flight());
        session.complete(second.seq, Ok(success_body()));
        assert!(!session.is_in_flight());
    }

    #[test]
    fn test_success_without_diagram_empties_container() {
        let mut session = Session::default();
        stored(&mut session, Ok(success_body()));
        assert!(session.diagram().is_some());

        let mut body = success_body();
        body["mermaid"] = json!("");
        stored(&mut session, Ok(body));
        assert_eq!(session.tab_content(Tab::Flow), TabContent::Diagram(None));
    }

    #[test]
    fn test_tab_names_parse() {
        assert_eq!("EXPLAIN".parse::<Tab>().unwrap(), Tab::Explain);
        assert!("graph".parse::<Tab>().is_err());
        assert_eq!(Tab::Flow.to_string(), "flow");
        assert_eq!(Tab::Ast.label(), "AST");
    }
}
