//! # CodeAssistX CLI Application
//!
//! Terminal front-end for the analysis service: reads code from a file or
//! stdin, submits it once and prints one tab (or all of them) using the same
//! per-tab content as the GUI.

use std::fmt::Write as _;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use analysis_core::config::{ClientConfig, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS};
use analysis_core::diagram::{EdgeStyle, NodeShape, RenderedDiagram};
use analysis_core::session::{Session, Tab, TabContent};
use analysis_core::transport::HttpTransport;

#[derive(Debug, Parser)]
#[command(name = "analysis_cli", version, about = "Analyze code with the CodeAssistX service")]
struct Args {
    /// Source file to analyze; reads stdin when omitted or "-"
    file: Option<PathBuf>,

    /// Tab to print: flow, ast, trace, explain or all
    #[arg(long, default_value = "all")]
    tab: String,

    /// Analyze endpoint URL
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Print the stored result as JSON instead of tab contents
    #[arg(long)]
    json: bool,
}

fn parse_tabs(arg: &str) -> Result<Vec<Tab>, String> {
    if arg.eq_ignore_ascii_case("all") {
        Ok(Tab::ALL.to_vec())
    } else {
        arg.parse::<Tab>().map(|tab| vec![tab])
    }
}

fn read_source(file: Option<&PathBuf>) -> anyhow::Result<String> {
    match file {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        _ => {
            let mut code = String::new();
            io::stdin().read_to_string(&mut code).context("failed to read stdin")?;
            Ok(code)
        }
    }
}

/// Text for one tab, as printed to the terminal
fn render_tab(session: &Session, tab: Tab) -> String {
    match session.tab_content(tab) {
        TabContent::Diagram(Some(diagram)) => render_outline(diagram),
        TabContent::Diagram(None) => String::new(),
        TabContent::Text(body) => body,
        TabContent::Placeholder(body) => body.to_string(),
        TabContent::Blocks(lines) => lines
            .iter()
            .map(|line| format!("  • {}", line))
            .collect::<Vec<_>>()
            .join("\n"),
        TabContent::Error(error) => format!("Error: {}", error),
    }
}

/// Layer-by-layer listing of a rendered flowchart
fn render_outline(diagram: &RenderedDiagram) -> String {
    let layout = &diagram.layout;
    let chart = &layout.chart;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{:?} flowchart: {} nodes, {} edges",
        chart.direction,
        chart.nodes.len(),
        chart.edges.len()
    );

    for (depth, layer) in layout.layers().iter().enumerate() {
        let nodes: Vec<String> = layer
            .iter()
            .map(|&idx| {
                let node = &chart.nodes[idx];
                match node.shape {
                    NodeShape::Rectangle => format!("[{}]", node.label),
                    NodeShape::Rounded => format!("({})", node.label),
                    NodeShape::Circle => format!("(({}))", node.label),
                    NodeShape::Diamond => format!("{{{}}}", node.label),
                    NodeShape::Hexagon => format!("{{{{{}}}}}", node.label),
                }
            })
            .collect();
        let _ = writeln!(out, "  {:>2}: {}", depth, nodes.join("  "));
    }

    for (edge, &is_back) in chart.edges.iter().zip(&layout.back_edges) {
        let connector = match (edge.style, edge.arrow) {
            (EdgeStyle::Solid, true) => "-->",
            (EdgeStyle::Solid, false) => "---",
            (EdgeStyle::Dotted, true) => "-.->",
            (EdgeStyle::Dotted, false) => "-.-",
            (EdgeStyle::Thick, true) => "==>",
            (EdgeStyle::Thick, false) => "===",
        };
        let label = edge.label.as_deref().map(|l| format!(" |{}|", l)).unwrap_or_default();
        let cycle = if is_back { "  (loop)" } else { "" };
        let _ = writeln!(
            out,
            "  {} {}{} {}{}",
            chart.nodes[edge.from].id, connector, label, chart.nodes[edge.to].id, cycle
        );
    }

    out.trim_end().to_string()
}

async fn run(args: Args) -> anyhow::Result<ExitCode> {
    let tabs = parse_tabs(&args.tab).map_err(anyhow::Error::msg)?;

    let config = ClientConfig::default()
        .with_endpoint(args.endpoint)
        .with_timeout_secs(args.timeout);
    let transport = HttpTransport::new(&config)?;

    let mut session = Session::default();
    session.set_source(read_source(args.file.as_ref())?);

    if session.submit(&transport).await.is_none() {
        anyhow::bail!("nothing to analyze: the input is empty");
    }
    let Some(result) = session.result() else {
        anyhow::bail!("request finished without a result");
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        for tab in &tabs {
            if tabs.len() > 1 {
                println!("═══════════════════════════════════════");
                println!("  {}", tab.label().to_uppercase());
                println!("═══════════════════════════════════════");
            }
            println!("{}", render_tab(&session, *tab));
            println!();
        }
    }

    Ok(if result.is_success() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    match run(Args::parse()).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn analyzed(body: serde_json::Value) -> Session {
        let mut session = Session::default();
        let submission = session.begin_submit().unwrap();
        session.complete(submission.seq, Ok(body));
        session
    }

    #[test]
    fn test_parse_tabs() {
        assert_eq!(parse_tabs("all").unwrap(), Tab::ALL.to_vec());
        assert_eq!(parse_tabs("trace").unwrap(), vec![Tab::Trace]);
        assert!(parse_tabs("table").is_err());
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["analysis_cli"]);
        assert_eq!(args.tab, "all");
        assert_eq!(args.endpoint, DEFAULT_ENDPOINT);
        assert!(args.file.is_none());
        assert!(!args.json);
    }

    #[test]
    fn test_placeholders_before_any_result() {
        let session = Session::default();
        assert_eq!(render_tab(&session, Tab::Ast), "No result yet");
        assert_eq!(render_tab(&session, Tab::Explain), "  • No explanation yet");
        assert_eq!(render_tab(&session, Tab::Flow), "");
    }

    #[test]
    fn test_explain_prints_one_bullet_per_line() {
        let session = analyzed(json!({
            "ast": {}, "trace": [], "explanation": "first\nsecond", "mermaid": "",
        }));
        assert_eq!(render_tab(&session, Tab::Explain), "  • first\n  • second");
    }

    #[test]
    fn test_flow_outline() {
        let session = analyzed(json!({
            "ast": {}, "trace": [], "explanation": "",
            "mermaid": "graph TD\nA[a = 5] --> B[b = a * 2]\nB -->|loop| A",
        }));
        assert_eq!(
            render_tab(&session, Tab::Flow),
            "TopDown flowchart: 2 nodes, 2 edges\n   0: [a = 5]\n   1: [b = a * 2]\n  A --> B\n  B --> |loop| A  (loop)"
        );
    }

    #[test]
    fn test_flow_outline_fan_out() {
        let session = analyzed(json!({
            "ast": {}, "trace": [], "explanation": "",
            "mermaid": "graph LR\nstart{{Start}} -- go --> a & b",
        }));
        assert_eq!(
            render_tab(&session, Tab::Flow),
            "LeftRight flowchart: 3 nodes, 2 edges\n   0: {{Start}}\n   1: [a]  [b]\n  start --> |go| a\n  start --> |go| b"
        );
    }

    #[test]
    fn test_error_prints_for_every_tab() {
        let session = analyzed(json!({"error": "SyntaxError"}));
        for tab in Tab::ALL {
            assert_eq!(render_tab(&session, tab), "Error: SyntaxError");
        }
    }
}
