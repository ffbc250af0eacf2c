//! Parser for the flowchart subset of Mermaid the analysis service emits.
//!
//! Supported:
//! - `graph` / `flowchart` header with `TD`, `TB`, `BT`, `LR` or `RL`
//! - statements split by newlines or `;`, `%%` comments outside quotes
//! - node ids with inner hyphens (`node-1`), `:::class` suffixes
//! - nodes `A`, `A[rect]`, `A(rounded)`, `A((circle))`, `A{diamond}`,
//!   `A{{hexagon}}`, `A([stadium])`, `A[[sub]]`, `A[(db)]`, `A>flag]`, quoted labels
//! - edges `-->`, `---`, `-.->`, `-.-`, `==>`, `===` and longer forms (`---->`),
//!   labels as `|label|` or inline (`-- yes -->`), chains, `&` fan-out
//! - `subgraph` / `end` / styling lines are accepted and ignored

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::{AssistError, AssistResult};

/// Flow direction from the header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    TopDown,
    BottomUp,
    LeftRight,
    RightLeft,
}

impl Direction {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "TD" | "TB" => Some(Direction::TopDown),
            "BT" => Some(Direction::BottomUp),
            "LR" => Some(Direction::LeftRight),
            "RL" => Some(Direction::RightLeft),
            _ => None,
        }
    }

    /// Whether layers stack along the x axis
    pub fn is_horizontal(&self) -> bool {
        matches!(self, Direction::LeftRight | Direction::RightLeft)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeShape {
    Rectangle,
    Rounded,
    Circle,
    Diamond,
    Hexagon,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowNode {
    pub id: String,
    pub label: String,
    pub shape: NodeShape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeStyle {
    Solid,
    Dotted,
    Thick,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowEdge {
    /// Index into [`Flowchart::nodes`]
    pub from: usize,
    /// Index into [`Flowchart::nodes`]
    pub to: usize,
    pub label: Option<String>,
    pub style: EdgeStyle,
    pub arrow: bool,
}

/// A parsed flowchart. Nodes keep first-appearance order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Flowchart {
    pub direction: Direction,
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
}

const IGNORED_KEYWORDS: &[&str] = &[
    "subgraph",
    "end",
    "direction",
    "classDef",
    "class",
    "style",
    "linkStyle",
    "click",
];

/// Opening and closing delimiters of each node shape, longest first
const SHAPES: &[(&str, &str, NodeShape)] = &[
    ("((", "))", NodeShape::Circle),
    ("([", "])", NodeShape::Rounded),
    ("(", ")", NodeShape::Rounded),
    ("{{", "}}", NodeShape::Hexagon),
    ("{", "}", NodeShape::Diamond),
    ("[[", "]]", NodeShape::Rectangle),
    ("[(", ")]", NodeShape::Rounded),
    ("[", "]", NodeShape::Rectangle),
    (">", "]", NodeShape::Rectangle),
];

/// Parse a flowchart definition.
pub fn parse(definition: &str) -> AssistResult<Flowchart> {
    let mut builder = Builder::default();
    let mut header_seen = false;

    for (line_idx, line) in definition.lines().enumerate() {
        let line_no = line_idx + 1;
        let line = strip_comment(line);

        for statement in split_statements(line) {
            let statement = statement.trim();
            if statement.is_empty() {
                continue;
            }

            if !header_seen {
                builder.direction = parse_header(statement, line_no)?;
                header_seen = true;
                continue;
            }

            builder.statement(statement, line_no)?;
        }
    }

    if !header_seen {
        return Err(AssistError::diagram(1, "empty diagram definition"));
    }

    Ok(builder.finish())
}

fn parse_header(statement: &str, line_no: usize) -> AssistResult<Direction> {
    let mut words = statement.split_whitespace();
    match words.next() {
        Some("graph") | Some("flowchart") => {}
        Some(other) => {
            return Err(AssistError::diagram(
                line_no,
                format!("expected 'graph' or 'flowchart', found '{}'", other),
            ))
        }
        None => return Err(AssistError::diagram(line_no, "missing diagram header")),
    }

    match words.next() {
        None => Ok(Direction::default()),
        Some(token) => Direction::parse(token)
            .ok_or_else(|| AssistError::diagram(line_no, format!("unknown direction '{}'", token))),
    }
}

fn strip_comment(line: &str) -> &str {
    let mut in_quotes = false;
    for (pos, ch) in line.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            '%' if !in_quotes && line[pos..].starts_with("%%") => return &line[..pos],
            _ => {}
        }
    }
    line
}

/// Split on `;` outside quotes and brackets
fn split_statements(line: &str) -> Vec<&str> {
    let mut statements = Vec::new();
    let mut depth = 0usize;
    let mut in_quotes = false;
    let mut start = 0;

    for (pos, ch) in line.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            '[' | '(' | '{' if !in_quotes => depth += 1,
            ']' | ')' | '}' if !in_quotes => depth = depth.saturating_sub(1),
            ';' if !in_quotes && depth == 0 => {
                statements.push(&line[start..pos]);
                start = pos + 1;
            }
            _ => {}
        }
    }
    statements.push(&line[start..]);
    statements
}

#[derive(Default)]
struct Builder {
    direction: Direction,
    nodes: Vec<FlowNode>,
    edges: Vec<FlowEdge>,
    index: HashMap<String, usize>,
    /// Nodes that were given an explicit shape/label
    defined: Vec<bool>,
}

impl Builder {
    fn statement(&mut self, statement: &str, line_no: usize) -> AssistResult<()> {
        let first_word = statement.split_whitespace().next().unwrap_or("");
        if IGNORED_KEYWORDS.contains(&first_word) {
            tracing::trace!(line = line_no, keyword = first_word, "skipping flowchart statement");
            return Ok(());
        }

        let mut cursor = Cursor::new(statement, line_no);
        let mut prev = self.node_group(&mut cursor)?;

        loop {
            cursor.skip_ws();
            if cursor.eof() {
                return Ok(());
            }

            let Some(link) = cursor.link()? else {
                return Err(cursor.unexpected());
            };
            let next = self.node_group(&mut cursor)?;

            for &from in &prev {
                for &to in &next {
                    self.edges.push(FlowEdge {
                        from,
                        to,
                        label: link.label.clone(),
                        style: link.style,
                        arrow: link.arrow,
                    });
                }
            }
            prev = next;
        }
    }

    /// `A`, or `A & B & C` on either side of a link
    fn node_group(&mut self, cursor: &mut Cursor) -> AssistResult<Vec<usize>> {
        let mut group = vec![self.node_ref(cursor)?];
        loop {
            cursor.skip_ws();
            if !cursor.consume_str("&") {
                return Ok(group);
            }
            group.push(self.node_ref(cursor)?);
        }
    }

    fn node_ref(&mut self, cursor: &mut Cursor) -> AssistResult<usize> {
        cursor.skip_ws();
        let id = cursor.node_id();
        if id.is_empty() {
            return Err(cursor.unexpected());
        }
        let shape = cursor.node_shape()?;
        cursor.class_suffix();
        Ok(self.upsert(id, shape))
    }

    /// An explicit shape replaces a bare reference; after that the first definition sticks.
    fn upsert(&mut self, id: String, shape: Option<(NodeShape, String)>) -> usize {
        if let Some(&idx) = self.index.get(&id) {
            if let Some((shape, label)) = shape {
                if !self.defined[idx] {
                    self.nodes[idx].shape = shape;
                    self.nodes[idx].label = label;
                    self.defined[idx] = true;
                }
            }
            return idx;
        }

        let idx = self.nodes.len();
        let defined = shape.is_some();
        let (shape, label) = shape.unwrap_or_else(|| (NodeShape::Rectangle, id.clone()));
        self.nodes.push(FlowNode {
            id: id.clone(),
            label,
            shape,
        });
        self.defined.push(defined);
        self.index.insert(id, idx);
        idx
    }

    fn finish(self) -> Flowchart {
        Flowchart {
            direction: self.direction,
            nodes: self.nodes,
            edges: self.edges,
        }
    }
}

/// A parsed connector between two node groups
struct Link {
    style: EdgeStyle,
    arrow: bool,
    label: Option<String>,
}

impl Link {
    fn new(style: EdgeStyle, arrow: bool, label: Option<String>) -> Self {
        Link { style, arrow, label }
    }
}

struct Cursor {
    src: Vec<char>,
    pos: usize,
    line: usize,
}

impl Cursor {
    fn new(statement: &str, line: usize) -> Self {
        Cursor {
            src: statement.chars().collect(),
            pos: 0,
            line,
        }
    }

    fn eof(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn ch(&self) -> char {
        self.src.get(self.pos).copied().unwrap_or('\0')
    }

    fn peek_str(&self, s: &str) -> bool {
        let mut pos = self.pos;
        for expected in s.chars() {
            if self.src.get(pos) != Some(&expected) {
                return false;
            }
            pos += 1;
        }
        true
    }

    fn consume_str(&mut self, s: &str) -> bool {
        if self.peek_str(s) {
            self.pos += s.chars().count();
            true
        } else {
            false
        }
    }

    /// Consume a run of `c`, returning its length
    fn run_of(&mut self, c: char) -> usize {
        let start = self.pos;
        while !self.eof() && self.ch() == c {
            self.pos += 1;
        }
        self.pos - start
    }

    fn skip_ws(&mut self) {
        while !self.eof() && self.ch().is_whitespace() {
            self.pos += 1;
        }
    }

    fn unexpected(&self) -> AssistError {
        if self.eof() {
            AssistError::diagram(self.line, "unexpected end of statement")
        } else {
            let rest: String = self.src[self.pos..].iter().take(12).collect();
            AssistError::diagram(self.line, format!("unexpected '{}'", rest))
        }
    }

    /// A hyphen joins the id only when more id follows it, so `A-->B` stays `A`.
    fn node_id(&mut self) -> String {
        let start = self.pos;
        while !self.eof() {
            let ch = self.ch();
            let joins = is_id_char(ch)
                || (ch == '-' && self.pos > start && self.src.get(self.pos + 1).copied().is_some_and(is_id_char));
            if !joins {
                break;
            }
            self.pos += 1;
        }
        self.src[start..self.pos].iter().collect()
    }

    fn node_shape(&mut self) -> AssistResult<Option<(NodeShape, String)>> {
        let Some(&(_, close, shape)) = SHAPES.iter().find(|(open, _, _)| self.consume_str(open)) else {
            return Ok(None);
        };

        let label = self.label_until(close)?;
        Ok(Some((shape, label)))
    }

    /// Skip a `:::className` styling suffix
    fn class_suffix(&mut self) {
        if self.consume_str(":::") {
            while !self.eof() && (is_id_char(self.ch()) || self.ch() == '-') {
                self.pos += 1;
            }
        }
    }

    /// Label text up to `close`; brackets nested inside it are kept.
    fn label_until(&mut self, close: &str) -> AssistResult<String> {
        self.skip_ws();
        let label = if self.ch() == '"' {
            let quoted = self.quoted()?;
            self.skip_ws();
            quoted
        } else {
            let start = self.pos;
            let mut depth = 0usize;
            while !self.eof() && !(depth == 0 && self.peek_str(close)) {
                match self.ch() {
                    '(' | '[' | '{' => depth += 1,
                    ')' | ']' | '}' => depth = depth.saturating_sub(1),
                    _ => {}
                }
                self.pos += 1;
            }
            let raw: String = self.src[start..self.pos].iter().collect();
            raw.trim().trim_matches(|c: char| c == '/' || c == '\\').trim().to_string()
        };

        if !self.consume_str(close) {
            return Err(AssistError::diagram(self.line, format!("missing closing '{}'", close)));
        }
        Ok(label)
    }

    fn quoted(&mut self) -> AssistResult<String> {
        self.pos += 1;
        let mut buf = String::new();
        while !self.eof() && self.ch() != '"' {
            buf.push(self.ch());
            self.pos += 1;
        }
        if self.eof() {
            return Err(AssistError::diagram(self.line, "unterminated quoted label"));
        }
        self.pos += 1;
        Ok(buf)
    }

    /// Parse a link at the cursor. Leaves the cursor untouched when there is none.
    fn link(&mut self) -> AssistResult<Option<Link>> {
        let start = self.pos;
        let parsed = match self.ch() {
            '-' => self.dash_link()?,
            '=' => self.thick_link()?,
            _ => None,
        };

        let Some(mut link) = parsed else {
            self.pos = start;
            return Ok(None);
        };
        if link.label.is_none() {
            link.label = self.edge_label()?;
        }
        Ok(Some(link))
    }

    /// `-->`, `---`, `---->`, `-- text -->`, `-.->`, `-.-`, `-. text .->`
    fn dash_link(&mut self) -> AssistResult<Option<Link>> {
        let dashes = self.run_of('-');

        if self.ch() == '.' {
            let inline = dashes == 1 && self.src.get(self.pos + 1).is_some_and(|c| c.is_whitespace());
            let label = if inline {
                self.pos += 1;
                let text = self.inline_text(".-")?;
                self.run_of('.');
                text
            } else {
                self.run_of('.');
                None
            };
            if !self.consume_str("-") {
                return Ok(None);
            }
            let arrow = self.consume_str(">");
            return Ok(Some(Link::new(EdgeStyle::Dotted, arrow, label)));
        }

        if dashes >= 2 && self.consume_str(">") {
            return Ok(Some(Link::new(EdgeStyle::Solid, true, None)));
        }
        if dashes >= 3 {
            return Ok(Some(Link::new(EdgeStyle::Solid, false, None)));
        }
        if dashes == 2 && self.ch().is_whitespace() {
            let label = self.inline_text("--")?;
            let closing = self.run_of('-');
            let arrow = self.consume_str(">");
            if !arrow && closing < 3 {
                return Ok(None);
            }
            return Ok(Some(Link::new(EdgeStyle::Solid, arrow, label)));
        }
        Ok(None)
    }

    /// `==>`, `===`, `== text ==>`
    fn thick_link(&mut self) -> AssistResult<Option<Link>> {
        let equals = self.run_of('=');

        if equals >= 2 && self.consume_str(">") {
            return Ok(Some(Link::new(EdgeStyle::Thick, true, None)));
        }
        if equals >= 3 {
            return Ok(Some(Link::new(EdgeStyle::Thick, false, None)));
        }
        if equals == 2 && self.ch().is_whitespace() {
            let label = self.inline_text("==")?;
            let closing = self.run_of('=');
            let arrow = self.consume_str(">");
            if !arrow && closing < 3 {
                return Ok(None);
            }
            return Ok(Some(Link::new(EdgeStyle::Thick, arrow, label)));
        }
        Ok(None)
    }

    /// Text of an inline edge label, up to (not including) `close`
    fn inline_text(&mut self, close: &str) -> AssistResult<Option<String>> {
        let start = self.pos;
        while !self.eof() && !self.peek_str(close) {
            self.pos += 1;
        }
        if self.eof() {
            return Err(AssistError::diagram(self.line, "unterminated edge text"));
        }
        let text: String = self.src[start..self.pos].iter().collect();
        let text = text.trim();
        Ok((!text.is_empty()).then(|| text.to_string()))
    }

    fn edge_label(&mut self) -> AssistResult<Option<String>> {
        self.skip_ws();
        if !self.consume_str("|") {
            return Ok(None);
        }
        let start = self.pos;
        while !self.eof() && self.ch() != '|' {
            self.pos += 1;
        }
        if self.eof() {
            return Err(AssistError::diagram(self.line, "unterminated edge label"));
        }
        let label: String = self.src[start..self.pos].iter().collect();
        self.pos += 1;
        Ok(Some(label.trim().to_string()))
    }
}

fn is_id_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line_definition() {
        let chart = parse("graph TD; A-->B").unwrap();
        assert_eq!(chart.direction, Direction::TopDown);
        assert_eq!(chart.nodes.len(), 2);
        assert_eq!(chart.edges, vec![FlowEdge {
            from: 0,
            to: 1,
            label: None,
            style: EdgeStyle::Solid,
            arrow: true,
        }]);
    }

    #[test]
    fn test_shapes_and_labels() {
        let chart = parse(
            "flowchart LR\n\
             start((Start)) --> check{\"a > 0?\"}\n\
             check -->|yes| out[print b]\n\
             check -.->|no| done(Done)",
        )
        .unwrap();

        assert_eq!(chart.direction, Direction::LeftRight);
        let labels: Vec<_> = chart.nodes.iter().map(|n| (n.label.as_str(), n.shape)).collect();
        assert_eq!(labels, vec![
            ("Start", NodeShape::Circle),
            ("a > 0?", NodeShape::Diamond),
            ("print b", NodeShape::Rectangle),
            ("Done", NodeShape::Rounded),
        ]);
        assert_eq!(chart.edges[1].label.as_deref(), Some("yes"));
        assert_eq!(chart.edges[2].style, EdgeStyle::Dotted);
    }

    #[test]
    fn test_chained_edges() {
        let chart = parse("graph TD\nA --> B ==> C --- D").unwrap();
        assert_eq!(chart.edges.len(), 3);
        assert_eq!(chart.edges[1].style, EdgeStyle::Thick);
        assert!(!chart.edges[2].arrow);
    }

    #[test]
    fn test_later_definition_replaces_bare_reference() {
        let chart = parse("graph TD\nA --> B\nB[Second]\nB[Ignored]").unwrap();
        assert_eq!(chart.nodes.len(), 2);
        assert_eq!(chart.nodes[1].label, "Second");
    }

    #[test]
    fn test_comments_and_ignored_lines() {
        let chart = parse(
            "graph TD\n%% generated\nsubgraph main\nA --> B %% trailing\nend\nstyle A fill:#f9f",
        )
        .unwrap();
        assert_eq!(chart.nodes.len(), 2);
        assert_eq!(chart.edges.len(), 1);
    }

    #[test]
    fn test_semicolon_inside_label_is_kept() {
        let chart = parse("graph TD; A[\"x = 1; y = 2\"] --> B").unwrap();
        assert_eq!(chart.nodes[0].label, "x = 1; y = 2");
    }

    fn ids(chart: &Flowchart) -> Vec<&str> {
        chart.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    fn pairs(chart: &Flowchart) -> Vec<(&str, &str)> {
        chart
            .edges
            .iter()
            .map(|e| (chart.nodes[e.from].id.as_str(), chart.nodes[e.to].id.as_str()))
            .collect()
    }

    #[test]
    fn test_hyphenated_ids() {
        let chart = parse("graph TD\nnode-1 --> node-2\nnode-2-->end-3").unwrap();
        assert_eq!(ids(&chart), vec!["node-1", "node-2", "end-3"]);
        assert_eq!(pairs(&chart), vec![("node-1", "node-2"), ("node-2", "end-3")]);

        let chart = parse("graph TD\nA---B\nB-.->C").unwrap();
        assert_eq!(ids(&chart), vec!["A", "B", "C"]);
        assert!(!chart.edges[0].arrow);
        assert_eq!(chart.edges[1].style, EdgeStyle::Dotted);
    }

    #[test]
    fn test_inline_edge_text() {
        let chart = parse("graph TD\nA -- yes --> B\nB -. retry .-> A\nB == done ==> C").unwrap();
        let labels: Vec<_> = chart.edges.iter().map(|e| (e.label.as_deref(), e.style, e.arrow)).collect();
        assert_eq!(labels, vec![
            (Some("yes"), EdgeStyle::Solid, true),
            (Some("retry"), EdgeStyle::Dotted, true),
            (Some("done"), EdgeStyle::Thick, true),
        ]);
    }

    #[test]
    fn test_long_links() {
        let chart = parse("graph LR\nA ----> B\nB ----- C\nC ===> D").unwrap();
        assert_eq!(chart.edges.len(), 3);
        assert!(chart.edges[0].arrow);
        assert!(!chart.edges[1].arrow);
        assert_eq!(chart.edges[2].style, EdgeStyle::Thick);
    }

    #[test]
    fn test_ampersand_fans_out() {
        let chart = parse("graph TD\nA --> B & C\nB & C --> D").unwrap();
        assert_eq!(pairs(&chart), vec![("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")]);
    }

    #[test]
    fn test_class_suffix_is_ignored() {
        let chart = parse("graph TD\nA[Start]:::start --> B:::plain-node").unwrap();
        assert_eq!(ids(&chart), vec!["A", "B"]);
        assert_eq!(chart.nodes[0].label, "Start");
    }

    #[test]
    fn test_extra_shapes() {
        let chart = parse("graph TD\nA{{hex}} --> B([stadium])\nB --> C[(db)] --> D[[sub]] --> E>flag]").unwrap();
        let shapes: Vec<_> = chart.nodes.iter().map(|n| (n.label.as_str(), n.shape)).collect();
        assert_eq!(shapes, vec![
            ("hex", NodeShape::Hexagon),
            ("stadium", NodeShape::Rounded),
            ("db", NodeShape::Rounded),
            ("sub", NodeShape::Rectangle),
            ("flag", NodeShape::Rectangle),
        ]);
    }

    #[test]
    fn test_brackets_inside_label() {
        let chart = parse("graph TD\nA(print(b)) --> B[items[0]]").unwrap();
        assert_eq!(chart.nodes[0].label, "print(b)");
        assert_eq!(chart.nodes[1].label, "items[0]");
    }

    #[test]
    fn test_percent_inside_quotes_is_not_a_comment() {
        let chart = parse("graph TD\nA[\"50%% done\"] --> B %% real comment").unwrap();
        assert_eq!(chart.nodes[0].label, "50%% done");
        assert_eq!(chart.edges.len(), 1);
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        assert_eq!(
            parse("sequenceDiagram\nA->>B: hi").unwrap_err(),
            AssistError::diagram(1, "expected 'graph' or 'flowchart', found 'sequenceDiagram'")
        );
        assert!(matches!(parse("graph TD\nA ~> B").unwrap_err(), AssistError::Diagram { line: 2, .. }));
        assert!(matches!(parse("graph TD\nA[open").unwrap_err(), AssistError::Diagram { line: 2, .. }));
        assert!(matches!(parse("graph XY").unwrap_err(), AssistError::Diagram { line: 1, .. }));
        assert!(parse("  \n").is_err());
    }
}
