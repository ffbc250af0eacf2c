//! # Diagram Rendering
//!
//! The flow tab shows a flowchart built from the result's diagram definition.
//! Rendering goes through the [`DiagramRenderer`] seam so tests can supply a
//! stub; [`DiagramHost`] owns the renderer plus whatever it last produced,
//! and swallows (logs) every rendering failure.
//!
//! - `flowchart` - Mermaid flowchart subset parser
//! - `layout` - Layered node placement

pub mod flowchart;
pub mod layout;

use serde::{Deserialize, Serialize};

use crate::errors::{AssistError, AssistResult};

pub use flowchart::{Direction, EdgeStyle, FlowEdge, FlowNode, Flowchart, NodeShape};
pub use layout::{FlowchartLayout, NodePlacement};

/// Visual theme handed to the renderer. The app only ships a dark look.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramTheme {
    #[default]
    Dark,
}

/// Renderer setup, applied before every render pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramConfig {
    /// Render diagrams found at startup without being asked
    pub start_on_load: bool,
    pub theme: DiagramTheme,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        DiagramConfig {
            start_on_load: false,
            theme: DiagramTheme::Dark,
        }
    }
}

/// Output of one render pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedDiagram {
    /// The raw definition this was rendered from
    pub definition: String,
    pub theme: DiagramTheme,
    pub layout: FlowchartLayout,
}

/// Rendering service used by the flow tab.
pub trait DiagramRenderer: Send {
    fn initialize(&mut self, config: &DiagramConfig) -> AssistResult<()>;

    fn render(&mut self, definition: &str) -> AssistResult<RenderedDiagram>;
}

/// Parses and lays out Mermaid flowcharts.
#[derive(Debug, Default)]
pub struct FlowchartRenderer {
    config: Option<DiagramConfig>,
}

impl FlowchartRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DiagramRenderer for FlowchartRenderer {
    fn initialize(&mut self, config: &DiagramConfig) -> AssistResult<()> {
        self.config = Some(*config);
        Ok(())
    }

    fn render(&mut self, definition: &str) -> AssistResult<RenderedDiagram> {
        let config = self.config.ok_or_else(|| AssistError::Internal {
            message: "diagram renderer used before initialize".to_string(),
        })?;

        let chart = flowchart::parse(definition)?;
        Ok(RenderedDiagram {
            definition: definition.to_string(),
            theme: config.theme,
            layout: layout::layout(chart),
        })
    }
}

/// The flow tab's container: a renderer and its latest output.
pub struct DiagramHost {
    renderer: Box<dyn DiagramRenderer>,
    config: DiagramConfig,
    current: Option<RenderedDiagram>,
}

impl DiagramHost {
    pub fn new(renderer: Box<dyn DiagramRenderer>) -> Self {
        DiagramHost {
            renderer,
            config: DiagramConfig::default(),
            current: None,
        }
    }

    /// Render `definition` into the container.
    ///
    /// Does nothing when there is no definition. Failures are logged and
    /// leave the container empty.
    pub fn render_diagram(&mut self, definition: Option<&str>) {
        let Some(definition) = definition.filter(|text| !text.trim().is_empty()) else {
            return;
        };

        self.current = None;
        let rendered = self
            .renderer
            .initialize(&self.config)
            .and_then(|()| self.renderer.render(definition));

        match rendered {
            Ok(diagram) => {
                tracing::debug!(nodes = diagram.layout.chart.nodes.len(), "diagram rendered");
                self.current = Some(diagram);
            }
            Err(e) => tracing::warn!(error = %e, "diagram render failed"),
        }
    }

    /// Empty the container
    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&RenderedDiagram> {
        self.current.as_ref()
    }
}

impl Default for DiagramHost {
    fn default() -> Self {
        DiagramHost::new(Box::new(FlowchartRenderer::new()))
    }
}

impl std::fmt::Debug for DiagramHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagramHost")
            .field("config", &self.config)
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}
