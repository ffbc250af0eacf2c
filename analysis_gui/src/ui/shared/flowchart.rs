//! Canvas drawing for rendered flowcharts
//!
//! Takes the normalized layout from analysis_core and scales it onto the
//! canvas bounds: edges first, then node shapes, then labels on top.

use iced::widget::canvas::{self, Frame, Geometry, LineDash, Path, Stroke, Text};
use iced::{Color, Point, Rectangle, Renderer, Size, Theme, Vector};

use analysis_core::diagram::{DiagramTheme, EdgeStyle, FlowEdge, NodeShape, RenderedDiagram};

use crate::Message;

const MARGIN: f32 = 24.0;
const NODE_HEIGHT: f32 = 34.0;
const MAX_NODE_WIDTH: f32 = 170.0;
const LABEL_SIZE: f32 = 11.0;
/// Pixels per layer along the flow direction
const LAYER_SPACING: f32 = 90.0;

struct Palette {
    node_fill: Color,
    node_stroke: Color,
    node_text: Color,
    edge: Color,
    back_edge: Color,
    edge_label: Color,
}

impl Palette {
    fn for_theme(theme: DiagramTheme) -> Self {
        match theme {
            DiagramTheme::Dark => Palette {
                node_fill: Color::from_rgb8(0x06, 0x20, 0x3b),
                node_stroke: Color::from_rgb8(0x6e, 0xc0, 0xff),
                node_text: Color::from_rgb8(0xcf, 0xe9, 0xff),
                edge: Color::from_rgb8(0x9f, 0xbb, 0xe6),
                back_edge: Color::from_rgb8(0xe6, 0xa2, 0x5a),
                edge_label: Color::from_rgb8(0xbc, 0xd4, 0xff),
            },
        }
    }
}

/// Canvas height needed to draw `diagram` without crowding
pub fn preferred_height(diagram: &RenderedDiagram) -> f32 {
    let layout = &diagram.layout;
    let slots = if layout.chart.direction.is_horizontal() {
        layout.max_layer_width as f32 * (NODE_HEIGHT + 30.0)
    } else {
        layout.layer_count as f32 * LAYER_SPACING
    };
    (slots + 2.0 * MARGIN).max(200.0)
}

/// Canvas program for drawing a flowchart
pub struct FlowchartDiagram<'a> {
    diagram: &'a RenderedDiagram,
}

impl<'a> FlowchartDiagram<'a> {
    pub fn new(diagram: &'a RenderedDiagram) -> Self {
        Self { diagram }
    }

    /// Node box size for a plot area
    fn node_size(&self, plot: Size) -> Size {
        let layout = &self.diagram.layout;
        let across_slots = if layout.chart.direction.is_horizontal() {
            layout.layer_count
        } else {
            layout.max_layer_width
        }
        .max(1) as f32;

        let width = (plot.width / across_slots * 0.8).min(MAX_NODE_WIDTH).max(40.0);
        Size::new(width, NODE_HEIGHT)
    }

    fn node_center(&self, idx: usize, origin: Point, plot: Size) -> Point {
        let placement = &self.diagram.layout.placements[idx];
        Point::new(origin.x + placement.x * plot.width, origin.y + placement.y * plot.height)
    }

    fn draw_edge(
        &self,
        frame: &mut Frame,
        edge: &FlowEdge,
        is_back: bool,
        from: Point,
        to: Point,
        node: Size,
        palette: &Palette,
    ) {
        let start = clip_to_box(from, to, node);
        let end = clip_to_box(to, from, node);
        let color = if is_back { palette.back_edge } else { palette.edge };

        let width = match edge.style {
            EdgeStyle::Thick => 3.0,
            EdgeStyle::Solid | EdgeStyle::Dotted => 1.5,
        };
        let mut stroke = Stroke::default().with_color(color).with_width(width);
        if edge.style == EdgeStyle::Dotted {
            stroke.line_dash = LineDash {
                segments: &[4.0, 3.0],
                offset: 0,
            };
        }

        let line = if edge.from == edge.to {
            // Self loop: small arc off the right side of the node
            let anchor = Point::new(from.x + node.width / 2.0, from.y);
            Path::new(|builder| {
                builder.move_to(Point::new(anchor.x, anchor.y - 6.0));
                builder.bezier_curve_to(
                    Point::new(anchor.x + 28.0, anchor.y - 22.0),
                    Point::new(anchor.x + 28.0, anchor.y + 22.0),
                    Point::new(anchor.x, anchor.y + 6.0),
                );
            })
        } else {
            Path::line(start, end)
        };
        frame.stroke(&line, stroke);

        if edge.arrow && edge.from != edge.to {
            draw_arrow_head(frame, start, end, color);
        }

        if let Some(label) = &edge.label {
            let mid = Point::new((start.x + end.x) / 2.0, (start.y + end.y) / 2.0);
            frame.fill_text(Text {
                content: label.clone(),
                position: mid + Vector::new(4.0, -4.0),
                color: palette.edge_label,
                size: iced::Pixels(LABEL_SIZE - 1.0),
                ..Text::default()
            });
        }
    }

    fn draw_node(
        &self,
        frame: &mut Frame,
        label: &str,
        shape: NodeShape,
        center: Point,
        size: Size,
        palette: &Palette,
    ) {
        let top_left = Point::new(center.x - size.width / 2.0, center.y - size.height / 2.0);

        let path = match shape {
            NodeShape::Rectangle => Path::rectangle(top_left, size),
            NodeShape::Rounded => Path::rounded_rectangle(top_left, size, (size.height / 2.0).into()),
            NodeShape::Circle => Path::circle(center, size.height * 0.75),
            NodeShape::Diamond => {
                let half_w = size.width / 2.0;
                let half_h = size.height * 0.7;
                Path::new(|builder| {
                    builder.move_to(Point::new(center.x, center.y - half_h));
                    builder.line_to(Point::new(center.x + half_w, center.y));
                    builder.line_to(Point::new(center.x, center.y + half_h));
                    builder.line_to(Point::new(center.x - half_w, center.y));
                    builder.close();
                })
            }
            NodeShape::Hexagon => {
                let half_w = size.width / 2.0;
                let half_h = size.height / 2.0;
                let inset = half_h.min(half_w / 2.0);
                Path::new(|builder| {
                    builder.move_to(Point::new(center.x - half_w + inset, center.y - half_h));
                    builder.line_to(Point::new(center.x + half_w - inset, center.y - half_h));
                    builder.line_to(Point::new(center.x + half_w, center.y));
                    builder.line_to(Point::new(center.x + half_w - inset, center.y + half_h));
                    builder.line_to(Point::new(center.x - half_w + inset, center.y + half_h));
                    builder.line_to(Point::new(center.x - half_w, center.y));
                    builder.close();
                })
            }
        };

        frame.fill(&path, palette.node_fill);
        frame.stroke(&path, Stroke::default().with_color(palette.node_stroke).with_width(1.5));

        let max_chars = match shape {
            NodeShape::Circle => (size.height * 1.4 / 6.5) as usize,
            NodeShape::Diamond => (size.width * 0.6 / 6.5) as usize,
            NodeShape::Hexagon => (size.width * 0.8 / 6.5) as usize,
            NodeShape::Rectangle | NodeShape::Rounded => (size.width / 6.5) as usize,
        };

        frame.fill_text(Text {
            content: truncate(label, max_chars.max(3)),
            position: center,
            color: palette.node_text,
            size: iced::Pixels(LABEL_SIZE),
            align_x: iced::alignment::Horizontal::Center.into(),
            align_y: iced::alignment::Vertical::Center.into(),
            ..Text::default()
        });
    }
}

impl canvas::Program<Message> for FlowchartDiagram<'_> {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: iced::mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());

        let layout = &self.diagram.layout;
        let palette = Palette::for_theme(self.diagram.theme);
        let origin = Point::new(MARGIN, MARGIN);
        let plot = Size::new(
            (bounds.width - 2.0 * MARGIN).max(1.0),
            (bounds.height - 2.0 * MARGIN).max(1.0),
        );
        let node = self.node_size(plot);

        for (edge, &is_back) in layout.chart.edges.iter().zip(&layout.back_edges) {
            let from = self.node_center(edge.from, origin, plot);
            let to = self.node_center(edge.to, origin, plot);
            self.draw_edge(&mut frame, edge, is_back, from, to, node, &palette);
        }

        for (idx, flow_node) in layout.chart.nodes.iter().enumerate() {
            let center = self.node_center(idx, origin, plot);
            self.draw_node(&mut frame, &flow_node.label, flow_node.shape, center, node, &palette);
        }

        vec![frame.into_geometry()]
    }
}

/// Point where the segment from `center` toward `toward` leaves the node box
fn clip_to_box(center: Point, toward: Point, node: Size) -> Point {
    let dx = toward.x - center.x;
    let dy = toward.y - center.y;
    if dx.abs() < f32::EPSILON && dy.abs() < f32::EPSILON {
        return center;
    }

    let half_w = node.width / 2.0 + 2.0;
    let half_h = node.height / 2.0 + 2.0;
    let tx = if dx.abs() > f32::EPSILON { half_w / dx.abs() } else { f32::INFINITY };
    let ty = if dy.abs() > f32::EPSILON { half_h / dy.abs() } else { f32::INFINITY };
    let t = tx.min(ty).min(1.0);

    Point::new(center.x + dx * t, center.y + dy * t)
}

fn draw_arrow_head(frame: &mut Frame, start: Point, end: Point, color: Color) {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let len = (dx * dx + dy * dy).sqrt();
    if len < 1.0 {
        return;
    }
    let (ux, uy) = (dx / len, dy / len);
    let back = Point::new(end.x - ux * 8.0, end.y - uy * 8.0);
    let (px, py) = (-uy * 4.0, ux * 4.0);

    let head = Path::new(|builder| {
        builder.move_to(end);
        builder.line_to(Point::new(back.x + px, back.y + py));
        builder.line_to(Point::new(back.x - px, back.y - py));
        builder.close();
    });
    frame.fill(&head, color);
}

fn truncate(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        label.to_string()
    } else {
        let cut: String = label.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}
