//! Results Panel (Right Side)
//!
//! Tab selectors on top, then the active tab's content:
//! - Flow -> flowchart canvas (empty until a diagram is rendered)
//! - AST / Trace -> pretty-printed JSON
//! - Explain -> one card per explanation line
//! - Failure -> the error text, whatever the tab

use iced::widget::{button, column, container, row, scrollable, text, Canvas, Column, Row, Space};
use iced::{Color, Element, Font, Length, Padding};

use analysis_core::session::{Session, Tab, TabContent};

use crate::Message;
use super::shared::flowchart::{self, FlowchartDiagram};

const PRE_COLOR: Color = Color::from_rgb(0.62, 0.816, 1.0);

/// Render the results panel for the session's active tab
///
/// The `code_ratio` parameter is the ratio used by the code panel.
/// This panel uses the complementary ratio (1 - code_ratio).
pub fn view_results_panel(session: &Session, code_ratio: f32) -> Element<'_, Message> {
    let tabs = view_tab_bar(session.active_tab());
    let content = view_tab_content(session.current_content());

    let content_box = container(scrollable(content).width(Length::Fill).height(Length::Fill))
        .width(Length::Fill)
        .height(Length::Fill)
        .padding(12)
        .style(|_theme: &iced::Theme| container::Style {
            background: Some(iced::Background::Color(Color::from_rgb8(0x03, 0x10, 0x27))),
            border: iced::Border {
                radius: 8.0.into(),
                ..iced::Border::default()
            },
            ..container::Style::default()
        });

    // Use complementary ratio (scale to 0-100 for better precision)
    let portion = ((1.0 - code_ratio) * 100.0) as u16;

    container(column![tabs, Space::new().height(12), content_box])
        .width(Length::FillPortion(portion))
        .height(Length::Fill)
        .style(container::bordered_box)
        .padding(16)
        .into()
}

fn view_tab_bar(active: Tab) -> Element<'static, Message> {
    let mut buttons: Row<'static, Message> = row![].spacing(8);

    for tab in Tab::ALL {
        let style = if tab == active { button::primary } else { button::secondary };
        buttons = buttons.push(
            button(text(tab.label()).size(12))
                .on_press(Message::SelectTab(tab))
                .padding(Padding::from([8, 14]))
                .style(style),
        );
    }

    buttons.into()
}

fn view_tab_content(content: TabContent<'_>) -> Element<'_, Message> {
    match content {
        TabContent::Diagram(Some(diagram)) => Canvas::new(FlowchartDiagram::new(diagram))
            .width(Length::Fill)
            .height(Length::Fixed(flowchart::preferred_height(diagram)))
            .into(),
        // Empty container awaiting a diagram
        TabContent::Diagram(None) => Space::new().width(Length::Fill).height(1).into(),
        TabContent::Text(body) => text(body).font(Font::MONOSPACE).size(13).color(PRE_COLOR).into(),
        TabContent::Placeholder(body) => text(body).font(Font::MONOSPACE).size(13).color(PRE_COLOR).into(),
        TabContent::Blocks(lines) => view_blocks(lines),
        TabContent::Error(error) => column![
            text("Error").size(14),
            Space::new().height(8),
            text(error).font(Font::MONOSPACE).size(13).color([0.9, 0.4, 0.4]),
        ]
        .into(),
    }
}

/// One card per line, in order
fn view_blocks(lines: Vec<&str>) -> Element<'_, Message> {
    let mut blocks: Column<'_, Message> = column![].spacing(10);

    for line in lines {
        let card = container(text(line).size(13).color(Color::from_rgb8(0xcf, 0xe9, 0xff)))
            .width(Length::Fill)
            .padding(12)
            .style(|_theme: &iced::Theme| container::Style {
                background: Some(iced::Background::Color(Color::from_rgb8(0x06, 0x20, 0x3b))),
                border: iced::Border {
                    radius: 12.0.into(),
                    ..iced::Border::default()
                },
                ..container::Style::default()
            });
        blocks = blocks.push(card);
    }

    blocks.into()
}
