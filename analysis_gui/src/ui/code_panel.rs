//! Code Panel (Left Side)
//!
//! Multi-line editor for the source text (Python highlighting) plus the
//! Run Analysis trigger. The trigger is disabled while a request is outstanding.

use iced::highlighter;
use iced::widget::{button, column, container, text, text_editor, Space};
use iced::{Color, Element, Font, Length, Padding};

use crate::Message;

/// Syntax the editor highlights; the service analyzes Python
const EDITOR_SYNTAX: &str = "py";

/// Render the code pane
///
/// The `ratio` parameter is this pane's share of the window width.
pub fn view_code_panel<'a>(
    code: &'a text_editor::Content,
    in_flight: bool,
    ratio: f32,
) -> Element<'a, Message> {
    let editor = text_editor(code)
        .placeholder("Type some code to analyze...")
        .on_action(Message::CodeEdited)
        .font(Font::MONOSPACE)
        .size(13)
        .height(Length::Fill)
        .highlight(EDITOR_SYNTAX, highlighter::Theme::Base16Ocean);

    let run_label = if in_flight { "Analyzing..." } else { "Run Analysis" };
    let run_button = button(text(run_label).size(13))
        .on_press_maybe((!in_flight).then_some(Message::RunAnalysis))
        .padding(Padding::from([10, 14]))
        .width(Length::Fill)
        .style(button::primary);

    let panel = column![
        text("Code").size(16).color(Color::from_rgb8(0x9a, 0xd0, 0xff)),
        Space::new().height(8),
        editor,
        Space::new().height(12),
        run_button,
    ];

    // Convert ratio to fill portion (scale to 0-100 for better precision)
    let portion = (ratio * 100.0) as u16;

    container(panel)
        .width(Length::FillPortion(portion))
        .height(Length::Fill)
        .style(container::bordered_box)
        .padding(16)
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editor_highlights_python() {
        assert_eq!(EDITOR_SYNTAX, "py");
    }

    #[test]
    fn test_panel_builds_idle_and_in_flight() {
        let code = text_editor::Content::with_text("a = 5\nprint(a)");
        let _idle = view_code_panel(&code, false, 0.36);
        let _busy = view_code_panel(&code, true, 0.36);
    }
}
