//! Application header

use iced::widget::{column, container, text};
use iced::{Color, Element, Length};

use crate::Message;

/// Render the centered title block
pub fn view_header() -> Element<'static, Message> {
    let title = column![
        text("CodeAssistX").size(32).color(Color::from_rgb8(0x6e, 0xc0, 0xff)),
        text("AI-Powered Code Analysis & Visualization")
            .size(13)
            .color(Color::from_rgb8(0x9f, 0xbb, 0xe6)),
    ]
    .spacing(4)
    .align_x(iced::alignment::Horizontal::Center);

    container(title)
        .width(Length::Fill)
        .align_x(iced::alignment::Horizontal::Center)
        .padding(16)
        .into()
}
