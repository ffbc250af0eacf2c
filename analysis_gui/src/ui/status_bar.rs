//! Status Bar (Bottom)
//!
//! Displays:
//! - Analysis endpoint
//! - Request state (ready / analyzing / outcome of the last run)

use chrono::{DateTime, Local};
use iced::widget::{row, text, Space};
use iced::{Element, Length, Padding};

use crate::Message;

/// Render the status bar
pub fn view_status_bar<'a>(
    endpoint: &'a str,
    in_flight: bool,
    last_run: Option<(DateTime<Local>, bool)>,
) -> Element<'a, Message> {
    let status = if in_flight {
        "Analyzing...".to_string()
    } else {
        match last_run {
            Some((at, true)) => format!("Last run {} - ok", at.format("%H:%M:%S")),
            Some((at, false)) => format!("Last run {} - failed", at.format("%H:%M:%S")),
            None => "Ready".to_string(),
        }
    };

    row![
        text(endpoint).size(10).color([0.55, 0.65, 0.8]),
        Space::new().width(Length::Fill),
        text(status).size(10),
    ]
    .padding(Padding::from([4, 16]))
    .into()
}
