//! UI module for CodeAssistX GUI
//!
//! # Panel Structure
//! - `header` - Product title and subtitle
//! - `code_panel` - Left pane: code editor and Run Analysis trigger
//! - `results_panel` - Right pane: tab selectors and the active tab's content
//! - `status_bar` - Endpoint and request state
//!
//! # Shared Components
//! - `shared/flowchart` - Canvas drawing for the flow tab

pub mod code_panel;
pub mod header;
pub mod results_panel;
pub mod status_bar;

pub mod shared;
