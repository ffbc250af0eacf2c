//! Shared UI components reusable across panels
//!
//! Contains:
//! - `flowchart` - Canvas drawing for rendered flowcharts

pub mod flowchart;
