//! # analysis_core - Code Analysis Client Engine
//!
//! `analysis_core` holds everything behind the CodeAssistX front-ends that is
//! not drawing pixels: the code being edited, the request to the remote
//! analysis service, the stored result and the four views derived from it.
//!
//! ## Design Philosophy
//!
//! - **Front-end agnostic**: the GUI and CLI render the same [`session::TabContent`]
//! - **Injected collaborators**: the network and the diagram renderer sit behind traits
//! - **One error payload**: every request failure collapses into a displayable string
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use analysis_core::{ClientConfig, HttpTransport, Session};
//!
//! # async fn run() -> analysis_core::AssistResult<()> {
//! let transport = HttpTransport::new(&ClientConfig::default())?;
//! let mut session = Session::default();
//! session.set_source("print(1 + 1)");
//! session.submit(&transport).await;
//! println!("{:?}", session.current_content());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`session`] - View state, submit/complete lifecycle, per-tab content
//! - [`analysis`] - Request and result payloads
//! - [`transport`] - Transport trait and the reqwest implementation
//! - [`diagram`] - Renderer trait, flowchart parser and layout
//! - [`config`] - Endpoint and timeout settings
//! - [`errors`] - Structured error types

pub mod analysis;
pub mod config;
pub mod diagram;
pub mod errors;
pub mod session;
pub mod transport;

// Re-export commonly used types at crate root for convenience
pub use analysis::{AnalysisReport, AnalysisResult, AnalyzeRequest};
pub use config::ClientConfig;
pub use diagram::{DiagramConfig, DiagramHost, DiagramRenderer, FlowchartRenderer, RenderedDiagram};
pub use errors::{AssistError, AssistResult};
pub use session::{Completion, Session, Tab, TabContent};
pub use transport::{AnalysisTransport, HttpTransport};
