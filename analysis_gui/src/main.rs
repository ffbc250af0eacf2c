//! # CodeAssistX GUI Application
//!
//! Type code, send it to the analysis service, browse the flowchart, AST,
//! execution trace and explanation it returns.
//! Built with Iced; all state and request logic lives in `analysis_core`.

mod ui;

use std::sync::Arc;

use iced::widget::{column, container, row, text_editor, Space};
use iced::{Element, Length, Task, Theme};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use analysis_core::config::ClientConfig;
use analysis_core::session::{Completion, Session, Tab};
use analysis_core::transport::{AnalysisTransport, HttpTransport};
use analysis_core::AssistResult;

/// Share of the window width given to the code pane
const CODE_PANEL_RATIO: f32 = 0.36;

#[derive(Debug, Clone)]
pub enum Message {
    CodeEdited(text_editor::Action),
    RunAnalysis,
    AnalysisFinished(u64, AssistResult<Value>),
    SelectTab(Tab),
}

pub struct App {
    session: Session,
    code: text_editor::Content,
    transport: Arc<dyn AnalysisTransport>,
    last_success: Option<bool>,
}

impl App {
    fn new(transport: Arc<dyn AnalysisTransport>) -> Self {
        let session = Session::default();
        let code = text_editor::Content::with_text(session.source());

        App {
            session,
            code,
            transport,
            last_success: None,
        }
    }

    fn title(&self) -> String {
        if self.session.is_in_flight() {
            "CodeAssistX - analyzing...".to_string()
        } else {
            "CodeAssistX".to_string()
        }
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::CodeEdited(action) => {
                let is_edit = action.is_edit();
                self.code.perform(action);
                if is_edit {
                    self.session.set_source(self.code.text());
                }
                Task::none()
            }
            Message::RunAnalysis => {
                let Some(submission) = self.session.begin_submit() else {
                    return Task::none();
                };

                let transport = Arc::clone(&self.transport);
                let seq = submission.seq;
                Task::perform(
                    async move { transport.analyze(&submission.request).await },
                    move |outcome| Message::AnalysisFinished(seq, outcome),
                )
            }
            Message::AnalysisFinished(seq, outcome) => {
                // The session renders the diagram as soon as the result is stored;
                // the next view pass reads it straight from there.
                if let Completion::Stored { success } = self.session.complete(seq, outcome) {
                    self.last_success = Some(success);
                }
                Task::none()
            }
            Message::SelectTab(tab) => {
                self.session.select_tab(tab);
                Task::none()
            }
        }
    }

    fn view(&self) -> Element<'_, Message> {
        let header = ui::header::view_header();

        let panels = row![
            ui::code_panel::view_code_panel(&self.code, self.session.is_in_flight(), CODE_PANEL_RATIO),
            Space::new().width(20),
            ui::results_panel::view_results_panel(&self.session, CODE_PANEL_RATIO),
        ]
        .height(Length::Fill);

        let last_run = self.session.completed_at().zip(self.last_success);
        let status_bar = ui::status_bar::view_status_bar(
            self.transport.endpoint(),
            self.session.is_in_flight(),
            last_run,
        );

        container(column![header, panels, status_bar])
            .width(Length::Fill)
            .height(Length::Fill)
            .padding(iced::Padding::from([0, 24]))
            .into()
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Transport for the hosted service; the GUI always runs on the default config
fn hosted_transport() -> AssistResult<HttpTransport> {
    HttpTransport::new(&ClientConfig::default())
}

fn main() -> iced::Result {
    init_tracing();

    let transport: Arc<dyn AnalysisTransport> = match hosted_transport() {
        Ok(transport) => Arc::new(transport),
        Err(e) => {
            tracing::error!(error = %e, "cannot start: bad client configuration");
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };
    tracing::info!(endpoint = %transport.endpoint(), "starting CodeAssistX");

    iced::application(move || App::new(Arc::clone(&transport)), App::update, App::view)
        .title(App::title)
        .theme(App::theme)
        .window_size(iced::Size::new(1280.0, 800.0))
        .run()
}
