//! Live widget instance: command loop, session driver, proactive timer.
//!
//! One instance owns one [`ChatSession`] and at most one armed proactive
//! timer. All mutation goes through the command channel so transcript
//! ordering is the channel order; observers read the shared snapshots in
//! [`InstanceState`].

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

use leadflow_config::{NormalizedConfig, Theme, ThemeUpdate, TypingSettings};
use leadflow_core::{ChatMessage, LeadSink, LocationLookup, PageContext};
use leadflow_engine::{
    ChatSession, ProactiveScheduler, SchedulerEffect, SchedulerEvent,
};

use crate::assets::{self, WIDGET_STYLE_KEY};
use crate::host::HostPage;

const COMMAND_BUFFER: usize = 64;

/// Instructions accepted by a live instance.
#[derive(Debug)]
pub enum Command {
    Open,
    Close,
    SelectOption(String),
    Answer(String),
    Skip,
    Feedback(bool),
    CloseEndScreen,
    BubbleClicked,
    UpdateTheme(ThemeUpdate),
    SetPageContext(PageContext),
    Shutdown,
}

/// Rendering-facing UI state.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub chat_open: bool,
    /// Proactive bubble text, when one is visible.
    pub bubble: Option<String>,
    /// Inline validation message for the current input, if any.
    pub input_error: Option<String>,
    pub end_screen_visible: bool,
}

/// Shared snapshots the embedding layer reads without touching the driver.
pub struct InstanceState {
    pub theme: RwLock<Theme>,
    pub transcript: RwLock<Vec<ChatMessage>>,
    pub ui: RwLock<UiState>,
    pub page_context: RwLock<Option<PageContext>>,
    /// Font link URLs this instance injected, for cleanup.
    pub fonts: RwLock<std::collections::HashSet<String>>,
}

impl InstanceState {
    fn new(theme: Theme) -> Self {
        Self {
            theme: RwLock::new(theme),
            transcript: RwLock::new(Vec::new()),
            ui: RwLock::new(UiState::default()),
            page_context: RwLock::new(None),
            fonts: RwLock::new(std::collections::HashSet::new()),
        }
    }
}

/// Handle to a mounted widget's driver task.
pub struct WidgetInstance {
    commands: mpsc::Sender<Command>,
    state: Arc<InstanceState>,
    driver: parking_lot::Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl WidgetInstance {
    /// Spawn the driver for a freshly mounted widget.
    pub fn spawn(
        chatbot_id: &str,
        config: NormalizedConfig,
        typing: TypingSettings,
        sink: Arc<dyn LeadSink>,
        location: Arc<dyn LocationLookup>,
        host: Arc<dyn HostPage>,
    ) -> Self {
        let state = Arc::new(InstanceState::new(config.theme.clone()));
        let session = ChatSession::new(chatbot_id, &config, typing, sink, location);
        let scheduler = config.proactive.clone().map(ProactiveScheduler::new);

        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let mut driver = Driver {
            session,
            scheduler,
            deadline: None,
            state: state.clone(),
            host,
        };
        driver.publish();
        let handle = tokio::spawn(async move { driver.run(rx).await });

        Self {
            commands: tx,
            state,
            driver: parking_lot::Mutex::new(Some(handle)),
        }
    }

    pub fn state(&self) -> &Arc<InstanceState> {
        &self.state
    }

    /// Queue a command. Dropped with a warning when the buffer is full or
    /// the driver is gone; callers never block and never panic.
    pub fn send(&self, command: Command) {
        if let Err(err) = self.commands.try_send(command) {
            tracing::warn!(error = %err, "widget command dropped");
        }
    }

    /// Stop the driver. Used by cleanup; idempotent.
    pub fn shutdown(&self) {
        let _ = self.commands.try_send(Command::Shutdown);
        if let Some(handle) = self.driver.lock().take() {
            handle.abort();
        }
    }
}

struct Driver {
    session: ChatSession,
    scheduler: Option<ProactiveScheduler>,
    /// Deadline of the armed proactive timer, if any.
    deadline: Option<Instant>,
    state: Arc<InstanceState>,
    host: Arc<dyn HostPage>,
}

impl Driver {
    async fn run(mut self, mut rx: mpsc::Receiver<Command>) {
        self.scheduler_event(SchedulerEvent::Start);
        self.publish();

        loop {
            let deadline = self.deadline;
            tokio::select! {
                command = rx.recv() => {
                    match command {
                        None | Some(Command::Shutdown) => break,
                        Some(command) => self.handle_command(command).await,
                    }
                }
                _ = async {
                    match deadline {
                        Some(at) => sleep_until(at).await,
                        // Guarded out below; kept total for the compiler.
                        None => std::future::pending().await,
                    }
                }, if deadline.is_some() => {
                    self.deadline = None;
                    self.scheduler_event(SchedulerEvent::TimerFired);
                }
            }
            self.publish();
        }
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Open => {
                self.state.ui.write().chat_open = true;
                self.scheduler_event(SchedulerEvent::ChatOpened);
                self.session.opened().await;
            }
            Command::Close => {
                self.state.ui.write().chat_open = false;
                self.scheduler_event(SchedulerEvent::ChatClosed);
                self.session.closed().await;
            }
            Command::SelectOption(label) => {
                let result = self.session.select_option(&label).await;
                self.record_input_result(result);
            }
            Command::Answer(value) => {
                let result = self.session.answer(&value).await;
                self.record_input_result(result);
            }
            Command::Skip => {
                let result = self.session.skip().await;
                self.record_input_result(result);
            }
            Command::Feedback(satisfied) => {
                self.session.submit_feedback(satisfied).await;
            }
            Command::CloseEndScreen => {
                self.session.close_end_screen().await;
            }
            Command::BubbleClicked => {
                self.scheduler_event(SchedulerEvent::BubbleClicked);
            }
            Command::UpdateTheme(partial) => {
                let css = {
                    let mut theme = self.state.theme.write();
                    theme.merge(&partial);
                    assets::widget_css(&theme)
                };
                self.host.set_style(WIDGET_STYLE_KEY, &css);
                let font = self.state.theme.read().font_name();
                if let Some(url) = assets::font_link(&font) {
                    self.host.add_font_link(url);
                    self.state.fonts.write().insert(url.to_string());
                }
            }
            Command::SetPageContext(context) => {
                *self.state.page_context.write() = Some(context);
            }
            Command::Shutdown => {}
        }
    }

    fn record_input_result(&self, result: Result<(), leadflow_engine::ConversationError>) {
        let mut ui = self.state.ui.write();
        match result {
            Ok(()) => ui.input_error = None,
            Err(err) => {
                tracing::debug!(error = %err, "input rejected");
                ui.input_error = Some(err.to_string());
            }
        }
    }

    fn scheduler_event(&mut self, event: SchedulerEvent) {
        let Some(scheduler) = self.scheduler.as_mut() else {
            return;
        };
        let effects = scheduler.handle(event);
        for effect in effects {
            match effect {
                SchedulerEffect::Arm(wait) => {
                    self.deadline = Some(Instant::now() + wait);
                }
                SchedulerEffect::CancelTimer => {
                    self.deadline = None;
                }
                SchedulerEffect::ShowBubble(message) => {
                    self.state.ui.write().bubble = Some(message);
                }
                SchedulerEffect::HideBubble => {
                    self.state.ui.write().bubble = None;
                }
                SchedulerEffect::AppendToTranscript(message) => {
                    self.session.append_proactive(&message);
                }
                SchedulerEffect::OpenChat => {
                    self.state.ui.write().chat_open = true;
                }
            }
        }
    }

    /// Refresh the shared snapshots after every step.
    fn publish(&self) {
        *self.state.transcript.write() = self.session.transcript().to_vec();
        self.state.ui.write().end_screen_visible = self.session.end_screen_visible();
    }
}
