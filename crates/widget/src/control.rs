//! Process-wide control surface.
//!
//! The embedding page talks to the widget through one global object:
//! mount, page-context updates, theme updates, unmount. At most one live
//! instance exists at a time. Calls that arrive before a mount are held
//! in a bounded queue and replayed once the widget is up; beyond the cap
//! the oldest call is dropped. Nothing here panics into the host.

use std::collections::VecDeque;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use leadflow_config::{Settings, ThemeUpdate};
use leadflow_core::PageContext;

use crate::bootstrap::{self, InitOptions, WidgetHandle};
use crate::error::InitError;
use crate::host::HostPage;
use crate::instance::Command;

/// Pre-mount calls kept, oldest dropped beyond this.
const QUEUE_CAP: usize = 32;

static SURFACE: Lazy<ControlSurface> = Lazy::new(ControlSurface::new);

#[derive(Debug)]
enum QueuedCall {
    SetPageContext(PageContext),
    UpdateTheme(ThemeUpdate),
}

#[derive(Default)]
struct SurfaceState {
    handle: Option<Arc<WidgetHandle>>,
    queue: VecDeque<QueuedCall>,
}

/// The singleton the embedding page drives.
pub struct ControlSurface {
    state: Mutex<SurfaceState>,
}

impl ControlSurface {
    fn new() -> Self {
        Self {
            state: Mutex::new(SurfaceState::default()),
        }
    }

    pub fn global() -> &'static ControlSurface {
        &SURFACE
    }

    /// Mount the widget. A second mount while one is live tears the old
    /// one down first, so at most one instance ever exists.
    pub async fn init(
        &self,
        options: InitOptions,
        host: Arc<dyn HostPage>,
        settings: &Settings,
    ) -> Result<(), InitError> {
        if let Some(previous) = self.state.lock().handle.take() {
            tracing::warn!("widget already mounted, replacing");
            previous.cleanup();
        }

        let handle = Arc::new(bootstrap::init(options, host, settings).await?);

        let queued = {
            let mut state = self.state.lock();
            state.handle = Some(handle.clone());
            std::mem::take(&mut state.queue)
        };
        for call in queued {
            Self::forward(&handle, call);
        }
        Ok(())
    }

    /// Logged variant of [`ControlSurface::init`] for the page boundary.
    pub async fn init_logged(
        &self,
        options: InitOptions,
        host: Arc<dyn HostPage>,
        settings: &Settings,
    ) -> bool {
        match self.init(options, host, settings).await {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(error = %err, "widget initialization failed");
                false
            }
        }
    }

    pub fn set_page_context(&self, context: PageContext) {
        self.dispatch(QueuedCall::SetPageContext(context));
    }

    pub fn update_theme(&self, partial: ThemeUpdate) {
        self.dispatch(QueuedCall::UpdateTheme(partial));
    }

    /// Current mounted handle, if any.
    pub fn handle(&self) -> Option<Arc<WidgetHandle>> {
        self.state.lock().handle.clone()
    }

    /// Tear down the live instance, if any. Safe when nothing is mounted.
    pub fn destroy(&self) {
        if let Some(handle) = self.state.lock().handle.take() {
            handle.cleanup();
        }
    }

    fn dispatch(&self, call: QueuedCall) {
        let handle = {
            let mut state = self.state.lock();
            match &state.handle {
                Some(handle) => Some(handle.clone()),
                None => {
                    if state.queue.len() == QUEUE_CAP {
                        state.queue.pop_front();
                        tracing::debug!("pre-mount queue full, dropping oldest call");
                    }
                    state.queue.push_back(call);
                    return;
                }
            }
        };
        if let Some(handle) = handle {
            Self::forward(&handle, call);
        }
    }

    fn forward(handle: &WidgetHandle, call: QueuedCall) {
        let Some(instance) = handle.instance() else {
            // Notice-mode mount: nothing to drive.
            return;
        };
        match call {
            QueuedCall::SetPageContext(context) => {
                instance.send(Command::SetPageContext(context))
            }
            QueuedCall::UpdateTheme(partial) => instance.send(Command::UpdateTheme(partial)),
        }
    }
}
