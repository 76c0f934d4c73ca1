//! Widget bootstrap.
//!
//! The six-step mount sequence: capability check, credential resolution,
//! configuration fetch, asset injection, container mount, driver start.
//! [`init`] returns a [`WidgetHandle`] whose `cleanup` reverses every
//! injection and is safe to call any number of times; [`init_logged`] is
//! the host-facing boundary that logs failures instead of propagating
//! them into the page.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use leadflow_config::{normalize, Settings, Theme, ThemeUpdate};
use leadflow_core::{FlowStore, PageContext};
use leadflow_persistence::{LocationEnricher, SupabaseClient, TenantConfigClient};

use crate::assets::{self, CONTAINER_ID, WIDGET_STYLE_KEY};
use crate::error::InitError;
use crate::host::{Capability, HostPage};
use crate::instance::{Command, WidgetInstance};

/// Shown instead of the conversation when the tenant's flow is missing or
/// unusable. Terminal for the session.
pub const INVALID_CONFIG_MESSAGE: &str =
    "Chat configuration is incomplete. Please contact the site owner.";

/// Options read from the embedding page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitOptions {
    #[serde(default)]
    pub chatbot_id: String,
    /// Direct credentials; when absent they are fetched from the tenant
    /// config endpoint.
    #[serde(default)]
    pub supabase_url: Option<String>,
    #[serde(default)]
    pub supabase_key: Option<String>,
    /// Page-supplied theme overrides, applied after the persisted theme.
    #[serde(default)]
    pub theme: Option<ThemeUpdate>,
    #[serde(default)]
    pub page_context: Option<PageContext>,
}

/// A mounted widget. Dropping the handle does not unmount; call
/// [`WidgetHandle::cleanup`].
pub struct WidgetHandle {
    host: Arc<dyn HostPage>,
    instance: Option<WidgetInstance>,
    notice: Option<&'static str>,
    initial_fonts: Vec<String>,
    cleaned: AtomicBool,
}

impl std::fmt::Debug for WidgetHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetHandle")
            .field("notice", &self.notice)
            .field("initial_fonts", &self.initial_fonts)
            .field("cleaned", &self.cleaned)
            .finish_non_exhaustive()
    }
}

impl WidgetHandle {
    /// Live instance, absent when the widget mounted in notice mode.
    pub fn instance(&self) -> Option<&WidgetInstance> {
        self.instance.as_ref()
    }

    /// Fixed message shown instead of the conversation, if any.
    pub fn notice(&self) -> Option<&'static str> {
        self.notice
    }

    /// Unmount and remove every injected node. Idempotent.
    pub fn cleanup(&self) {
        if self.cleaned.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(instance) = &self.instance {
            instance.shutdown();
            for url in instance.state().fonts.read().iter() {
                self.host.remove_font_link(url);
            }
        }
        for url in &self.initial_fonts {
            self.host.remove_font_link(url);
        }
        self.host.remove_style(WIDGET_STYLE_KEY);
        self.host.remove_container(CONTAINER_ID);
        tracing::debug!("widget unmounted");
    }
}

/// Initialize and mount the widget.
pub async fn init(
    options: InitOptions,
    host: Arc<dyn HostPage>,
    settings: &Settings,
) -> Result<WidgetHandle, InitError> {
    let missing: Vec<Capability> = Capability::ALL
        .into_iter()
        .filter(|c| !host.capabilities().contains(c))
        .collect();
    if !missing.is_empty() {
        return Err(InitError::MissingDependencies { missing });
    }

    if options.chatbot_id.trim().is_empty() {
        return Err(InitError::MissingChatbotId);
    }
    let chatbot_id = options.chatbot_id.trim().to_string();

    let (supabase_url, supabase_key) = match (&options.supabase_url, &options.supabase_key) {
        (Some(url), key) => (url.clone(), key.clone().unwrap_or_default()),
        _ => {
            let client = TenantConfigClient::new(
                &settings.config_endpoint,
                Duration::from_secs(settings.credentials_cache_seconds),
            );
            let credentials = client.credentials(&chatbot_id).await?;
            (
                credentials.supabase_url,
                credentials.supabase_key.unwrap_or_default(),
            )
        }
    };

    let store = Arc::new(SupabaseClient::new(&supabase_url, &supabase_key)?);

    let config_row = store
        .fetch_widget_config(&chatbot_id)
        .await
        .map_err(leadflow_core::StoreError::from)?
        .ok_or(InitError::MissingWidgetConfig)?;

    // Persisted theme first, page overrides on top.
    let mut theme_update = config_row.theme.unwrap_or_default();
    if let Some(overrides) = &options.theme {
        let mut merged = Theme::from_update(&theme_update);
        merged.merge(overrides);
        theme_update = to_update(&merged);
    }

    let flow = store.latest_flow(&chatbot_id).await?;
    let config = flow
        .map(|f| normalize(f.data, Some(&theme_update)))
        .transpose();

    let (config, notice) = match config {
        Ok(Some(config)) => (Some(config), None),
        Ok(None) => {
            tracing::error!(%chatbot_id, "no published flow for chatbot");
            (None, Some(INVALID_CONFIG_MESSAGE))
        }
        Err(err) => {
            tracing::error!(%chatbot_id, error = %err, "unusable flow configuration");
            (None, Some(INVALID_CONFIG_MESSAGE))
        }
    };

    let theme = config
        .as_ref()
        .map(|c| c.theme.clone())
        .unwrap_or_else(|| Theme::from_update(&theme_update));

    host.set_style(WIDGET_STYLE_KEY, &assets::widget_css(&theme));
    let mut initial_fonts = Vec::new();
    if let Some(url) = assets::font_link(&theme.font_name()) {
        host.add_font_link(url);
        initial_fonts.push(url.to_string());
    }
    host.create_container(CONTAINER_ID);

    let instance = config.map(|config| {
        let location = Arc::new(LocationEnricher::new(settings.geo.clone()));
        let instance = WidgetInstance::spawn(
            &chatbot_id,
            config,
            settings.typing.clone(),
            store.clone(),
            location,
            host.clone(),
        );
        if let Some(context) = options.page_context.clone() {
            instance.send(Command::SetPageContext(context));
        }
        instance
    });

    tracing::info!(%chatbot_id, notice = notice.is_some(), "widget mounted");
    Ok(WidgetHandle {
        host,
        instance,
        notice,
        initial_fonts,
        cleaned: AtomicBool::new(false),
    })
}

/// Boundary wrapper for embedding environments: failures are logged,
/// never thrown into the host page.
pub async fn init_logged(
    options: InitOptions,
    host: Arc<dyn HostPage>,
    settings: &Settings,
) -> Option<WidgetHandle> {
    match init(options, host, settings).await {
        Ok(handle) => Some(handle),
        Err(err) => {
            tracing::error!(error = %err, "widget initialization failed");
            None
        }
    }
}

/// Flatten a full theme back into the sparse update shape.
fn to_update(theme: &Theme) -> ThemeUpdate {
    ThemeUpdate {
        primary_color: Some(theme.primary_color.clone()),
        background_color: Some(theme.background_color.clone()),
        header_color: Some(theme.header_color.clone()),
        message_color: Some(theme.message_color.clone()),
        input_color: Some(theme.input_color.clone()),
        bot_message_color: Some(theme.bot_message_color.clone()),
        user_message_color: Some(theme.user_message_color.clone()),
        bot_text_color: Some(theme.bot_text_color.clone()),
        user_text_color: Some(theme.user_text_color.clone()),
        header_text_color: Some(theme.header_text_color.clone()),
        font_family: Some(theme.font_family.clone()),
        border_radius: Some(theme.border_radius.clone()),
        show_message_icons: Some(theme.show_message_icons),
        button_icon: Some(theme.button_icon),
        gradient: theme.gradient.clone(),
        bot_icon: theme.bot_icon.clone(),
        user_icon: theme.user_icon.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::host::MemoryHost;

    async fn backend(with_flow: bool) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/chatbot_configs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
                "chatbot_id": "cb-1",
                "theme": {"primaryColor": "#ff0000", "fontFamily": "'Inter', sans-serif"}
            }])))
            .mount(&server)
            .await;
        let flows = if with_flow {
            serde_json::json!([{
                "id": "f1",
                "chatbot_id": "cb-1",
                "data": {
                    "welcomeMessage": "Hi",
                    "endMessage": "Bye",
                    "showEndScreen": false,
                    "options": [{"id": "o1", "label": "Chat", "flow": []}]
                },
                "created_at": "2025-05-01T12:00:00Z"
            }])
        } else {
            serde_json::json!([])
        };
        Mock::given(method("GET"))
            .and(path("/rest/v1/flows"))
            .respond_with(ResponseTemplate::new(200).set_body_json(flows))
            .mount(&server)
            .await;
        server
    }

    fn options(server: &MockServer) -> InitOptions {
        InitOptions {
            chatbot_id: "cb-1".into(),
            supabase_url: Some(server.uri()),
            supabase_key: Some("anon".into()),
            theme: None,
            page_context: None,
        }
    }

    #[tokio::test]
    async fn init_mounts_and_cleanup_is_idempotent() {
        let server = backend(true).await;
        let host = Arc::new(MemoryHost::new());
        let handle = init(options(&server), host.clone(), &Settings::default())
            .await
            .unwrap();

        assert!(handle.instance().is_some());
        assert!(host.has_container(CONTAINER_ID));
        assert!(host.style(WIDGET_STYLE_KEY).unwrap().contains("#ff0000"));
        assert!(host.has_font_link(assets::font_link("Inter").unwrap()));

        handle.cleanup();
        handle.cleanup();
        assert!(host.is_clean());
    }

    #[tokio::test]
    async fn missing_capabilities_fail_before_network() {
        let host = Arc::new(MemoryHost::without(&[Capability::Network]));
        let err = init(
            InitOptions {
                chatbot_id: "cb-1".into(),
                ..Default::default()
            },
            host,
            &Settings::default(),
        )
        .await
        .unwrap_err();
        match err {
            InitError::MissingDependencies { missing } => {
                assert_eq!(missing, vec![Capability::Network]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_chatbot_id_fails_before_network() {
        let host = Arc::new(MemoryHost::new());
        let err = init(InitOptions::default(), host, &Settings::default())
            .await
            .unwrap_err();
        assert!(matches!(err, InitError::MissingChatbotId));
    }

    #[tokio::test]
    async fn missing_flow_mounts_notice_mode() {
        let server = backend(false).await;
        let host = Arc::new(MemoryHost::new());
        let handle = init(options(&server), host.clone(), &Settings::default())
            .await
            .unwrap();

        assert!(handle.instance().is_none());
        assert_eq!(handle.notice(), Some(INVALID_CONFIG_MESSAGE));
        assert!(host.has_container(CONTAINER_ID));
        handle.cleanup();
        assert!(host.is_clean());
    }

    #[tokio::test]
    async fn missing_widget_config_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/chatbot_configs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let host = Arc::new(MemoryHost::new());
        let err = init(options(&server), host.clone(), &Settings::default())
            .await
            .unwrap_err();
        assert!(matches!(err, InitError::MissingWidgetConfig));
        // Nothing was injected before the failure.
        assert!(host.is_clean());
    }
}
