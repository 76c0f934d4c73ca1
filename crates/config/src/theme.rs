//! Widget theme with defaulting and partial merge.
//!
//! The dashboard persists a sparse theme object; the widget always works
//! with a fully-populated [`Theme`]. Hot updates from the embedding page
//! arrive as a [`ThemeUpdate`] and are merged without remounting.

use serde::{Deserialize, Serialize};

/// Icon shown on the launcher button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ButtonIcon {
    #[default]
    MessageSquare,
    Bot,
    Mail,
    Sparkles,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gradient {
    pub from: String,
    pub to: String,
}

/// Fully-populated theme. Every field has a value after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub primary_color: String,
    pub background_color: String,
    pub header_color: String,
    pub message_color: String,
    pub input_color: String,
    pub bot_message_color: String,
    pub user_message_color: String,
    pub bot_text_color: String,
    pub user_text_color: String,
    pub header_text_color: String,
    pub font_family: String,
    pub border_radius: String,
    pub show_message_icons: bool,
    pub button_icon: ButtonIcon,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradient: Option<Gradient>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_icon: Option<String>,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_color: "#a7e154".into(),
            background_color: "#1a1a1a".into(),
            header_color: "#232323".into(),
            message_color: "#232323".into(),
            // Input falls back to the background color.
            input_color: "#1a1a1a".into(),
            bot_message_color: "#232323".into(),
            user_message_color: "#a7e154".into(),
            bot_text_color: "#f3f4f6".into(),
            user_text_color: "#111111".into(),
            header_text_color: "#ffffff".into(),
            font_family: "system-ui".into(),
            border_radius: "0.5rem".into(),
            show_message_icons: true,
            button_icon: ButtonIcon::MessageSquare,
            gradient: None,
            bot_icon: None,
            user_icon: None,
        }
    }
}

impl Theme {
    /// Merge a partial update over this theme. Absent fields keep their
    /// current value; this is the hot-update path and never remounts.
    pub fn merge(&mut self, update: &ThemeUpdate) {
        macro_rules! take {
            ($field:ident) => {
                if let Some(value) = &update.$field {
                    self.$field = value.clone();
                }
            };
        }
        take!(primary_color);
        take!(background_color);
        take!(header_color);
        take!(message_color);
        take!(input_color);
        take!(bot_message_color);
        take!(user_message_color);
        take!(bot_text_color);
        take!(user_text_color);
        take!(header_text_color);
        take!(font_family);
        take!(border_radius);
        if let Some(value) = update.show_message_icons {
            self.show_message_icons = value;
        }
        if let Some(value) = update.button_icon {
            self.button_icon = value;
        }
        if let Some(value) = &update.gradient {
            self.gradient = Some(value.clone());
        }
        if let Some(value) = &update.bot_icon {
            self.bot_icon = Some(value.clone());
        }
        if let Some(value) = &update.user_icon {
            self.user_icon = Some(value.clone());
        }
    }

    /// Apply a sparse persisted theme over the defaults.
    pub fn from_update(update: &ThemeUpdate) -> Self {
        let mut theme = Theme::default();
        theme.merge(update);
        theme
    }

    /// Leading font name from the `font-family` string, quotes stripped.
    pub fn font_name(&self) -> String {
        self.font_family
            .replace(['\'', '"'], "")
            .split(',')
            .next()
            .unwrap_or_default()
            .trim()
            .to_string()
    }
}

/// Partial theme, as persisted by the dashboard or pushed by the embedding
/// page. All fields optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeUpdate {
    pub primary_color: Option<String>,
    pub background_color: Option<String>,
    pub header_color: Option<String>,
    pub message_color: Option<String>,
    pub input_color: Option<String>,
    pub bot_message_color: Option<String>,
    pub user_message_color: Option<String>,
    pub bot_text_color: Option<String>,
    pub user_text_color: Option<String>,
    pub header_text_color: Option<String>,
    pub font_family: Option<String>,
    pub border_radius: Option<String>,
    pub show_message_icons: Option<bool>,
    pub button_icon: Option<ButtonIcon>,
    pub gradient: Option<Gradient>,
    pub bot_icon: Option<String>,
    pub user_icon: Option<String>,
}
