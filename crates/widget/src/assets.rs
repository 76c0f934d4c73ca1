//! Injected widget assets: the theme stylesheet and the hosted-font
//! catalog.

use leadflow_config::Theme;

/// Key of the widget's injected style node.
pub const WIDGET_STYLE_KEY: &str = "leadflow-widget-style";

/// Container node id the widget mounts into.
pub const CONTAINER_ID: &str = "leadflow-widget-root";

/// Google Fonts URL for a catalog font, `None` for system fonts.
pub fn font_link(font_name: &str) -> Option<&'static str> {
    match font_name {
        "Anta" => Some("https://fonts.googleapis.com/css2?family=Anta&display=swap"),
        "Inter" => {
            Some("https://fonts.googleapis.com/css2?family=Inter:wght@400;500;600&display=swap")
        }
        "Roboto" => {
            Some("https://fonts.googleapis.com/css2?family=Roboto:wght@400;500;700&display=swap")
        }
        "Open Sans" => Some(
            "https://fonts.googleapis.com/css2?family=Open+Sans:wght@400;600;700&display=swap",
        ),
        _ => None,
    }
}

/// Render the theme into the widget stylesheet. Everything downstream
/// reads these variables; regenerating and re-setting the style node is
/// the entire theme hot-update.
pub fn widget_css(theme: &Theme) -> String {
    format!(
        "#{CONTAINER_ID} {{\n\
         \x20 --lf-primary: {primary};\n\
         \x20 --lf-background: {background};\n\
         \x20 --lf-header: {header};\n\
         \x20 --lf-message: {message};\n\
         \x20 --lf-input: {input};\n\
         \x20 --lf-bot-message: {bot_message};\n\
         \x20 --lf-user-message: {user_message};\n\
         \x20 --lf-bot-text: {bot_text};\n\
         \x20 --lf-user-text: {user_text};\n\
         \x20 --lf-header-text: {header_text};\n\
         \x20 --lf-radius: {radius};\n\
         \x20 font-family: {font};\n\
         }}\n",
        primary = theme.primary_color,
        background = theme.background_color,
        header = theme.header_color,
        message = theme.message_color,
        input = theme.input_color,
        bot_message = theme.bot_message_color,
        user_message = theme.user_message_color,
        bot_text = theme.bot_text_color,
        user_text = theme.user_text_color,
        header_text = theme.header_text_color,
        radius = theme.border_radius,
        font = theme.font_family,
    )
}
