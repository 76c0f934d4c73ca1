//! Embed snippet generation.
//!
//! The installation contract end customers paste into their site: inline
//! globals identifying the chatbot and config endpoint, then the script
//! tag that loads the hosted widget bundle.

/// Render the embed snippet for one chatbot.
pub fn snippet(chatbot_id: &str, widget_url: &str, config_url: &str) -> String {
    format!(
        "<script>\n\
         window.LEADFLOW_CHATBOT_ID = \"{chatbot_id}\";\n\
         window.LEADFLOW_CONFIG_URL = \"{config_url}\";\n\
         </script>\n\
         <script src=\"{widget_url}\" async></script>\n"
    )
}
