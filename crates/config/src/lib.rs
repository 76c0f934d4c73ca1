//! Configuration layer for the leadflow widget.
//!
//! All flow/theme/proactive defaulting happens in one normalization step at
//! load time ([`normalize`]), producing a fully-populated
//! [`NormalizedConfig`] the rest of the runtime consumes. Nothing
//! downstream re-derives defaults.

pub mod error;
pub mod normalize;
pub mod settings;
pub mod theme;

pub use error::ConfigError;
pub use normalize::{normalize, NormalizedConfig, ProactiveSettings};
pub use settings::{load_settings, GeoSettings, ServerSettings, Settings, TypingSettings};
pub use theme::{ButtonIcon, Gradient, Theme, ThemeUpdate};
