//! Embeddable chat widget runtime.
//!
//! Ties the engine, config and persistence layers to an embedding page:
//! bootstrap ([`init`]), the live instance driver, the process-wide
//! control surface, and asset/embed helpers.

pub mod assets;
pub mod bootstrap;
pub mod control;
pub mod embed;
pub mod error;
pub mod host;
pub mod instance;

pub use bootstrap::{init, init_logged, InitOptions, WidgetHandle, INVALID_CONFIG_MESSAGE};
pub use control::ControlSurface;
pub use error::InitError;
pub use host::{Capability, HostPage, MemoryHost};
pub use instance::{Command, InstanceState, UiState, WidgetInstance};
