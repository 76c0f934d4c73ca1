//! Config endpoint service for the leadflow widget.

pub mod http;
pub mod state;

pub use http::create_router;
pub use state::AppState;
