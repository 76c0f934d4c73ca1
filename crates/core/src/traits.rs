//! Trait seams between the widget runtime and its external collaborators.
//!
//! The data store and the geolocation providers are opaque to the runtime;
//! these traits are the only surface it sees. The persistence crate provides
//! the production implementations, tests plug in in-memory fakes.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::flow::Flow;
use crate::lead::{ChatInteraction, Feedback, Lead, LocationData};

/// Read access to persisted conversation flows.
#[async_trait]
pub trait FlowStore: Send + Sync {
    /// Latest flow for a chatbot, newest first. `None` when the tenant has
    /// not published a flow yet.
    async fn latest_flow(&self, chatbot_id: &str) -> Result<Option<Flow>, StoreError>;
}

/// Write access for the conversation's persisted outcomes.
#[async_trait]
pub trait LeadSink: Send + Sync {
    async fn insert_lead(&self, lead: &Lead) -> Result<(), StoreError>;

    async fn insert_feedback(&self, feedback: &Feedback) -> Result<(), StoreError>;

    /// Best-effort analytics event. Implementations should be cheap;
    /// callers ignore failures beyond logging.
    async fn record_interaction(&self, event: &ChatInteraction) -> Result<(), StoreError>;
}

/// Best-effort IP geolocation. Infallible by contract: every failure mode
/// degrades to a partial or empty [`LocationData`].
#[async_trait]
pub trait LocationLookup: Send + Sync {
    async fn fetch_location(&self) -> LocationData;
}
