//! Production implementations of the runtime's persistence seams:
//! Supabase (PostgREST) storage, the tenant config endpoint client, and
//! the IP geolocation enricher.

pub mod error;
pub mod location;
pub mod supabase;
pub mod tenant;

pub use error::PersistenceError;
pub use location::LocationEnricher;
pub use supabase::{SupabaseClient, WidgetConfigRow};
pub use tenant::{TenantConfigClient, TenantCredentials};
