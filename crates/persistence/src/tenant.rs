//! Tenant config endpoint client.
//!
//! The embed snippet ships no credentials; the widget asks the config
//! endpoint for the tenant's Supabase URL and anon key by chatbot id.
//! Responses are cached per id for a short TTL so repeated mounts on the
//! same page do not refetch.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;

/// Credentials handed out by the config endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantCredentials {
    pub supabase_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supabase_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RejectionBody {
    #[allow(dead_code)]
    error: String,
    message: String,
}

pub struct TenantConfigClient {
    http: reqwest::Client,
    endpoint: String,
    ttl: Duration,
    cache: Mutex<HashMap<String, (Instant, TenantCredentials)>>,
}

impl TenantConfigClient {
    pub fn new(endpoint: &str, ttl: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            ttl,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch (or reuse cached) credentials for a chatbot id.
    pub async fn credentials(
        &self,
        chatbot_id: &str,
    ) -> Result<TenantCredentials, PersistenceError> {
        if let Some(cached) = self.cached(chatbot_id) {
            return Ok(cached);
        }

        let url = format!("{}/{chatbot_id}", self.endpoint);
        let response = self.http.get(&url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::BAD_REQUEST {
            let body: RejectionBody = response.json().await?;
            return Err(PersistenceError::TenantRejected {
                message: body.message,
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PersistenceError::Status { status, body });
        }

        let credentials: TenantCredentials = response.json().await?;
        self.cache.lock().insert(
            chatbot_id.to_string(),
            (Instant::now(), credentials.clone()),
        );
        Ok(credentials)
    }

    fn cached(&self, chatbot_id: &str) -> Option<TenantCredentials> {
        let cache = self.cache.lock();
        let (fetched_at, credentials) = cache.get(chatbot_id)?;
        if fetched_at.elapsed() < self.ttl {
            Some(credentials.clone())
        } else {
            None
        }
    }
}
