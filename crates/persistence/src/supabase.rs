//! Supabase (PostgREST) data access.
//!
//! One thin client per widget instance. All access goes through the REST
//! surface with the tenant's anon key; rows are the exact JSON shapes the
//! dashboard writes.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Deserialize;
use serde::Serialize;

use async_trait::async_trait;
use leadflow_config::ThemeUpdate;
use leadflow_core::{
    ChatInteraction, Feedback, Flow, FlowStore, Lead, LeadSink, StoreError,
};

use crate::error::PersistenceError;

/// Widget configuration row persisted by the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetConfigRow {
    pub chatbot_id: String,
    /// Sparse theme; merged over defaults at normalization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<ThemeUpdate>,
}

/// PostgREST client for one tenant project.
#[derive(Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
}

impl SupabaseClient {
    pub fn new(supabase_url: &str, anon_key: &str) -> Result<Self, PersistenceError> {
        let mut headers = HeaderMap::new();
        let mut key_value =
            HeaderValue::from_str(anon_key).map_err(|_| PersistenceError::InvalidKey)?;
        key_value.set_sensitive(true);
        headers.insert("apikey", key_value);
        let mut bearer = HeaderValue::from_str(&format!("Bearer {anon_key}"))
            .map_err(|_| PersistenceError::InvalidKey)?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;
        Ok(Self {
            http,
            base_url: supabase_url.trim_end_matches('/').to_string(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    /// Newest published flow for a chatbot, if any.
    pub async fn fetch_latest_flow(
        &self,
        chatbot_id: &str,
    ) -> Result<Option<Flow>, PersistenceError> {
        let response = self
            .http
            .get(self.table_url("flows"))
            .query(&[
                ("chatbot_id", format!("eq.{chatbot_id}").as_str()),
                ("select", "*"),
                ("order", "created_at.desc"),
                ("limit", "1"),
            ])
            .send()
            .await?;
        let rows: Vec<Flow> = Self::read_json(response).await?;
        Ok(rows.into_iter().next())
    }

    /// Widget configuration (theme) for a chatbot, if any.
    pub async fn fetch_widget_config(
        &self,
        chatbot_id: &str,
    ) -> Result<Option<WidgetConfigRow>, PersistenceError> {
        let response = self
            .http
            .get(self.table_url("chatbot_configs"))
            .query(&[
                ("chatbot_id", format!("eq.{chatbot_id}").as_str()),
                ("select", "*"),
                ("limit", "1"),
            ])
            .send()
            .await?;
        let rows: Vec<WidgetConfigRow> = Self::read_json(response).await?;
        Ok(rows.into_iter().next())
    }

    /// Upsert the widget configuration row (dashboard save path).
    pub async fn upsert_widget_config(
        &self,
        row: &WidgetConfigRow,
    ) -> Result<(), PersistenceError> {
        let response = self
            .http
            .post(self.table_url("chatbot_configs"))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(row)
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn insert<T: Serialize + ?Sized>(
        &self,
        table: &str,
        row: &T,
    ) -> Result<(), PersistenceError> {
        let response = self
            .http
            .post(self.table_url(table))
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, PersistenceError> {
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn check_status(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, PersistenceError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(PersistenceError::Status { status, body })
    }
}

#[async_trait]
impl FlowStore for SupabaseClient {
    async fn latest_flow(&self, chatbot_id: &str) -> Result<Option<Flow>, StoreError> {
        Ok(self.fetch_latest_flow(chatbot_id).await?)
    }
}

#[async_trait]
impl LeadSink for SupabaseClient {
    async fn insert_lead(&self, lead: &Lead) -> Result<(), StoreError> {
        self.insert("leads", lead).await?;
        Ok(())
    }

    async fn insert_feedback(&self, feedback: &Feedback) -> Result<(), StoreError> {
        self.insert("feedback", feedback).await?;
        Ok(())
    }

    async fn record_interaction(&self, event: &ChatInteraction) -> Result<(), StoreError> {
        self.insert("chat_interactions", event).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadflow_core::{AnswerMap, LocationData};
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn flow_row() -> serde_json::Value {
        serde_json::json!([{
            "id": "f1",
            "chatbot_id": "cb-1",
            "data": {
                "welcomeMessage": "Hi",
                "endMessage": "Bye",
                "showEndScreen": true,
                "options": [{"id": "o1", "label": "Sales", "flow": []}]
            },
            "created_at": "2025-05-01T12:00:00Z"
        }])
    }

    #[tokio::test]
    async fn fetches_newest_flow() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/flows"))
            .and(query_param("chatbot_id", "eq.cb-1"))
            .and(query_param("order", "created_at.desc"))
            .and(query_param("limit", "1"))
            .and(header("apikey", "anon"))
            .respond_with(ResponseTemplate::new(200).set_body_json(flow_row()))
            .mount(&server)
            .await;

        let client = SupabaseClient::new(&server.uri(), "anon").unwrap();
        let flow = client.fetch_latest_flow("cb-1").await.unwrap().unwrap();
        assert_eq!(flow.chatbot_id, "cb-1");
        assert_eq!(flow.data.welcome_message, "Hi");
    }

    #[tokio::test]
    async fn missing_flow_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/flows"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let client = SupabaseClient::new(&server.uri(), "anon").unwrap();
        assert!(client.fetch_latest_flow("cb-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn lead_insert_posts_row() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/leads"))
            .and(header("authorization", "Bearer anon"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let client = SupabaseClient::new(&server.uri(), "anon").unwrap();
        let lead = Lead {
            chatbot_id: "cb-1".into(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            phone: None,
            location: LocationData::default(),
            answers: AnswerMap::new(),
        };
        client.insert_lead(&lead).await.unwrap();
    }

    #[tokio::test]
    async fn backend_error_surfaces_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/leads"))
            .respond_with(ResponseTemplate::new(500).set_body_string("pg down"))
            .mount(&server)
            .await;

        let client = SupabaseClient::new(&server.uri(), "anon").unwrap();
        let lead = Lead {
            chatbot_id: "cb-1".into(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            phone: None,
            location: LocationData::default(),
            answers: AnswerMap::new(),
        };
        let err = client.insert_lead(&lead).await.unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
    }

    #[tokio::test]
    async fn widget_config_row_decodes_sparse_theme() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/chatbot_configs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
                "chatbot_id": "cb-1",
                "theme": {"primaryColor": "#ff0000"}
            }])))
            .mount(&server)
            .await;

        let client = SupabaseClient::new(&server.uri(), "anon").unwrap();
        let row = client.fetch_widget_config("cb-1").await.unwrap().unwrap();
        let theme = row.theme.unwrap();
        assert_eq!(theme.primary_color.as_deref(), Some("#ff0000"));
    }
}
