//! Remote settings store
//!
//! The settings row is addressed by one well-known key and holds every
//! endpoint URL and token as a JSON blob.

use crate::{record::SettingsRecord, Result, SettingsError};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use socialdesk_core::SettingsStoreConfig;
use std::time::Duration;
use tracing::{debug, info};

/// Backing store for the integrations settings record
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Fetch the record; `Ok(None)` when the row does not exist
    async fn fetch(&self) -> Result<Option<SettingsRecord>>;

    /// Create or replace the record
    async fn save(&self, record: &SettingsRecord) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct SettingsRow {
    value: Value,
}

/// Settings store backed by a Supabase (PostgREST) table
pub struct SupabaseSettingsStore {
    client: Client,
    base_url: String,
    service_key: SecretString,
    table: String,
    key: String,
    fetch_timeout: Duration,
}

impl SupabaseSettingsStore {
    pub fn new(config: &SettingsStoreConfig) -> Result<Self> {
        if !config.is_remote_enabled() {
            return Err(SettingsError::StoreNotConfigured);
        }
        let service_key = config
            .service_key
            .clone()
            .ok_or(SettingsError::StoreNotConfigured)?;

        let client = Client::builder().build()?;

        Ok(Self {
            client,
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            service_key,
            table: config.table.clone(),
            key: config.key.clone(),
            fetch_timeout: config.fetch_timeout(),
        })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let key = self.service_key.expose_secret();
        request
            .header("apikey", key.as_str())
            .header("Authorization", format!("Bearer {}", key))
    }
}

/// Decode the `value` column; some deployments store the blob as text
fn decode_value(value: Value) -> Result<SettingsRecord> {
    let value = match value {
        Value::String(text) => {
            serde_json::from_str(&text).map_err(|e| SettingsError::Malformed(e.to_string()))?
        }
        other => other,
    };
    serde_json::from_value(value).map_err(|e| SettingsError::Malformed(e.to_string()))
}

#[async_trait]
impl SettingsStore for SupabaseSettingsStore {
    async fn fetch(&self) -> Result<Option<SettingsRecord>> {
        debug!(table = %self.table, key = %self.key, "Fetching settings record");

        let response = self
            .authorized(self.client.get(self.table_url()))
            .timeout(self.fetch_timeout)
            .query(&[
                ("key", format!("eq.{}", self.key)),
                ("select", "value".to_string()),
                ("limit", "1".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SettingsError::Remote {
                status: status.as_u16(),
                body,
            });
        }

        let rows: Vec<SettingsRow> = response
            .json()
            .await
            .map_err(|e| SettingsError::Malformed(e.to_string()))?;

        rows.into_iter().next().map(|row| decode_value(row.value)).transpose()
    }

    async fn save(&self, record: &SettingsRecord) -> Result<()> {
        let body = json!([{
            "key": self.key,
            "value": record,
            "updated_at": Utc::now().to_rfc3339(),
        }]);

        let response = self
            .authorized(self.client.post(self.table_url()))
            .header("Prefer", "resolution=merge-duplicates")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SettingsError::Remote {
                status: status.as_u16(),
                body,
            });
        }

        info!(table = %self.table, key = %self.key, "Settings record saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use socialdesk_core::Integration;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(url: &str) -> SettingsStoreConfig {
        SettingsStoreConfig::default().with_supabase(url, "service-key")
    }

    #[test]
    fn test_requires_url_and_key() {
        assert!(matches!(
            SupabaseSettingsStore::new(&SettingsStoreConfig::default()),
            Err(SettingsError::StoreNotConfigured)
        ));

        let mut no_key = config("https://abc.supabase.co");
        no_key.service_key = None;
        assert!(matches!(
            SupabaseSettingsStore::new(&no_key),
            Err(SettingsError::StoreNotConfigured)
        ));
    }

    #[test]
    fn test_decode_text_blob() {
        let record = decode_value(Value::String(
            r#"{"analytics_url": "https://n8n.example.com/analytics"}"#.into(),
        ))
        .unwrap();
        assert_eq!(record.url(Integration::Analytics), Some("https://n8n.example.com/analytics"));

        assert!(matches!(
            decode_value(Value::String("not json".into())),
            Err(SettingsError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_record() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/app_settings"))
            .and(query_param("key", "eq.integrations"))
            .and(header("apikey", "service-key"))
            .and(header("Authorization", "Bearer service-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"value": {"ai_agent_url": "https://n8n.example.com/ai", "ai_agent_token": "tok"}}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let store = SupabaseSettingsStore::new(&config(&server.uri())).unwrap();
        let record = store.fetch().await.unwrap().unwrap();

        assert_eq!(record.url(Integration::AiAgent), Some("https://n8n.example.com/ai"));
        assert_eq!(record.credential(Integration::AiAgent), Some("tok"));
    }

    #[tokio::test]
    async fn test_fetch_missing_row() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/app_settings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let store = SupabaseSettingsStore::new(&config(&server.uri())).unwrap();
        assert!(store.fetch().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fetch_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let store = SupabaseSettingsStore::new(&config(&server.uri())).unwrap();
        match store.fetch().await {
            Err(SettingsError::Remote { status, body }) => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid api key");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_save_upserts_record() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/app_settings"))
            .and(header("Prefer", "resolution=merge-duplicates"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let store = SupabaseSettingsStore::new(&config(&server.uri())).unwrap();
        let record = SettingsRecord::default()
            .with_url(Integration::Reports, "https://n8n.example.com/reports");

        store.save(&record).await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_guard_does_not_limit_save() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([]))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201).set_delay(Duration::from_millis(500)))
            .expect(1)
            .mount(&server)
            .await;

        let config = config(&server.uri()).with_fetch_timeout(Duration::from_millis(100));
        let store = SupabaseSettingsStore::new(&config).unwrap();

        assert!(matches!(store.fetch().await, Err(SettingsError::Http(_))));
        store.save(&SettingsRecord::default()).await.unwrap();
    }
}
