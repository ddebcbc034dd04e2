use crate::connector::ports::SalesforceApi;
use crate::connector::{ConnectorError, SalesforceRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use contracts::domain::a001_salesforce_backend::aggregate::SalesforceBackend;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::RwLock;

/// Сессия OAuth, полученная по username-password flow
#[derive(Debug, Clone, Deserialize)]
struct SalesforceSession {
    access_token: String,
    instance_url: String,
}

/// Страница ответа `/query`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryPage {
    #[serde(default)]
    records: Vec<Value>,
    #[serde(default)]
    done: bool,
    next_records_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpdatedResponse {
    #[serde(default)]
    ids: Vec<String>,
}

/// HTTP-клиент REST API Salesforce
pub struct SalesforceRestClient {
    client: reqwest::Client,
    login_url: String,
    api_version: String,
    consumer_key: String,
    consumer_secret: String,
    username: String,
    /// Пароль вместе с security token
    password: String,
    session: RwLock<Option<SalesforceSession>>,
}

impl SalesforceRestClient {
    pub fn new(backend: &SalesforceBackend) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()?;
        Ok(Self {
            client,
            login_url: backend.login_url.trim_end_matches('/').to_string(),
            api_version: backend.api_version.clone(),
            consumer_key: backend.consumer_key.clone(),
            consumer_secret: backend.consumer_secret.clone(),
            username: backend.username.clone(),
            password: format!("{}{}", backend.password, backend.security_token),
            session: RwLock::new(None),
        })
    }

    async fn authenticate(&self) -> Result<SalesforceSession, ConnectorError> {
        let url = format!("{}/services/oauth2/token", self.login_url);
        tracing::info!("Salesforce: authenticating {} at {}", self.username, url);

        let response = self
            .client
            .post(&url)
            .form(&[
                ("grant_type", "password"),
                ("client_id", self.consumer_key.as_str()),
                ("client_secret", self.consumer_secret.as_str()),
                ("username", self.username.as_str()),
                ("password", self.password.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ConnectorError::Api(format!("Network error for {}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ConnectorError::Api(format!(
                "Authentication failed with HTTP {}: {}",
                status, body
            )));
        }

        let session: SalesforceSession = response
            .json()
            .await
            .map_err(|e| ConnectorError::Api(format!("Invalid token response: {}", e)))?;
        *self.session.write().await = Some(session.clone());
        Ok(session)
    }

    async fn session(&self) -> Result<SalesforceSession, ConnectorError> {
        if let Some(session) = self.session.read().await.clone() {
            return Ok(session);
        }
        self.authenticate().await
    }

    fn data_path(&self, suffix: &str) -> String {
        format!("/services/data/v{}{}", self.api_version, suffix)
    }

    /// GET по пути относительно instance_url; при 401 одна повторная авторизация
    async fn get_json(&self, path: &str) -> Result<Value, ConnectorError> {
        let mut session = self.session().await?;
        let mut reauthenticated = false;

        loop {
            let url = format!("{}{}", session.instance_url.trim_end_matches('/'), path);
            tracing::debug!("Salesforce: GET {}", url);

            let response = self
                .client
                .get(&url)
                .bearer_auth(&session.access_token)
                .header("Accept", "application/json")
                .send()
                .await
                .map_err(|e| ConnectorError::Api(format!("Network error for {}: {}", url, e)))?;

            let status = response.status();
            if status.as_u16() == 401 && !reauthenticated {
                tracing::warn!("Salesforce: session expired, re-authenticating");
                session = self.authenticate().await?;
                reauthenticated = true;
                continue;
            }
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ConnectorError::Api(format!(
                    "HTTP {} for {}: {}",
                    status, path, body
                )));
            }

            return response
                .json()
                .await
                .map_err(|e| ConnectorError::Api(format!("Invalid JSON from {}: {}", path, e)));
        }
    }
}

/// Формат дат для `/updated/`: секунды и явная зона `+00:00`
fn format_updated_date(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S+00:00").to_string()
}

fn updated_suffix(sobject: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    format!(
        "/sobjects/{}/updated/?start={}&end={}",
        sobject,
        urlencoding::encode(&format_updated_date(start)),
        urlencoding::encode(&format_updated_date(end)),
    )
}

fn parse_query_page(value: Value) -> Result<QueryPage, ConnectorError> {
    serde_json::from_value(value)
        .map_err(|e| ConnectorError::Api(format!("Invalid query response: {}", e)))
}

#[async_trait]
impl SalesforceApi for SalesforceRestClient {
    async fn query(&self, soql: &str) -> Result<Vec<SalesforceRecord>, ConnectorError> {
        tracing::debug!("Salesforce: SOQL {}", soql);
        let mut path = self.data_path(&format!("/query?q={}", urlencoding::encode(soql)));
        let mut records = Vec::new();

        loop {
            let page = parse_query_page(self.get_json(&path).await?)?;
            for value in page.records {
                records.push(SalesforceRecord::from_value(value)?);
            }
            match page.next_records_url {
                Some(next) if !page.done => path = next,
                _ => break,
            }
        }

        Ok(records)
    }

    async fn read(&self, sobject: &str, id: &str) -> Result<SalesforceRecord, ConnectorError> {
        let path = self.data_path(&format!(
            "/sobjects/{}/{}",
            sobject,
            urlencoding::encode(id)
        ));
        SalesforceRecord::from_value(self.get_json(&path).await?)
    }

    async fn get_updated(
        &self,
        sobject: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<String>, ConnectorError> {
        let path = self.data_path(&updated_suffix(sobject, start, end));
        let response: UpdatedResponse = serde_json::from_value(self.get_json(&path).await?)
            .map_err(|e| ConnectorError::Api(format!("Invalid updated response: {}", e)))?;
        tracing::info!(
            "Salesforce: {} {} records updated between {} and {}",
            response.ids.len(),
            sobject,
            start,
            end
        );
        Ok(response.ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_updated_dates_are_encoded_with_explicit_offset() {
        let start = Utc.with_ymd_and_hms(2014, 3, 1, 8, 30, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2014, 3, 2, 0, 0, 0).unwrap();
        assert_eq!(
            updated_suffix("Account", start, end),
            "/sobjects/Account/updated/?start=2014-03-01T08%3A30%3A00%2B00%3A00\
             &end=2014-03-02T00%3A00%3A00%2B00%3A00"
        );
    }

    #[test]
    fn test_query_page_with_next_url() {
        let page = parse_query_page(json!({
            "totalSize": 3,
            "done": false,
            "nextRecordsUrl": "/services/data/v38.0/query/01gD0000002HU6KIAW-2000",
            "records": [{"Id": "001A"}, {"Id": "001B"}]
        }))
        .unwrap();
        assert_eq!(page.records.len(), 2);
        assert!(!page.done);
        assert_eq!(
            page.next_records_url.as_deref(),
            Some("/services/data/v38.0/query/01gD0000002HU6KIAW-2000")
        );
    }

    #[test]
    fn test_last_query_page() {
        let page = parse_query_page(json!({"totalSize": 0, "done": true, "records": []})).unwrap();
        assert!(page.done);
        assert!(page.next_records_url.is_none());
    }

    #[test]
    fn test_password_includes_security_token() {
        let mut backend = SalesforceBackend::new_for_insert(
            "SF".to_string(),
            "Salesforce".to_string(),
            "https://login.salesforce.com/".to_string(),
        );
        backend.password = "secret".to_string();
        backend.security_token = "TOKEN".to_string();
        backend.api_version = "38.0".to_string();

        let client = SalesforceRestClient::new(&backend).unwrap();
        assert_eq!(client.password, "secretTOKEN");
        assert_eq!(client.login_url, "https://login.salesforce.com");
        assert_eq!(client.data_path("/query"), "/services/data/v38.0/query");
    }
}
