use serde::de::DeserializeOwned;

use super::types::{BotStatus, EntryRecord, GreetingTemplates, GreetingUpdate};
use super::ApiError;

/// HTTP client for the bot backend.
///
/// Paths are resolved against a base URL such as
/// `http://127.0.0.1:8080/api`. All methods are cancel-safe: dropping the
/// returned future abandons the request without side effects on this side.
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    // -- status ------------------------------------------------------------

    pub async fn bot_status(&self) -> Result<BotStatus, ApiError> {
        let response = self.send(self.http.get(self.url("/status"))).await?;
        Self::parse(response).await
    }

    pub async fn start_bot(&self) -> Result<(), ApiError> {
        self.send(self.http.post(self.url("/status"))).await?;
        Ok(())
    }

    pub async fn stop_bot(&self) -> Result<(), ApiError> {
        self.send(self.http.delete(self.url("/status"))).await?;
        Ok(())
    }

    // -- entries -----------------------------------------------------------

    /// Full remote collection, in server order.
    pub async fn list_entries(&self) -> Result<Vec<EntryRecord>, ApiError> {
        let response = self.send(self.http.get(self.url("/entries"))).await?;
        Self::parse(response).await
    }

    /// Upsert by name; the server echoes the normalized record.
    pub async fn put_entry(&self, record: &EntryRecord) -> Result<EntryRecord, ApiError> {
        let response = self
            .send(self.http.put(self.url("/entries")).json(record))
            .await?;
        Self::parse(response).await
    }

    /// Idempotent: deleting a name that no longer exists still succeeds.
    pub async fn delete_entry(&self, name: &str) -> Result<(), ApiError> {
        let path = format!("/entries/{}", urlencoding::encode(name));
        self.send(self.http.delete(self.url(&path))).await?;
        Ok(())
    }

    // -- greeting templates ------------------------------------------------

    pub async fn greeting_templates(&self) -> Result<GreetingTemplates, ApiError> {
        let response = self.send(self.http.get(self.url("/templates"))).await?;
        Self::parse(response).await
    }

    pub async fn save_greeting_templates(
        &self,
        update: &GreetingUpdate,
    ) -> Result<GreetingTemplates, ApiError> {
        let response = self
            .send(self.http.post(self.url("/templates")).json(update))
            .await?;
        Self::parse(response).await
    }

    // -- shared ------------------------------------------------------------

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        tracing::debug!("api response: status={status}");
        if status != 200 {
            return Err(ApiError::UnexpectedStatus(status));
        }
        Ok(response)
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}
