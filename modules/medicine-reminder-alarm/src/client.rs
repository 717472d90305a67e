//! HTTP client for the reminder service.

use async_trait::async_trait;
use medicine_reminder_types::*;

#[async_trait]
pub trait ReminderApi: Send + Sync {
    async fn fetch_reminders(&self) -> Result<Vec<Reminder>, String>;
    async fn add_reminder(&self, req: &CreateReminderRequest) -> Result<Reminder, String>;
    async fn set_taken(&self, id: &str, taken: bool) -> Result<Reminder, String>;
    async fn delete_reminder(&self, id: &str) -> Result<MessageBody, String>;
}

pub struct HttpReminderApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpReminderApi {
    /// `base_url` points at the API root, e.g. `http://localhost:5000/api`.
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// Decodes a success body, or turns a failure into the server's `message`.
async fn read_json<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> Result<T, String> {
    let status = resp.status();
    if status.is_success() {
        return resp
            .json::<T>()
            .await
            .map_err(|e| format!("Invalid response body: {}", e));
    }

    match resp.json::<MessageBody>().await {
        Ok(body) => Err(body.message),
        Err(_) => Err(format!("Request failed with status {}", status)),
    }
}

#[async_trait]
impl ReminderApi for HttpReminderApi {
    async fn fetch_reminders(&self) -> Result<Vec<Reminder>, String> {
        let resp = self
            .client
            .get(self.url("reminders"))
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;
        read_json(resp).await
    }

    async fn add_reminder(&self, req: &CreateReminderRequest) -> Result<Reminder, String> {
        let resp = self
            .client
            .post(self.url("reminders"))
            .json(req)
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;
        read_json(resp).await
    }

    async fn set_taken(&self, id: &str, taken: bool) -> Result<Reminder, String> {
        let resp = self
            .client
            .patch(self.url(&format!("reminders/{}", id)))
            .json(&UpdateReminderRequest { taken: Some(taken) })
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;
        read_json(resp).await
    }

    async fn delete_reminder(&self, id: &str) -> Result<MessageBody, String> {
        let resp = self
            .client
            .delete(self.url(&format!("reminders/{}", id)))
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;
        read_json(resp).await
    }
}
