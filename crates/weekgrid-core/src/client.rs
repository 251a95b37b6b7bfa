use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WeekgridError};
use crate::grid::GridLayout;
use crate::model::{Activity, NewActivity};

/// HTTP client for the scheduling API.
#[derive(Debug, Clone)]
pub struct ScheduleClient {
    base_url: String,
    http: reqwest::Client,
}

/// `{message}` body used by every non-list response of the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
    /// Seconds since the server started.
    pub uptime: f64,
}

impl ScheduleClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5).min(timeout))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn list(&self) -> Result<Vec<Activity>> {
        let resp = self
            .http
            .get(format!("{}/api/activities", self.base_url))
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn create(&self, input: &NewActivity) -> Result<Activity> {
        let resp = self
            .http
            .post(format!("{}/api/activities", self.base_url))
            .json(input)
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn delete(&self, id: &str) -> Result<String> {
        let resp = self
            .http
            .delete(self.activity_url(id)?)
            .send()
            .await?;
        let body: MessageBody = decode(resp).await?;
        Ok(body.message)
    }

    /// `{base}/api/activities/{id}` with `id` encoded as a single path segment.
    fn activity_url(&self, id: &str) -> Result<reqwest::Url> {
        let invalid = || WeekgridError::Config(format!("invalid server url: {}", self.base_url));
        let mut url = reqwest::Url::parse(&format!("{}/api/activities", self.base_url))
            .map_err(|_| invalid())?;
        url.path_segments_mut().map_err(|_| invalid())?.push(id);
        Ok(url)
    }

    pub async fn slots(&self) -> Result<GridLayout> {
        let resp = self
            .http
            .get(format!("{}/api/slots", self.base_url))
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn health(&self) -> Result<HealthStatus> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        decode(resp).await
    }
}

/// Turn a response into `T`, or into [`WeekgridError::Api`] carrying the
/// server's message when the status is not a success.
async fn decode<R: DeserializeOwned>(resp: reqwest::Response) -> Result<R> {
    let status = resp.status();
    let body = resp.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<MessageBody>(&body)
            .map(|b| b.message)
            .unwrap_or_else(|_| {
                if body.is_empty() {
                    status.to_string()
                } else {
                    body
                }
            });
        return Err(WeekgridError::Api {
            status: status.as_u16(),
            message,
        });
    }

    Ok(serde_json::from_str(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ScheduleClient {
        ScheduleClient::new(base, Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        assert_eq!(client("http://localhost:3000/").base_url(), "http://localhost:3000");
    }

    #[test]
    fn test_activity_url_plain_id() {
        let url = client("http://localhost:3000").activity_url("0192f3a4").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/activities/0192f3a4");
    }

    #[test]
    fn test_activity_url_encodes_reserved_characters() {
        let url = client("http://localhost:3000").activity_url("a/b?c#d").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:3000/api/activities/a%2Fb%3Fc%23d"
        );
        assert!(url.query().is_none());
        assert!(url.fragment().is_none());
    }

    #[test]
    fn test_activity_url_keeps_base_path() {
        let url = client("http://localhost:3000/weekgrid").activity_url("x").unwrap();
        assert_eq!(url.path(), "/weekgrid/api/activities/x");
    }

    #[test]
    fn test_activity_url_rejects_unparseable_base() {
        let err = client("not a url").activity_url("x").unwrap_err();
        assert!(matches!(err, WeekgridError::Config(_)));
    }
}
