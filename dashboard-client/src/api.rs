//! HTTP endpoints the page talks to.

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitoringAction {
    Start,
    Stop,
    Restart,
}

impl MonitoringAction {
    pub const ALL: [MonitoringAction; 3] = [
        MonitoringAction::Start,
        MonitoringAction::Stop,
        MonitoringAction::Restart,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MonitoringAction::Start => "start",
            MonitoringAction::Stop => "stop",
            MonitoringAction::Restart => "restart",
        }
    }
}

impl fmt::Display for MonitoringAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MonitoringAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| Error::UnknownAction(s.to_string()))
    }
}

/// `GET /api/monitoring/status`. `active` is absent or null when the server
/// can't tell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// `POST /api/monitoring/{action}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

/// What the page needs from the server.
pub trait DashboardApi: Send + Sync + 'static {
    /// Status of `GET /health`; `Err` only for transport failures.
    fn health(&self) -> impl Future<Output = Result<StatusCode>> + Send;

    fn monitoring_status(&self) -> impl Future<Output = Result<StatusResponse>> + Send;

    fn monitoring_command(
        &self,
        action: MonitoringAction,
    ) -> impl Future<Output = Result<ActionResponse>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    base: String,
}

impl HttpApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }
}

impl DashboardApi for HttpApi {
    #[tracing::instrument(skip(self))]
    async fn health(&self) -> Result<StatusCode> {
        let resp = self.client.get(self.url("/health")).send().await?;
        Ok(resp.status())
    }

    #[tracing::instrument(skip(self))]
    async fn monitoring_status(&self) -> Result<StatusResponse> {
        let resp = self
            .client
            .get(self.url("/api/monitoring/status"))
            .send()
            .await?;
        Ok(resp.json().await?)
    }

    // Failed commands still answer with a JSON body, so the status code is
    // not checked here.
    #[tracing::instrument(skip(self))]
    async fn monitoring_command(&self, action: MonitoringAction) -> Result<ActionResponse> {
        let resp = self
            .client
            .post(self.url(&format!("/api/monitoring/{action}")))
            .send()
            .await?;
        Ok(resp.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let api = HttpApi::new("http://dash.local:8080/", Duration::from_secs(1)).unwrap();
        assert_eq!(api.url("/health"), "http://dash.local:8080/health");
        assert_eq!(
            api.url("api/monitoring/status"),
            "http://dash.local:8080/api/monitoring/status"
        );
    }

    #[test]
    fn test_action_parsing() {
        assert_eq!("restart".parse::<MonitoringAction>().unwrap(), MonitoringAction::Restart);
        assert_eq!(" stop ".parse::<MonitoringAction>().unwrap(), MonitoringAction::Stop);
        assert!(matches!(
            "pause".parse::<MonitoringAction>(),
            Err(Error::UnknownAction(a)) if a == "pause"
        ));
        assert_eq!(MonitoringAction::Stop.to_string(), "stop");
    }

    #[test]
    fn test_status_response_null_and_absent() {
        let null: StatusResponse = serde_json::from_str(r#"{"active":null}"#).unwrap();
        let absent: StatusResponse = serde_json::from_str("{}").unwrap();
        let running: StatusResponse =
            serde_json::from_str(r#"{"active":true,"status":"running"}"#).unwrap();
        assert_eq!(null.active, None);
        assert_eq!(absent.active, None);
        assert_eq!(running.active, Some(true));
    }

    #[test]
    fn test_action_response() {
        let resp: ActionResponse = serde_json::from_str(
            r#"{"success":false,"message":"Failed to stop monitoring: not running","active":false}"#,
        )
        .unwrap();
        assert!(!resp.success);
        assert!(resp.message.starts_with("Failed to stop"));
    }
}
