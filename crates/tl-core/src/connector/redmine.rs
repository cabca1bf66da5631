//! Redmine tracker backend
//!
//! Uses the Redmine REST API with API-key header authentication:
//! `GET /issues/{id}.json` for ticket details, `PUT /issues/{id}.json` for
//! assignment and status changes.

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;

use super::Connector;
use crate::error::Result;
use crate::models::Ticket;

pub const CONNECTOR_ID: &str = "connector.redmine";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

// Default id of the "In Progress" issue status in a stock Redmine install.
const IN_PROGRESS_STATUS_ID: i64 = 2;

#[derive(Debug, Deserialize)]
struct IssueResponse {
    issue: Issue,
}

#[derive(Debug, Deserialize)]
struct Issue {
    subject: String,
}

#[derive(Debug, Deserialize)]
struct CurrentUserResponse {
    user: CurrentUser,
}

#[derive(Debug, Deserialize)]
struct CurrentUser {
    id: i64,
}

/// Redmine REST API client.
pub struct RedmineConnector {
    base_url: String,
    client: Client,
}

impl RedmineConnector {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            "X-Redmine-API-Key",
            header::HeaderValue::from_str(api_key)
                .map_err(|_| crate::error::Error::config("Invalid Redmine API key"))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self { base_url, client })
    }

    /// Id of the user the API key belongs to; needed for assignment.
    async fn current_user_id(&self) -> Result<Option<i64>> {
        let url = format!("{}/users/current.json", self.base_url);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            log::warn!("Redmine current-user lookup failed: {}", response.status());
            return Ok(None);
        }

        let current: CurrentUserResponse = response.json().await?;
        Ok(Some(current.user.id))
    }

    async fn update_issue(&self, tid: &str, issue: serde_json::Value) -> Result<bool> {
        let url = format!("{}/issues/{}.json", self.base_url, tid);
        let response = self
            .client
            .put(&url)
            .json(&serde_json::json!({ "issue": issue }))
            .send()
            .await?;
        Ok(response.status().is_success())
    }
}

#[async_trait]
impl Connector for RedmineConnector {
    fn connector_id(&self) -> &'static str {
        CONNECTOR_ID
    }

    async fn ticket_details(&self, tid: &str) -> Result<Option<Ticket>> {
        let url = format!("{}/issues/{}.json", self.base_url, tid);
        let response = self.client.get(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = response.error_for_status()?;

        let details: IssueResponse = response.json().await?;
        Ok(Some(Ticket::new(tid, details.issue.subject)))
    }

    async fn assign(&self, tid: &str) -> Result<bool> {
        let Some(user_id) = self.current_user_id().await? else {
            return Ok(false);
        };
        self.update_issue(tid, serde_json::json!({ "assigned_to_id": user_id }))
            .await
    }

    async fn set_in_progress(&self, tid: &str, assign: bool) -> Result<bool> {
        let mut issue = serde_json::json!({ "status_id": IN_PROGRESS_STATUS_ID });
        if assign {
            if let Some(user_id) = self.current_user_id().await? {
                issue["assigned_to_id"] = serde_json::json!(user_id);
            }
        }
        self.update_issue(tid, issue).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let connector = RedmineConnector::new("https://redmine.example.com/", "key").unwrap();
        assert_eq!(connector.base_url, "https://redmine.example.com");
        assert_eq!(connector.connector_id(), "connector.redmine");
    }

    #[test]
    fn test_issue_response_parsing() {
        let raw = r#"{"issue": {"id": 1234, "subject": "Running tests"}}"#;
        let parsed: IssueResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.issue.subject, "Running tests");
    }

    #[test]
    fn test_current_user_parsing() {
        let raw = r#"{"user": {"id": 7, "login": "me"}}"#;
        let parsed: CurrentUserResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.user.id, 7);
    }
}
