//! Jira tracker backend
//!
//! Supports Jira Server/DC with a personal access token and Jira Cloud
//! with email + API token basic auth. Ticket details come from
//! `GET /rest/api/2/issue/{key}`; in-progress uses the issue's available
//! transitions rather than a fixed status id because workflows differ per
//! project.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;

use super::Connector;
use crate::error::{Error, Result};
use crate::models::Ticket;

pub const CONNECTOR_ID: &str = "connector.jira";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Authentication type for Jira
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JiraAuthType {
    /// Personal Access Token (Jira Server/DC)
    Pat,
    /// Basic auth with email:token (Jira Cloud)
    Basic,
}

impl From<&str> for JiraAuthType {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "basic" => JiraAuthType::Basic,
            _ => JiraAuthType::Pat,
        }
    }
}

#[derive(Debug, Deserialize)]
struct JiraIssue {
    fields: JiraIssueFields,
}

#[derive(Debug, Deserialize)]
struct JiraIssueFields {
    summary: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JiraMyself {
    #[serde(rename = "accountId", default)]
    account_id: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

impl JiraMyself {
    /// accountId on Cloud, name on Server.
    fn identifier(self) -> Option<(&'static str, String)> {
        if let Some(account_id) = self.account_id {
            return Some(("accountId", account_id));
        }
        self.name.map(|name| ("name", name))
    }
}

#[derive(Debug, Deserialize)]
struct TransitionsResponse {
    transitions: Vec<Transition>,
}

#[derive(Debug, Deserialize)]
struct Transition {
    id: String,
    name: String,
}

/// Jira REST API client.
#[derive(Debug)]
pub struct JiraConnector {
    base_url: String,
    client: Client,
}

impl JiraConnector {
    pub fn new(
        base_url: &str,
        token: &str,
        email: Option<&str>,
        auth_type: JiraAuthType,
    ) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let auth_value = match auth_type {
            JiraAuthType::Pat => format!("Bearer {}", token),
            JiraAuthType::Basic => {
                let email =
                    email.ok_or_else(|| Error::config("Email required for Jira basic auth"))?;
                let credentials = format!("{}:{}", email, token);
                format!("Basic {}", BASE64.encode(credentials.as_bytes()))
            }
        };
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&auth_value)
                .map_err(|_| Error::config("Invalid Jira credentials"))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self { base_url, client })
    }

    async fn myself(&self) -> Result<Option<JiraMyself>> {
        let url = format!("{}/rest/api/2/myself", self.base_url);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            log::warn!("Jira myself lookup failed: {}", response.status());
            return Ok(None);
        }
        Ok(Some(response.json().await?))
    }

    /// Transition id of the first transition named "in progress", if the
    /// workflow has one.
    async fn in_progress_transition(&self, tid: &str) -> Result<Option<String>> {
        let url = format!("{}/rest/api/2/issue/{}/transitions", self.base_url, tid);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Ok(None);
        }

        let transitions: TransitionsResponse = response.json().await?;
        Ok(transitions
            .transitions
            .into_iter()
            .find(|t| t.name.eq_ignore_ascii_case("in progress"))
            .map(|t| t.id))
    }
}

#[async_trait]
impl Connector for JiraConnector {
    fn connector_id(&self) -> &'static str {
        CONNECTOR_ID
    }

    async fn ticket_details(&self, tid: &str) -> Result<Option<Ticket>> {
        let url = format!("{}/rest/api/2/issue/{}", self.base_url, tid);
        let response = self.client.get(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = response.error_for_status()?;

        let issue: JiraIssue = response.json().await?;
        let title = issue.fields.summary.unwrap_or_else(|| "(no summary)".to_string());
        Ok(Some(Ticket::new(tid, title)))
    }

    async fn assign(&self, tid: &str) -> Result<bool> {
        let Some(identifier) = self.myself().await?.and_then(JiraMyself::identifier) else {
            return Ok(false);
        };
        let (field, value) = identifier;

        let url = format!("{}/rest/api/2/issue/{}/assignee", self.base_url, tid);
        let response = self
            .client
            .put(&url)
            .json(&serde_json::json!({ field: value }))
            .send()
            .await?;
        Ok(response.status().is_success())
    }

    async fn set_in_progress(&self, tid: &str, assign: bool) -> Result<bool> {
        let Some(transition_id) = self.in_progress_transition(tid).await? else {
            // Workflow has no in-progress transition from the current state.
            return Ok(false);
        };

        let url = format!("{}/rest/api/2/issue/{}/transitions", self.base_url, tid);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "transition": { "id": transition_id } }))
            .send()
            .await?;
        let moved = response.status().is_success();

        if moved && assign {
            // Folded assignment is best effort on top of the transition.
            if let Err(err) = self.assign(tid).await {
                log::warn!("Jira assignment after transition failed: {}", err);
            }
        }
        Ok(moved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_type_from_str() {
        assert_eq!(JiraAuthType::from("basic"), JiraAuthType::Basic);
        assert_eq!(JiraAuthType::from("BASIC"), JiraAuthType::Basic);
        assert_eq!(JiraAuthType::from("pat"), JiraAuthType::Pat);
        assert_eq!(JiraAuthType::from("anything"), JiraAuthType::Pat);
    }

    #[test]
    fn test_basic_auth_requires_email() {
        let err =
            JiraConnector::new("https://jira.example.com", "token", None, JiraAuthType::Basic)
                .unwrap_err();
        assert!(err.to_string().contains("Email required"));

        JiraConnector::new(
            "https://jira.example.com",
            "token",
            Some("me@example.com"),
            JiraAuthType::Basic,
        )
        .unwrap();
    }

    #[test]
    fn test_myself_identifier_prefers_account_id() {
        let cloud = JiraMyself {
            account_id: Some("abc123".to_string()),
            name: Some("me".to_string()),
        };
        assert_eq!(
            cloud.identifier(),
            Some(("accountId", "abc123".to_string()))
        );

        let server = JiraMyself {
            account_id: None,
            name: Some("me".to_string()),
        };
        assert_eq!(server.identifier(), Some(("name", "me".to_string())));
    }

    #[test]
    fn test_issue_parsing() {
        let raw = r#"{"key": "PROJ-1", "fields": {"summary": "Running tests"}}"#;
        let issue: JiraIssue = serde_json::from_str(raw).unwrap();
        assert_eq!(issue.fields.summary.as_deref(), Some("Running tests"));
    }

    #[test]
    fn test_transitions_parsing() {
        let raw = r#"{"transitions": [{"id": "21", "name": "In Progress"}, {"id": "31", "name": "Done"}]}"#;
        let parsed: TransitionsResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.transitions.len(), 2);
        assert_eq!(parsed.transitions[0].id, "21");
    }
}
