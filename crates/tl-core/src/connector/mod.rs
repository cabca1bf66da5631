//! Ticket tracker connectors
//!
//! A [`Connector`] wraps one remote tracker backend (Redmine, Jira). The
//! [`ConnectorManager`] routes calls to the backend that owns a ticket and
//! is the only connector surface the lifecycle engine sees.
//!
//! Connectors never touch storage; the repository never calls a connector.

pub mod jira;
pub mod redmine;

pub use jira::{JiraAuthType, JiraConnector};
pub use redmine::RedmineConnector;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::models::Ticket;
use crate::settings::Settings;

/// One remote tracker backend.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Stable identifier stored on slots (e.g. "connector.redmine").
    fn connector_id(&self) -> &'static str;

    /// Fetch ticket metadata. `None` when the backend does not know the
    /// ticket.
    async fn ticket_details(&self, tid: &str) -> Result<Option<Ticket>>;

    /// Assign the ticket to the configured user. `false` when the tracker
    /// refuses.
    async fn assign(&self, tid: &str) -> Result<bool>;

    /// Move the ticket to in-progress. `assign` is set when the caller is
    /// also taking the ticket, so backends can fold both into one update.
    async fn set_in_progress(&self, tid: &str, assign: bool) -> Result<bool>;
}

/// Routes tracker calls across the configured backends.
pub struct ConnectorManager {
    connectors: Vec<Box<dyn Connector>>,
}

impl ConnectorManager {
    pub fn new(connectors: Vec<Box<dyn Connector>>) -> Self {
        Self { connectors }
    }

    /// Build whichever backends the settings fully configure.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let mut connectors: Vec<Box<dyn Connector>> = Vec::new();

        if let (Some(url), Some(api_key)) = (&settings.redmine_url, &settings.redmine_api_key) {
            connectors.push(Box::new(RedmineConnector::new(url, api_key)?));
        }
        if let (Some(url), Some(pat)) = (&settings.jira_url, &settings.jira_pat) {
            let auth = settings
                .jira_auth
                .as_deref()
                .map(JiraAuthType::from)
                .unwrap_or(JiraAuthType::Pat);
            connectors.push(Box::new(JiraConnector::new(
                url,
                pat,
                settings.jira_email.as_deref(),
                auth,
            )?));
        }

        Ok(Self::new(connectors))
    }

    fn by_id(&self, connector_id: &str) -> Result<&dyn Connector> {
        self.connectors
            .iter()
            .find(|c| c.connector_id() == connector_id)
            .map(|c| &**c)
            .ok_or_else(|| {
                Error::not_found(format!(
                    "No {} backend is configured",
                    format_connector_id(connector_id)
                ))
            })
    }

    /// Determine which backend owns a ticket.
    ///
    /// Probes each configured backend in order; a backend that errors while
    /// probing is skipped so a dead tracker cannot block work logged
    /// against a healthy one.
    pub async fn spot_connector(&self, tid: &str) -> Result<Option<String>> {
        for connector in &self.connectors {
            match connector.ticket_details(tid).await {
                Ok(Some(_)) => return Ok(Some(connector.connector_id().to_string())),
                Ok(None) => {}
                Err(err) => {
                    log::warn!(
                        "Skipping {} while spotting ticket {}: {}",
                        format_connector_id(connector.connector_id()),
                        tid,
                        err
                    );
                }
            }
        }
        Ok(None)
    }

    pub async fn ticket_details(&self, tid: &str, connector_id: &str) -> Result<Option<Ticket>> {
        self.by_id(connector_id)?.ticket_details(tid).await
    }

    pub async fn assign(&self, tid: &str, connector_id: &str) -> Result<bool> {
        self.by_id(connector_id)?.assign(tid).await
    }

    pub async fn set_in_progress(
        &self,
        tid: &str,
        connector_id: &str,
        assign: bool,
    ) -> Result<bool> {
        self.by_id(connector_id)?.set_in_progress(tid, assign).await
    }
}

/// Human-readable backend name for an internal connector id.
///
/// "connector.redmine" becomes "Redmine". Pure; used only in messages.
pub fn format_connector_id(connector_id: &str) -> String {
    let name = connector_id
        .strip_prefix("connector.")
        .unwrap_or(connector_id);
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
