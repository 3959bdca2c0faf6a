//! Authenticated HTTP client for the Sentinel endpoints.

use tracing::debug;

use sentinel_shared::types::ChannelHandle;

use crate::error::ApiError;
use crate::session::SessionContext;
use crate::wire::{DmEntry, DmRequest, DmResponse, MessageRecord, ScanRequest, ScanResponse};

/// Thin wrapper over `reqwest` carrying the base URL and session.
///
/// Every method maps a 401 to [`ApiError::Unauthorized`] before anything
/// else; callers decide what each remaining failure means for their path
/// (fallback, retry-next-tick, or user-visible rejection).
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionContext,
}

impl ApiClient {
    /// Create a client against `server_url` for one authenticated session.
    pub fn new(server_url: impl Into<String>, session: SessionContext) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: server_url.into().trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        if !response.status().is_success() {
            return Err(ApiError::Status(response.status()));
        }
        Ok(response)
    }

    /// Submit message content for risk scanning and persistence.
    pub async fn scan(&self, request: &ScanRequest) -> Result<ScanResponse, ApiError> {
        let response = self
            .http
            .post(self.url("threat-intel/scan"))
            .bearer_auth(self.session.token())
            .json(request)
            .send()
            .await?;

        let response = Self::check(response)?;
        let scan: ScanResponse = response.json().await?;
        debug!(
            message_id = scan.message_id,
            channel = %request.channel_id,
            "Scan completed"
        );
        Ok(scan)
    }

    /// Fetch the complete ordered message sequence for a channel.
    pub async fn fetch_messages(
        &self,
        channel: &ChannelHandle,
    ) -> Result<Vec<MessageRecord>, ApiError> {
        let response = self
            .http
            .get(self.url("chat/messages"))
            .query(&[("channel_id", channel.as_str())])
            .bearer_auth(self.session.token())
            .send()
            .await?;

        let records: Vec<MessageRecord> = Self::check(response)?.json().await?;
        debug!(channel = %channel, count = records.len(), "Fetched channel snapshot");
        Ok(records)
    }

    /// Resolve an identifier into a direct-message channel.
    ///
    /// Any non-success status is reported as-is; the caller treats every
    /// failure short of 401 as "identifier not found".
    pub async fn provision_dm(&self, identifier: &str) -> Result<DmResponse, ApiError> {
        let response = self
            .http
            .post(self.url("chat/dm"))
            .bearer_auth(self.session.token())
            .json(&DmRequest {
                identifier: identifier.to_string(),
            })
            .send()
            .await?;

        Ok(Self::check(response)?.json().await?)
    }

    /// List the currently known direct-message bindings.
    pub async fn list_dms(&self) -> Result<Vec<DmEntry>, ApiError> {
        let response = self
            .http
            .get(self.url("chat/dms"))
            .bearer_auth(self.session.token())
            .send()
            .await?;

        Ok(Self::check(response)?.json().await?)
    }
}
