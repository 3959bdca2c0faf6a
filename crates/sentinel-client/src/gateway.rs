//! Server gateway seam.
//!
//! The pipeline talks to the remote endpoints through this trait so the
//! poll transport can be swapped (fixed-interval pull today, a push
//! stream later) and so tests can run against an in-memory fake.

use async_trait::async_trait;

use sentinel_api::wire::{DmEntry, DmResponse, MessageRecord, ScanRequest, ScanResponse};
use sentinel_api::{ApiClient, ApiError};
use sentinel_shared::types::ChannelHandle;

/// Remote operations the pipeline depends on.
#[async_trait]
pub trait ServerGateway: Send + Sync + 'static {
    /// Submit message content for risk scanning and persistence.
    async fn scan(&self, request: &ScanRequest) -> Result<ScanResponse, ApiError>;

    /// Fetch the complete ordered message sequence for a channel.
    async fn fetch_channel(&self, channel: &ChannelHandle)
        -> Result<Vec<MessageRecord>, ApiError>;

    /// Resolve an identifier into a direct-message channel.
    async fn provision_dm(&self, identifier: &str) -> Result<DmResponse, ApiError>;

    /// List the currently known direct-message bindings.
    async fn list_dms(&self) -> Result<Vec<DmEntry>, ApiError>;
}

#[async_trait]
impl ServerGateway for ApiClient {
    async fn scan(&self, request: &ScanRequest) -> Result<ScanResponse, ApiError> {
        ApiClient::scan(self, request).await
    }

    async fn fetch_channel(
        &self,
        channel: &ChannelHandle,
    ) -> Result<Vec<MessageRecord>, ApiError> {
        ApiClient::fetch_messages(self, channel).await
    }

    async fn provision_dm(&self, identifier: &str) -> Result<DmResponse, ApiError> {
        ApiClient::provision_dm(self, identifier).await
    }

    async fn list_dms(&self) -> Result<Vec<DmEntry>, ApiError> {
        ApiClient::list_dms(self).await
    }
}
