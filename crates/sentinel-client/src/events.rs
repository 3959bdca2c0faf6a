//! Notifications sent from the pipeline task to the application.

use serde::Serialize;

use sentinel_shared::types::{
    ChannelHandle, ClientKey, DirectMessageBinding, Message, MessageStatus, RiskVerdict,
};

/// One observable state change in the pipeline.
#[derive(Debug, Clone, Serialize)]
pub enum PipelineEvent {
    /// A message was appended to the active channel (a submission or a
    /// synthesized counterpart reply).
    MessageAppended { message: Message },

    /// A scanning message reached its final disposition.
    MessageResolved {
        client_key: ClientKey,
        status: MessageStatus,
        verdict: RiskVerdict,
    },

    /// The active channel was rebuilt from a server snapshot.
    ChannelReconciled {
        channel: ChannelHandle,
        count: usize,
    },

    /// The active channel changed.
    ChannelSwitched { channel: ChannelHandle },

    /// A new direct-message binding was registered.
    DirectMessageRegistered { binding: DirectMessageBinding },

    /// The bearer token was rejected; the pipeline has shut down and the
    /// operator must re-authenticate.
    SessionExpired,
}
