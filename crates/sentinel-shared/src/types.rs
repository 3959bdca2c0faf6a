//! Domain model for the message pipeline.
//!
//! Every struct derives `Serialize` and `Deserialize` so it can be handed
//! directly to a UI layer or logged as structured JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Client-generated idempotency key, assigned once at submission.
///
/// The message store is keyed by this value rather than by the
/// server-assigned id, so a poll-driven replacement of a message with the
/// server's persisted copy keeps its identity stable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ClientKey(pub Uuid);

impl ClientKey {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn short(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for ClientKey {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClientKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle of a channel or direct-message stream, unique within a session.
///
/// Standing channels use short names ("general", "bravo"); direct-message
/// channels use the server's `dm_<a>_<b>` scheme.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ChannelHandle(pub String);

impl ChannelHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_direct(&self) -> bool {
        self.0.starts_with("dm_")
    }
}

impl std::fmt::Display for ChannelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Risk verdict
// ---------------------------------------------------------------------------

/// Operational-security sensitivity of a message's content.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum OpsecRisk {
    Safe,
    Sensitive,
    High,
}

/// Phishing-lure probability of a message's content.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum PhishingRisk {
    Low,
    Moderate,
    High,
}

/// Immutable result of a risk classification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskVerdict {
    /// AI-generated-content confidence, 0–100.
    pub ai_score: f32,
    pub opsec_risk: OpsecRisk,
    pub phishing_risk: PhishingRisk,
    pub explanation: String,
}

impl RiskVerdict {
    /// Whether this verdict blocks delivery.
    pub fn blocks(&self) -> bool {
        self.opsec_risk == OpsecRisk::High
    }

    /// An all-clear verdict, used for synthesized counterpart replies.
    pub fn benign(explanation: impl Into<String>) -> Self {
        Self {
            ai_score: 5.0,
            opsec_risk: OpsecRisk::Safe,
            phishing_risk: PhishingRisk::Low,
            explanation: explanation.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// Who authored a message, from the operator's point of view.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Sender {
    /// The local operator ("me" on the wire).
    #[serde(rename = "me")]
    Operator,
    /// The remote counterpart ("them" on the wire).
    #[serde(rename = "them")]
    Counterpart,
}

/// Delivery lifecycle state.
///
/// `Scanning` is the initial state; `Sent` and `Blocked` are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Scanning,
    Sent,
    Blocked,
}

impl MessageStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, MessageStatus::Scanning)
    }
}

/// An encrypted file attached to a message.
///
/// `size` is the human-readable display string carried on the wire; it is
/// never parsed back into bytes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    pub size: String,
    pub media_type: String,
    /// Retrieval URL of the stored blob.
    pub url: String,
}

/// Preview of a quoted message, echoed by the persistence endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReplyPreview {
    pub server_id: u64,
    pub text: String,
    pub sender: Sender,
}

/// A single message in a channel's ordered sequence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Idempotency key; the message's identity in the local store.
    pub client_key: ClientKey,
    /// Persistence-assigned id, absent until the server's copy supersedes
    /// the locally-optimistic one.
    pub server_id: Option<u64>,
    /// Message body; may be empty when an attachment is present.
    pub text: String,
    pub sender: Sender,
    /// Local creation instant, overwritten by the server's timestamp on
    /// reconciliation.
    pub timestamp: DateTime<Utc>,
    pub status: MessageStatus,
    /// Risk verdict; absent while `status` is `Scanning`.
    pub risk: Option<RiskVerdict>,
    pub attachment: Option<Attachment>,
    /// Hex BLAKE3 digest computed at submission, advisory only.
    pub integrity_fingerprint: Option<String>,
    /// Channel this message belongs to.
    pub channel: ChannelHandle,
    /// Requested lifetime after server-confirmed creation; `None` means
    /// retained indefinitely.
    pub ttl_seconds: Option<u32>,
    pub reply_to: Option<ReplyPreview>,
}

impl Message {
    pub fn is_scanning(&self) -> bool {
        self.status == MessageStatus::Scanning
    }
}

// ---------------------------------------------------------------------------
// Channels and direct messages
// ---------------------------------------------------------------------------

/// A standing group channel, known at startup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Channel {
    pub handle: ChannelHandle,
    pub name: String,
    /// Display status label ("ACTIVE", "STANDBY", ...).
    pub status: String,
}

/// A resolved direct-message counterpart shown in the sidebar list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DirectMessageBinding {
    pub handle: ChannelHandle,
    pub display_name: String,
    pub status: String,
}
