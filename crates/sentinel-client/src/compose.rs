//! Outbound message composition.
//!
//! A submitted draft becomes a [`Message`] in `Scanning` state with a
//! fresh client key and its integrity fingerprint computed once, here.
//! The scan request mirrors the same fields onto the wire.

use chrono::{DateTime, Utc};

use sentinel_api::wire::ScanRequest;
use sentinel_shared::constants::ATTACHMENT_PLACEHOLDER;
use sentinel_shared::fingerprint::fingerprint;
use sentinel_shared::types::{
    Attachment, ChannelHandle, ClientKey, Message, MessageStatus, RiskVerdict, Sender,
};

/// User input for one submission.
#[derive(Debug, Clone, Default)]
pub struct Draft {
    pub text: String,
    pub attachment: Option<Attachment>,
    pub ttl_seconds: Option<u32>,
    /// Server id of a quoted message; the preview is filled in by the
    /// server on reconciliation, not composed locally.
    pub reply_to: Option<u64>,
}

impl Draft {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    pub fn with_ttl(mut self, seconds: u32) -> Self {
        self.ttl_seconds = Some(seconds);
        self
    }

    pub fn with_reply_to(mut self, server_id: u64) -> Self {
        self.reply_to = Some(server_id);
        self
    }

    /// A draft with neither text nor attachment has nothing to send.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.attachment.is_none()
    }
}

/// Build the locally-optimistic message for a draft.
pub fn outbound(channel: ChannelHandle, draft: &Draft, now: DateTime<Utc>) -> Message {
    let digest = fingerprint(
        &draft.text,
        draft.attachment.as_ref().map(|a| a.name.as_str()),
        now,
    );

    Message {
        client_key: ClientKey::new(),
        server_id: None,
        text: draft.text.clone(),
        sender: Sender::Operator,
        timestamp: now,
        status: MessageStatus::Scanning,
        risk: None,
        attachment: draft.attachment.clone(),
        integrity_fingerprint: Some(digest),
        channel,
        ttl_seconds: draft.ttl_seconds,
        reply_to: None,
    }
}

/// Build the scan request for a composed message.
pub fn scan_request(message: &Message, reply_to: Option<u64>) -> ScanRequest {
    let lines = if message.text.is_empty() {
        ATTACHMENT_PLACEHOLDER.to_string()
    } else {
        message.text.clone()
    };

    ScanRequest {
        lines,
        file_url: message.attachment.as_ref().map(|a| a.url.clone()),
        file_type: message.attachment.as_ref().map(|a| a.media_type.clone()),
        file_size: message.attachment.as_ref().map(|a| a.size.clone()),
        integrity_hash: message.integrity_fingerprint.clone(),
        channel_id: message.channel.as_str().to_string(),
        ttl_seconds: message.ttl_seconds,
        client_key: message.client_key,
        reply_to_id: reply_to,
    }
}

/// Synthesize the canned counterpart reply (demo affordance).
pub fn canned_reply(channel: ChannelHandle, now: DateTime<Utc>) -> Message {
    Message {
        client_key: ClientKey::new(),
        server_id: None,
        text: "Copy that. proceeding with caution.".to_string(),
        sender: Sender::Counterpart,
        timestamp: now,
        status: MessageStatus::Sent,
        risk: Some(RiskVerdict::benign("Safe response")),
        attachment: None,
        integrity_fingerprint: None,
        channel,
        ttl_seconds: None,
        reply_to: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel() -> ChannelHandle {
        ChannelHandle::new("general")
    }

    #[test]
    fn test_outbound_starts_scanning_with_fingerprint() {
        let message = outbound(channel(), &Draft::text("status report"), Utc::now());
        assert_eq!(message.status, MessageStatus::Scanning);
        assert_eq!(message.sender, Sender::Operator);
        assert!(message.risk.is_none());
        assert!(message.server_id.is_none());
        assert_eq!(message.integrity_fingerprint.unwrap().len(), 64);
    }

    #[test]
    fn test_attachment_only_send_uses_placeholder() {
        let draft = Draft::default().with_attachment(Attachment {
            name: "map.png".into(),
            size: "4.2 KB".into(),
            media_type: "image/png".into(),
            url: "blob:map".into(),
        });
        assert!(!draft.is_empty());
        let message = outbound(channel(), &draft, Utc::now());
        let request = scan_request(&message, None);
        assert_eq!(request.lines, ATTACHMENT_PLACEHOLDER);
        assert_eq!(request.file_type.as_deref(), Some("image/png"));
        assert_eq!(request.integrity_hash, message.integrity_fingerprint);
    }

    #[test]
    fn test_empty_draft_detected() {
        assert!(Draft::text("   ").is_empty());
        assert!(!Draft::text("x").is_empty());
    }

    #[test]
    fn test_scan_request_carries_ttl_and_key() {
        let message = outbound(channel(), &Draft::text("hi").with_ttl(60), Utc::now());
        let request = scan_request(&message, Some(9));
        assert_eq!(request.ttl_seconds, Some(60));
        assert_eq!(request.client_key, message.client_key);
        assert_eq!(request.reply_to_id, Some(9));
    }

    #[test]
    fn test_canned_reply_is_sent_and_benign() {
        let reply = canned_reply(channel(), Utc::now());
        assert_eq!(reply.status, MessageStatus::Sent);
        assert_eq!(reply.sender, Sender::Counterpart);
        assert!(!reply.risk.unwrap().blocks());
    }
}
