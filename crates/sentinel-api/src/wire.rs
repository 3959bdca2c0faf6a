//! Wire DTOs for the Sentinel endpoints.
//!
//! Field names follow the server contract verbatim (snake_case, `me`/`them`
//! senders, SCREAMING risk levels).  Conversions into the domain
//! [`Message`] live here so the pipeline never touches raw records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sentinel_shared::types::{
    Attachment, ChannelHandle, ClientKey, Message, MessageStatus, OpsecRisk, PhishingRisk,
    ReplyPreview, RiskVerdict, Sender,
};

/// Display name used when an attachment record carries no media type.
const UNNAMED_ATTACHMENT: &str = "Encrypted File";

// ---------------------------------------------------------------------------
// Risk scan
// ---------------------------------------------------------------------------

/// Request body for `POST threat-intel/scan`.
#[derive(Debug, Clone, Serialize)]
pub struct ScanRequest {
    /// Message text, or a placeholder for attachment-only sends.
    pub lines: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integrity_hash: Option<String>,
    pub channel_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl_seconds: Option<u32>,
    /// Echoed back in fetch responses so the store can keep the message's
    /// identity stable across the optimistic/persisted boundary.
    pub client_key: ClientKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_id: Option<u64>,
}

/// Response body of the scan endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanResponse {
    pub message_id: u64,
    pub ai_score: f32,
    pub opsec_risk: OpsecRisk,
    pub phishing_risk: PhishingRisk,
    pub explanation: String,
}

impl ScanResponse {
    pub fn into_verdict(self) -> RiskVerdict {
        RiskVerdict {
            ai_score: self.ai_score,
            opsec_risk: self.opsec_risk,
            phishing_risk: self.phishing_risk,
            explanation: self.explanation,
        }
    }
}

// ---------------------------------------------------------------------------
// Message fetch
// ---------------------------------------------------------------------------

/// Quoted-message preview embedded in a fetch record.
#[derive(Debug, Clone, Deserialize)]
pub struct WireReply {
    pub id: u64,
    pub text: String,
    pub sender: Sender,
}

/// One message as returned by `GET chat/messages`.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageRecord {
    pub id: u64,
    /// Present for messages persisted through the scan endpoint; older
    /// rows may predate the key scheme.
    #[serde(default)]
    pub client_key: Option<ClientKey>,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    pub status: MessageStatus,
    #[serde(default)]
    pub risk: Option<RiskVerdict>,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub file_type: Option<String>,
    #[serde(default)]
    pub file_size: Option<String>,
    #[serde(default)]
    pub integrity_hash: Option<String>,
    #[serde(default)]
    pub ttl_seconds: Option<u32>,
    #[serde(default)]
    pub reply_to: Option<WireReply>,
}

impl MessageRecord {
    /// Convert a persisted record into the domain model.
    ///
    /// Records without an echoed client key get a fresh one; such rows can
    /// never collide with a locally-pending message.
    pub fn into_message(self, channel: &ChannelHandle) -> Message {
        let attachment = self.file_url.map(|url| Attachment {
            name: self
                .file_type
                .clone()
                .unwrap_or_else(|| UNNAMED_ATTACHMENT.to_string()),
            size: self.file_size.unwrap_or_default(),
            media_type: self.file_type.unwrap_or_default(),
            url,
        });

        Message {
            client_key: self.client_key.unwrap_or_default(),
            server_id: Some(self.id),
            text: self.text,
            sender: self.sender,
            timestamp: self.timestamp,
            status: self.status,
            risk: self.risk,
            attachment,
            integrity_fingerprint: self.integrity_hash,
            channel: channel.clone(),
            ttl_seconds: self.ttl_seconds,
            reply_to: self.reply_to.map(|r| ReplyPreview {
                server_id: r.id,
                text: r.text,
                sender: r.sender,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Direct messages
// ---------------------------------------------------------------------------

/// Request body for `POST chat/dm`.
#[derive(Debug, Clone, Serialize)]
pub struct DmRequest {
    /// Email-like identifier of the counterpart.
    pub identifier: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TargetUser {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl TargetUser {
    /// Preferred display name: full name, else email.
    pub fn display_name(&self) -> String {
        self.full_name
            .clone()
            .filter(|name| !name.is_empty())
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| "Unknown operator".to_string())
    }
}

/// Successful DM provisioning response.
#[derive(Debug, Clone, Deserialize)]
pub struct DmResponse {
    pub channel_id: String,
    pub target_user: TargetUser,
}

/// One entry of the DM listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct DmEntry {
    pub id: String,
    pub name: String,
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_shared::types::{OpsecRisk, PhishingRisk};

    #[test]
    fn test_scan_request_field_names() {
        let request = ScanRequest {
            lines: "status report".into(),
            file_url: None,
            file_type: None,
            file_size: None,
            integrity_hash: Some("abcd".into()),
            channel_id: "general".into(),
            ttl_seconds: Some(60),
            client_key: ClientKey::new(),
            reply_to_id: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["lines"], "status report");
        assert_eq!(json["channel_id"], "general");
        assert_eq!(json["ttl_seconds"], 60);
        assert_eq!(json["integrity_hash"], "abcd");
        // Absent optionals are omitted entirely, not sent as null.
        assert!(json.get("file_url").is_none());
    }

    #[test]
    fn test_scan_response_parses_server_shape() {
        let json = r#"{
            "message_id": 17,
            "ai_score": 12.5,
            "opsec_risk": "SAFE",
            "phishing_risk": "HIGH",
            "explanation": "Phishing Risk detected: HIGH"
        }"#;
        let response: ScanResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.message_id, 17);
        let verdict = response.into_verdict();
        assert_eq!(verdict.opsec_risk, OpsecRisk::Safe);
        assert_eq!(verdict.phishing_risk, PhishingRisk::High);
    }

    #[test]
    fn test_message_record_parses_fetch_shape() {
        let json = r#"{
            "id": 42,
            "client_key": "7f3c2ad0-95a5-4c42-9d71-0b64c7a70e11",
            "text": "rendezvous confirmed",
            "sender": "them",
            "timestamp": "2024-06-01T12:00:00Z",
            "status": "sent",
            "risk": {
                "ai_score": 3.0,
                "opsec_risk": "SAFE",
                "phishing_risk": "LOW",
                "explanation": "Analysis complete"
            },
            "file_url": "https://blobs.example/x",
            "file_type": "application/pdf",
            "file_size": "12.3 KB",
            "integrity_hash": "ff00",
            "ttl_seconds": 10
        }"#;
        let record: MessageRecord = serde_json::from_str(json).unwrap();
        let message = record.into_message(&ChannelHandle::new("general"));

        assert_eq!(message.server_id, Some(42));
        assert_eq!(message.sender, Sender::Counterpart);
        assert_eq!(message.status, MessageStatus::Sent);
        assert_eq!(message.ttl_seconds, Some(10));
        let attachment = message.attachment.unwrap();
        assert_eq!(attachment.name, "application/pdf");
        assert_eq!(attachment.size, "12.3 KB");
    }

    #[test]
    fn test_message_record_minimal_fields() {
        // The fetch contract marks everything beyond the core fields
        // optional; a bare record must still parse.
        let json = r#"{
            "id": 1,
            "text": "Status report for sector 7?",
            "sender": "them",
            "timestamp": "2024-06-01T11:55:00Z",
            "status": "sent"
        }"#;
        let record: MessageRecord = serde_json::from_str(json).unwrap();
        assert!(record.client_key.is_none());
        let message = record.into_message(&ChannelHandle::new("general"));
        assert!(message.attachment.is_none());
        assert!(message.risk.is_none());
    }

    #[test]
    fn test_target_user_display_name_prefers_full_name() {
        let user: TargetUser =
            serde_json::from_str(r#"{"full_name": "Dana Ops", "email": "dana@unit.mil"}"#)
                .unwrap();
        assert_eq!(user.display_name(), "Dana Ops");

        let email_only: TargetUser = serde_json::from_str(r#"{"email": "dana@unit.mil"}"#).unwrap();
        assert_eq!(email_only.display_name(), "dana@unit.mil");
    }
}
