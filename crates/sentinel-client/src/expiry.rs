//! TTL expiry.
//!
//! A message submitted with a lifetime is excluded from the reconciled
//! sequence once that lifetime has elapsed after its *server-confirmed*
//! creation time.  There is no client-side countdown; expiry is enforced
//! as a filtering step during each poll-driven rebuild.

use chrono::{DateTime, Duration, Utc};

use sentinel_shared::types::Message;

/// Whether a message has outlived its requested TTL.
///
/// Messages without a TTL never expire.  Locally-pending messages (no
/// server id yet) never expire either: the TTL clock starts at the
/// server-confirmed creation time.
pub fn is_expired(message: &Message, now: DateTime<Utc>) -> bool {
    let Some(ttl) = message.ttl_seconds else {
        return false;
    };
    if message.server_id.is_none() {
        return false;
    }
    message.timestamp + Duration::seconds(i64::from(ttl)) <= now
}

/// Drop expired messages from a snapshot in place.
pub fn retain_live(messages: &mut Vec<Message>, now: DateTime<Utc>) {
    messages.retain(|message| !is_expired(message, now));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sentinel_shared::types::{ChannelHandle, ClientKey, MessageStatus, Sender};

    fn message(ttl_seconds: Option<u32>, server_id: Option<u64>) -> Message {
        Message {
            client_key: ClientKey::new(),
            server_id,
            text: "tick".into(),
            sender: Sender::Operator,
            timestamp: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
            status: MessageStatus::Sent,
            risk: None,
            attachment: None,
            integrity_fingerprint: None,
            channel: ChannelHandle::new("general"),
            ttl_seconds,
            reply_to: None,
        }
    }

    #[test]
    fn test_expires_after_ttl() {
        let msg = message(Some(10), Some(1));
        let created = msg.timestamp;
        assert!(!is_expired(&msg, created + Duration::seconds(9)));
        assert!(is_expired(&msg, created + Duration::seconds(10)));
        assert!(is_expired(&msg, created + Duration::seconds(11)));
    }

    #[test]
    fn test_no_ttl_never_expires() {
        let msg = message(None, Some(1));
        assert!(!is_expired(&msg, msg.timestamp + Duration::days(365)));
    }

    #[test]
    fn test_pending_message_never_expires() {
        // TTL counts from server-confirmed creation; an unpersisted
        // message has no such instant yet.
        let msg = message(Some(10), None);
        assert!(!is_expired(&msg, msg.timestamp + Duration::seconds(60)));
    }

    #[test]
    fn test_retain_live_filters_in_place() {
        let keep = message(Some(3600), Some(1));
        let drop = message(Some(10), Some(2));
        let now = keep.timestamp + Duration::seconds(60);
        let mut sequence = vec![keep.clone(), drop];
        retain_live(&mut sequence, now);
        assert_eq!(sequence.len(), 1);
        assert_eq!(sequence[0].client_key, keep.client_key);
    }
}
