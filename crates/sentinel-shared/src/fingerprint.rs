//! Send-time integrity fingerprint.
//!
//! A BLAKE3 digest over the message text, the attachment name, and the
//! creation instant, computed once at submission and displayed as
//! tamper evidence.  Nothing verifies it server-side; it is advisory.

use chrono::{DateTime, Utc};

/// Compute the hex-encoded fingerprint for a message being submitted.
pub fn fingerprint(
    text: &str,
    attachment_name: Option<&str>,
    created_at: DateTime<Utc>,
) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(text.as_bytes());
    hasher.update(attachment_name.unwrap_or_default().as_bytes());
    hasher.update(created_at.timestamp_millis().to_le_bytes().as_slice());
    hex::encode(hasher.finalize().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let a = fingerprint("hello", Some("report.pdf"), instant());
        let b = fingerprint("hello", Some("report.pdf"), instant());
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_fingerprint_covers_every_field() {
        let base = fingerprint("hello", Some("report.pdf"), instant());
        assert_ne!(base, fingerprint("hello!", Some("report.pdf"), instant()));
        assert_ne!(base, fingerprint("hello", Some("other.pdf"), instant()));
        assert_ne!(
            base,
            fingerprint(
                "hello",
                Some("report.pdf"),
                instant() + chrono::Duration::milliseconds(1)
            )
        );
    }

    #[test]
    fn test_missing_attachment_matches_empty_name() {
        // None and Some("") hash identically; the display layer never
        // distinguishes them.
        assert_eq!(
            fingerprint("hello", None, instant()),
            fingerprint("hello", Some(""), instant())
        );
    }
}
