use std::time::Duration;

/// Application name
pub const APP_NAME: &str = "Sentinel";

/// Interval between full-state polls of the active channel
pub const POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Simulated scan latency before the classification round trip
pub const SCAN_DELAY: Duration = Duration::from_millis(1500);

/// Delay before the synthesized counterpart reply (demo affordance)
pub const AUTO_REPLY_DELAY: Duration = Duration::from_secs(2);

/// Placeholder scan body for attachment-only sends
pub const ATTACHMENT_PLACEHOLDER: &str = "[Encrypted File Attachment]";

/// Default base URL of the Sentinel API
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000/api/v1";

/// Handle of the channel selected at startup
pub const DEFAULT_CHANNEL: &str = "general";

/// Standing channel roster: (handle, display name, status label)
pub const CHANNEL_ROSTER: &[(&str, &str, &str)] = &[
    ("general", "Alpha Team", "ACTIVE"),
    ("bravo", "Bravo Squad", "STANDBY"),
    ("hq", "HQ Command", "ONLINE"),
    ("ops", "Special Ops", "ENCRYPTED"),
];

/// Status label for direct-message bindings
pub const DM_STATUS: &str = "ENCRYPTED";
