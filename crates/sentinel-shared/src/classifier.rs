//! Rule-based risk classifier.
//!
//! This is the local fallback path, used only when the remote classifier
//! is unreachable.  Categorical outputs are deterministic; the AI score is
//! a bounded stand-in for a real confidence value.

use std::sync::OnceLock;

use rand::Rng;
use regex::Regex;

use crate::types::{OpsecRisk, PhishingRisk, RiskVerdict};

/// Critical vocabulary; any hit is an immediate HIGH.
const CRITICAL_TERMS: &[&str] = &[
    "bomb",
    "attack",
    "kill",
    "assassinate",
    "terrorism",
    "explosive",
    "weapon",
    "target",
    "strike",
    "ied",
    "hostage",
];

/// Deployment keywords, rated HIGH alongside the critical list.
const DEPLOYMENT_TERMS: &[&str] = &["deployment", "0600"];

/// Location-disclosure keywords, rated SENSITIVE.
const LOCATION_TERMS: &[&str] = &["location"];

/// Known call-to-click lure phrases.
const LURE_PHRASES: &[&str] = &["click here"];

// Matches "1400 hours" and "14:00Z" spellings (input is lower-cased).
fn military_time() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d{4}\s*hours|\d{2}:\d{2}z").expect("valid pattern"))
}

/// Classify message text into a [`RiskVerdict`].
pub fn classify(text: &str) -> RiskVerdict {
    let lower = text.to_lowercase();

    let opsec_risk = if CRITICAL_TERMS.iter().any(|t| lower.contains(t))
        || DEPLOYMENT_TERMS.iter().any(|t| lower.contains(t))
        || military_time().is_match(&lower)
    {
        OpsecRisk::High
    } else if LOCATION_TERMS.iter().any(|t| lower.contains(t)) {
        OpsecRisk::Sensitive
    } else {
        OpsecRisk::Safe
    };

    let phishing_risk = if LURE_PHRASES.iter().any(|p| lower.contains(p)) {
        PhishingRisk::High
    } else {
        PhishingRisk::Low
    };

    RiskVerdict {
        ai_score: rand::thread_rng().gen_range(0.0..20.0),
        opsec_risk,
        phishing_risk,
        explanation: "Automated scan complete.".to_string(),
    }
}
