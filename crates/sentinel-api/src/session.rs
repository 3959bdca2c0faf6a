//! Explicit session context.
//!
//! The bearer token is produced by the (external) credential endpoint and
//! carried in this struct for the lifetime of the session: created at
//! authentication, handed to the [`crate::ApiClient`] at construction,
//! dropped at logout or expiry.  No component reads token state from
//! ambient storage.

use chrono::{DateTime, Utc};

/// Credentials and identity for one authenticated session.
#[derive(Clone)]
pub struct SessionContext {
    token: String,
    /// Operator display name, when the credential endpoint supplied one.
    pub operator: Option<String>,
    /// When this session was established.
    pub issued_at: DateTime<Utc>,
}

impl SessionContext {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            operator: None,
            issued_at: Utc::now(),
        }
    }

    pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = Some(operator.into());
        self
    }

    /// The raw bearer token.
    pub fn token(&self) -> &str {
        &self.token
    }
}

// The token never appears in logs.
impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("token", &"<redacted>")
            .field("operator", &self.operator)
            .field("issued_at", &self.issued_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_token() {
        let session = SessionContext::new("secret-bearer").with_operator("ops-7");
        let rendered = format!("{session:?}");
        assert!(!rendered.contains("secret-bearer"));
        assert!(rendered.contains("<redacted>"));
    }
}
