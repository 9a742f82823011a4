use std::fmt;

use crate::constants::{RATE_LIMIT_KEY_PREFIX, UNKNOWN_CLIENT};

/// Who a request is attributed to for rate limiting.
///
/// Taken from a forwarded-address header, so it is only as trustworthy as the
/// proxy in front of the service. Every request without the header shares the
/// `unknown` bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientIdentity(String);

impl ClientIdentity {
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Self::unknown()
        } else {
            ClientIdentity(trimmed.to_string())
        }
    }

    pub fn unknown() -> Self {
        ClientIdentity(UNKNOWN_CLIENT.to_string())
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == UNKNOWN_CLIENT
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn rate_limit_key(&self) -> String {
        format!("{}{}", RATE_LIMIT_KEY_PREFIX, self.0)
    }
}

impl fmt::Display for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
