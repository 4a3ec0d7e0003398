use std::fmt;

/// Proof that the caller passed the external sign-in gate.
///
/// Every core operation takes a `&Session`; without one the views that
/// invoke them are never constructed.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
}

impl Session {
    /// Returns `None` for a blank token so an empty storage slot never
    /// counts as signed in.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        let token = token.trim();
        if token.is_empty() {
            None
        } else {
            Some(Self { token: token.to_string() })
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("token", &"<redacted>").finish()
    }
}
