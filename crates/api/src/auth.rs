//! Credential verification.
//!
//! The deployment model is a single shared admin secret, but handlers only
//! see the [`Authenticator`] trait so a future per-user scheme can replace
//! the implementation without touching route logic.

/// Verifies a presented token.
pub trait Authenticator: Send + Sync {
    fn verify(&self, token: &str) -> bool;
}

/// Compares against one statically configured secret.
pub struct StaticTokenAuth {
    token: String,
}

impl StaticTokenAuth {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl Authenticator for StaticTokenAuth {
    fn verify(&self, token: &str) -> bool {
        // An empty configured secret must never authenticate anything.
        !self.token.is_empty() && token == self.token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_token_verifies() {
        let auth = StaticTokenAuth::new("secret");
        assert!(auth.verify("secret"));
    }

    #[test]
    fn wrong_token_is_rejected() {
        let auth = StaticTokenAuth::new("secret");
        assert!(!auth.verify("other"));
        assert!(!auth.verify(""));
    }

    #[test]
    fn empty_configured_secret_rejects_everything() {
        let auth = StaticTokenAuth::new("");
        assert!(!auth.verify(""));
        assert!(!auth.verify("anything"));
    }
}
