//! Request tokens and stale-response detection.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one issued request. Later requests get larger tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Hands out request tokens. Shared by every request task.
#[derive(Debug, Default)]
pub struct TokenIssuer {
    last: AtomicU64,
}

impl TokenIssuer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next token. Tokens are unique and strictly increasing.
    pub fn issue(&self) -> RequestToken {
        RequestToken(self.last.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

/// The kinds of response the dashboard applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Latest,
    Live,
    History,
    Stats,
    SystemStats,
}

/// Remembers the newest applied token per resource.
///
/// A response issued before the one already applied for the same resource
/// is stale and must be dropped.
#[derive(Debug, Default)]
pub struct StaleGuard {
    applied: HashMap<Resource, RequestToken>,
}

impl StaleGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true (and records the token) if the response may be applied.
    pub fn accept(&mut self, resource: Resource, token: RequestToken) -> bool {
        match self.applied.get(&resource) {
            Some(last) if *last >= token => false,
            _ => {
                self.applied.insert(resource, token);
                true
            }
        }
    }

    pub fn last_applied(&self, resource: Resource) -> Option<RequestToken> {
        self.applied.get(&resource).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_increase() {
        let issuer = TokenIssuer::new();
        let a = issuer.issue();
        let b = issuer.issue();
        assert!(b > a);
        assert_eq!(a.value() + 1, b.value());
    }

    #[test]
    fn test_older_response_is_rejected() {
        let issuer = TokenIssuer::new();
        let first = issuer.issue();
        let second = issuer.issue();

        let mut guard = StaleGuard::new();
        assert!(guard.accept(Resource::Latest, second));
        assert!(!guard.accept(Resource::Latest, first));
        assert_eq!(guard.last_applied(Resource::Latest), Some(second));
    }

    #[test]
    fn test_in_order_responses_are_accepted() {
        let issuer = TokenIssuer::new();
        let mut guard = StaleGuard::new();
        for _ in 0..3 {
            assert!(guard.accept(Resource::Live, issuer.issue()));
        }
    }

    #[test]
    fn test_same_token_applies_once() {
        let issuer = TokenIssuer::new();
        let token = issuer.issue();
        let mut guard = StaleGuard::new();
        assert!(guard.accept(Resource::Stats, token));
        assert!(!guard.accept(Resource::Stats, token));
    }

    #[test]
    fn test_resources_are_independent() {
        let issuer = TokenIssuer::new();
        let history = issuer.issue();
        let latest = issuer.issue();

        let mut guard = StaleGuard::new();
        assert!(guard.accept(Resource::Latest, latest));
        assert!(guard.accept(Resource::History, history));
    }
}
