//! Token validation.
//!
//! The real identity provider sits outside the catalog; [`StaticTokenValidator`]
//! covers single-user installs, the admin CLI and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use collector_core::{Error, OwnerId, Result, TokenValidator};

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Fixed token → owner table.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenValidator {
    tokens: HashMap<String, OwnerId>,
}

impl StaticTokenValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>, owner: OwnerId) -> Self {
        self.tokens.insert(token.into(), owner);
        self
    }
}

#[async_trait]
impl TokenValidator for StaticTokenValidator {
    async fn validate(&self, token: &str) -> Result<OwnerId> {
        let token = token.trim();
        if token.is_empty() {
            return Err(Error::AccessDenied("missing token".to_string()));
        }
        self.tokens
            .get(token)
            .copied()
            .ok_or_else(|| Error::AccessDenied("unknown token".to_string()))
    }
}
