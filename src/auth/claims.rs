/// JWT Claims structure
///
/// Access and refresh tokens share one claim layout; `typ` records which kind
/// a token is, so a token minted for one purpose never verifies as the other.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (the user's email)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
    /// Unique token id
    pub jti: String,
    pub typ: TokenKind,
}

impl Claims {
    /// Claims for `subject` expiring `ttl` from now. A negative `ttl` yields
    /// claims that are already expired.
    pub fn new(subject: &str, kind: TokenKind, ttl: Duration, issuer: &str) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: subject.to_string(),
            exp: now + ttl.num_seconds(),
            iat: now,
            iss: issuer.to_string(),
            jti: Uuid::new_v4().to_string(),
            typ: kind,
        }
    }

    pub fn is_expired(&self) -> bool {
        let now = chrono::Utc::now().timestamp();
        self.exp < now
    }
}
