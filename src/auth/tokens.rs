/// Token Service
///
/// Issues and verifies HS256 access and refresh tokens. Each kind has its
/// own secret and its own `typ` claim. Refresh tokens can additionally be
/// revoked through the injected `RevocationStore`.
///
/// Token lifecycle: issued -> valid -> expired | revoked. Verification only
/// ever reports `TokenMalformed`, `TokenExpired` or `TokenRevoked`.

use chrono::Duration;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;

use crate::auth::claims::{Claims, TokenKind};
use crate::auth::revocation::RevocationStore;
use crate::configuration::AuthSettings;
use crate::error::{AppError, AuthError};

struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl KeyPair {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

pub struct TokenService {
    access_keys: KeyPair,
    refresh_keys: KeyPair,
    issuer: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
    revocations: Arc<dyn RevocationStore>,
}

impl TokenService {
    pub fn new(config: &AuthSettings, revocations: Arc<dyn RevocationStore>) -> Self {
        Self {
            access_keys: KeyPair::from_secret(&config.access_secret),
            refresh_keys: KeyPair::from_secret(&config.refresh_secret),
            issuer: config.issuer.clone(),
            access_ttl: Duration::seconds(config.access_token_expiry),
            refresh_ttl: Duration::seconds(config.refresh_token_expiry),
            revocations,
        }
    }

    /// Configured lifetime of access tokens
    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Configured lifetime of refresh tokens
    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    pub fn issue_access(&self, subject: &str, ttl: Duration) -> Result<String, AppError> {
        self.issue(subject, TokenKind::Access, ttl, &self.access_keys)
    }

    pub fn issue_refresh(&self, subject: &str, ttl: Duration) -> Result<String, AppError> {
        self.issue(subject, TokenKind::Refresh, ttl, &self.refresh_keys)
    }

    /// Validate an access token and return its claims
    pub fn verify_access(&self, token: &str) -> Result<Claims, AuthError> {
        self.decode_checked(token, TokenKind::Access, &self.access_keys, true)
    }

    /// Validate a refresh token and return its claims
    ///
    /// The revocation store is consulted before any cryptographic work.
    pub async fn verify_refresh(&self, token: &str) -> Result<Claims, AppError> {
        if self.revocations.is_revoked(token).await? {
            tracing::warn!("Attempt to use revoked refresh token");
            return Err(AuthError::TokenRevoked.into());
        }

        Ok(self.decode_refresh(token)?)
    }

    /// Signature, issuer, kind and expiry checks for a refresh token, without
    /// looking at the revocation store.
    pub fn decode_refresh(&self, token: &str) -> Result<Claims, AuthError> {
        self.decode_checked(token, TokenKind::Refresh, &self.refresh_keys, true)
    }

    /// Signature, issuer and kind checks for a refresh token that may already
    /// be past its `exp`. Used by logout, which accepts expired tokens.
    pub fn decode_refresh_allow_expired(&self, token: &str) -> Result<Claims, AuthError> {
        self.decode_checked(token, TokenKind::Refresh, &self.refresh_keys, false)
    }

    /// Revoke a refresh token. Revoking twice is a no-op.
    pub async fn revoke(&self, refresh_token: &str) -> Result<(), AppError> {
        if !self.revocations.revoke(refresh_token).await? {
            tracing::debug!("Refresh token was already revoked");
        }
        Ok(())
    }

    fn issue(
        &self,
        subject: &str,
        kind: TokenKind,
        ttl: Duration,
        keys: &KeyPair,
    ) -> Result<String, AppError> {
        let claims = Claims::new(subject, kind, ttl, &self.issuer);

        encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
            .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }

    fn decode_checked(
        &self,
        token: &str,
        expected: TokenKind,
        keys: &KeyPair,
        check_expiry: bool,
    ) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.leeway = 0;
        validation.validate_exp = check_expiry;

        let claims = decode::<Claims>(token, &keys.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::warn!(kind = ?expected, "JWT validation error: {}", e);
                match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    _ => AuthError::TokenMalformed,
                }
            })?;

        if claims.typ != expected {
            tracing::warn!(expected = ?expected, found = ?claims.typ, "Token used for the wrong purpose");
            return Err(AuthError::TokenMalformed);
        }

        // Expiry is checked again against our own clock regardless of the
        // library's validation settings.
        if check_expiry && claims.is_expired() {
            return Err(AuthError::TokenExpired);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::revocation::InMemoryRevocationStore;

    fn get_test_config() -> AuthSettings {
        AuthSettings {
            access_secret: "access-secret-key-at-least-32-characters".to_string(),
            refresh_secret: "refresh-secret-key-at-least-32-characters".to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: 604800,
            issuer: "test".to_string(),
            password_hash_cost: 4,
        }
    }

    fn service() -> (TokenService, Arc<InMemoryRevocationStore>) {
        let store = Arc::new(InMemoryRevocationStore::new());
        (TokenService::new(&get_test_config(), store.clone()), store)
    }

    #[test]
    fn test_access_round_trip() {
        let (tokens, _) = service();

        let token = tokens
            .issue_access("alice@example.com", tokens.access_ttl())
            .expect("Failed to generate token");
        let claims = tokens.verify_access(&token).expect("Failed to validate token");

        assert_eq!(claims.sub, "alice@example.com");
        assert_eq!(claims.iss, "test");
        assert_eq!(claims.typ, TokenKind::Access);
    }

    #[tokio::test]
    async fn test_refresh_round_trip() {
        let (tokens, _) = service();

        let token = tokens
            .issue_refresh("alice@example.com", tokens.refresh_ttl())
            .unwrap();
        let claims = tokens.verify_refresh(&token).await.unwrap();

        assert_eq!(claims.sub, "alice@example.com");
        assert_eq!(claims.typ, TokenKind::Refresh);
    }

    #[test]
    fn test_already_expired_access_token() {
        let (tokens, _) = service();

        let token = tokens
            .issue_access("alice@example.com", Duration::seconds(-1))
            .unwrap();

        assert_eq!(
            tokens.verify_access(&token).unwrap_err(),
            AuthError::TokenExpired
        );
    }

    #[tokio::test]
    async fn test_already_expired_refresh_token() {
        let (tokens, _) = service();

        let token = tokens
            .issue_refresh("alice@example.com", Duration::seconds(-1))
            .unwrap();

        assert!(matches!(
            tokens.verify_refresh(&token).await,
            Err(AppError::Auth(AuthError::TokenExpired))
        ));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let (tokens, _) = service();

        assert_eq!(
            tokens.verify_access("invalid.token.here").unwrap_err(),
            AuthError::TokenMalformed
        );
        assert_eq!(
            tokens.verify_access("").unwrap_err(),
            AuthError::TokenMalformed
        );
    }

    #[test]
    fn test_tampered_token() {
        let (tokens, _) = service();

        let token = tokens
            .issue_access("alice@example.com", tokens.access_ttl())
            .unwrap();
        let tampered = format!("{}X", token);

        assert_eq!(
            tokens.verify_access(&tampered).unwrap_err(),
            AuthError::TokenMalformed
        );
    }

    #[test]
    fn test_wrong_issuer() {
        let (tokens, _) = service();
        let token = tokens
            .issue_access("alice@example.com", tokens.access_ttl())
            .unwrap();

        let mut config = get_test_config();
        config.issuer = "wrong-issuer".to_string();
        let other = TokenService::new(&config, Arc::new(InMemoryRevocationStore::new()));

        assert!(other.verify_access(&token).is_err());
    }

    #[tokio::test]
    async fn test_refresh_token_is_not_an_access_token() {
        let (tokens, _) = service();

        let refresh = tokens
            .issue_refresh("alice@example.com", tokens.refresh_ttl())
            .unwrap();

        assert_eq!(
            tokens.verify_access(&refresh).unwrap_err(),
            AuthError::TokenMalformed
        );
    }

    #[tokio::test]
    async fn test_access_token_is_not_a_refresh_token() {
        let (tokens, _) = service();

        let access = tokens
            .issue_access("alice@example.com", tokens.access_ttl())
            .unwrap();

        assert!(matches!(
            tokens.verify_refresh(&access).await,
            Err(AppError::Auth(AuthError::TokenMalformed))
        ));
    }

    #[test]
    fn test_kind_claim_checked_even_with_shared_secret() {
        let mut config = get_test_config();
        config.refresh_secret = config.access_secret.clone();
        let tokens = TokenService::new(&config, Arc::new(InMemoryRevocationStore::new()));

        let refresh = tokens
            .issue_refresh("alice@example.com", tokens.refresh_ttl())
            .unwrap();

        assert_eq!(
            tokens.verify_access(&refresh).unwrap_err(),
            AuthError::TokenMalformed
        );
    }

    #[tokio::test]
    async fn test_revoked_refresh_token_is_rejected() {
        let (tokens, store) = service();

        let refresh = tokens
            .issue_refresh("alice@example.com", tokens.refresh_ttl())
            .unwrap();
        tokens.revoke(&refresh).await.unwrap();

        assert!(matches!(
            tokens.verify_refresh(&refresh).await,
            Err(AppError::Auth(AuthError::TokenRevoked))
        ));
        // Revocation does not touch the signature checks.
        assert!(tokens.decode_refresh(&refresh).is_ok());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_revoking_twice_is_a_no_op() {
        let (tokens, store) = service();

        let refresh = tokens
            .issue_refresh("alice@example.com", tokens.refresh_ttl())
            .unwrap();
        tokens.revoke(&refresh).await.unwrap();
        tokens.revoke(&refresh).await.unwrap();

        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_revocation_is_per_token() {
        let (tokens, _) = service();

        let first = tokens
            .issue_refresh("alice@example.com", tokens.refresh_ttl())
            .unwrap();
        let second = tokens
            .issue_refresh("alice@example.com", tokens.refresh_ttl())
            .unwrap();
        assert_ne!(first, second);

        tokens.revoke(&first).await.unwrap();

        assert!(tokens.verify_refresh(&second).await.is_ok());
    }

    #[test]
    fn test_expired_refresh_token_decodes_when_expiry_is_ignored() {
        let (tokens, _) = service();

        let refresh = tokens
            .issue_refresh("alice@example.com", Duration::seconds(-5))
            .unwrap();

        assert_eq!(
            tokens.decode_refresh(&refresh).unwrap_err(),
            AuthError::TokenExpired
        );
        let claims = tokens.decode_refresh_allow_expired(&refresh).unwrap();
        assert_eq!(claims.sub, "alice@example.com");
        assert!(claims.is_expired());

        let access = tokens
            .issue_access("alice@example.com", Duration::seconds(-5))
            .unwrap();
        assert_eq!(
            tokens.decode_refresh_allow_expired(&access).unwrap_err(),
            AuthError::TokenMalformed
        );
        assert_eq!(
            tokens
                .decode_refresh_allow_expired(&format!("{}X", refresh))
                .unwrap_err(),
            AuthError::TokenMalformed
        );
    }

    #[tokio::test]
    async fn test_revoked_check_comes_before_expiry() {
        let (tokens, _) = service();

        let refresh = tokens
            .issue_refresh("alice@example.com", Duration::seconds(-1))
            .unwrap();
        tokens.revoke(&refresh).await.unwrap();

        assert!(matches!(
            tokens.verify_refresh(&refresh).await,
            Err(AppError::Auth(AuthError::TokenRevoked))
        ));
    }
}
