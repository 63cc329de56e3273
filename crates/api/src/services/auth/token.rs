//! Signed bearer tokens.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use harbormaster_core::UserId;

use super::AuthError;
use crate::config::MAX_TOKEN_TTL_DAYS;

/// JWT claims. `sub` is the user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// A freshly signed token and its expiry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies HS256 tokens bound to a user id.
///
/// There is no revocation list: a token stays valid until it expires, even
/// across logout.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// `ttl_days` is clamped to `1..=3650`.
    #[must_use]
    pub fn new(secret: &SecretString, ttl_days: i64) -> Self {
        let secret = secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl: Duration::days(ttl_days.clamp(1, MAX_TOKEN_TTL_DAYS)),
        }
    }

    /// Sign a token for `user_id`, valid from now for the configured TTL.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenSigning` if encoding fails.
    pub fn issue(&self, user_id: UserId) -> Result<IssuedToken, AuthError> {
        self.issue_at(user_id, Utc::now())
    }

    fn issue_at(&self, user_id: UserId, now: DateTime<Utc>) -> Result<IssuedToken, AuthError> {
        let expires_at = now.checked_add_signed(self.ttl).ok_or_else(|| {
            tracing::error!(ttl = ?self.ttl, "token expiry out of range");
            AuthError::TokenSigning
        })?;
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| {
                tracing::error!(error = %e, "failed to sign token");
                AuthError::TokenSigning
            })?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Check signature and expiry and return the user id the token is bound to.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for any malformed, tampered or
    /// expired token.
    pub fn verify(&self, token: &str) -> Result<UserId, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            tracing::debug!(error = %e, "token rejected");
            AuthError::InvalidToken
        })?;

        data.claims
            .sub
            .parse::<UserId>()
            .map_err(|_| AuthError::InvalidToken)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(&SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6"), 30)
    }

    #[test]
    fn test_issue_then_verify() {
        let tokens = service();
        let issued = tokens.issue(UserId::new(42)).unwrap();
        assert_eq!(tokens.verify(&issued.token).unwrap(), UserId::new(42));

        let remaining = issued.expires_at - Utc::now();
        assert!(remaining > Duration::days(29));
        assert!(remaining <= Duration::days(30));
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = service();
        let issued = tokens
            .issue_at(UserId::new(1), Utc::now() - Duration::days(31))
            .unwrap();
        assert!(matches!(
            tokens.verify(&issued.token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_foreign_signature_rejected() {
        let other = TokenService::new(&SecretString::from("zZ9#yY8@xX7!wW6$vV5%uU4^tT3&sS2*"), 30);
        let issued = other.issue(UserId::new(1)).unwrap();
        assert!(matches!(
            service().verify(&issued.token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_oversized_ttl_is_clamped() {
        let tokens =
            TokenService::new(&SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6"), i64::MAX);
        let issued = tokens.issue(UserId::new(7)).unwrap();
        assert!(issued.expires_at - Utc::now() <= Duration::days(MAX_TOKEN_TTL_DAYS));
        assert_eq!(tokens.verify(&issued.token).unwrap(), UserId::new(7));
    }

    #[test]
    fn test_expiry_overflow_is_an_error() {
        assert!(matches!(
            service().issue_at(UserId::new(1), DateTime::<Utc>::MAX_UTC),
            Err(AuthError::TokenSigning)
        ));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(
            service().verify("not.a.token"),
            Err(AuthError::InvalidToken)
        ));
    }
}
