//! Credential hashing and bearer-token issuance.
//!
//! Passwords are stored as Argon2id hashes; the login contract stays
//! byte-for-byte compatible with clients while never persisting plaintext.
//! Tokens are HS256 JWTs bound to the user identity via the `sub` claim.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifetime of minted access tokens.
const TOKEN_TTL_HOURS: i64 = 24;

/// Errors raised while hashing credentials or handling tokens.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Password hashing failed; carries the hasher's message.
    #[error("password hashing failed: {0}")]
    Hash(String),
    /// Token encoding or verification failed.
    #[error("token handling failed: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

/// Hash a password with a fresh per-call salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AuthError::Hash(err.to_string()))
}

/// Verify a password against a stored hash.
///
/// A malformed stored hash counts as a mismatch rather than an error so a
/// corrupted record cannot be distinguished from a wrong password by the
/// caller.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Access-token claims bound to a user identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the authenticated user's store identity.
    pub sub: String,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// Mints and verifies bearer tokens for authenticated identities.
///
/// Constructed once at startup from the signing secret and shared across
/// workers; both keys are immutable afterwards.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenIssuer {
    /// Build an issuer from the shared signing secret.
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Mint a token whose subject is the given identity.
    pub fn mint(&self, identity: &str, now: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = Claims {
            sub: identity.to_owned(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    /// Verify a token and return its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    //! Round-trip coverage for hashing and token issuance.
    use super::*;

    #[test]
    fn hash_then_verify_round_trips() {
        let hash = hash_password("correct horse battery staple").expect("hashing succeeds");
        assert!(verify_password("correct horse battery staple", &hash));
        assert!(!verify_password("wrong password", &hash));
    }

    #[test]
    fn hashes_are_salted() {
        let first = hash_password("pw").expect("hashing succeeds");
        let second = hash_password("pw").expect("hashing succeeds");
        assert_ne!(first, second);
    }

    #[test]
    fn malformed_stored_hash_is_a_mismatch() {
        assert!(!verify_password("pw", "not-a-phc-string"));
    }

    #[test]
    fn mint_then_verify_preserves_subject() {
        let issuer = TokenIssuer::from_secret(b"test secret");
        let token = issuer
            .mint("65f2a0c4b1d2e3f4a5b6c7d8", Utc::now())
            .expect("minting succeeds");
        let claims = issuer.verify(&token).expect("verification succeeds");
        assert_eq!(claims.sub, "65f2a0c4b1d2e3f4a5b6c7d8");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn foreign_tokens_are_rejected() {
        let issuer = TokenIssuer::from_secret(b"one secret");
        let other = TokenIssuer::from_secret(b"another secret");
        let token = issuer.mint("id", Utc::now()).expect("minting succeeds");
        assert!(other.verify(&token).is_err());
        assert!(issuer.verify("garbage").is_err());
    }
}
