//! Signed session-token issuance, verification, and refresh.
//!
//! Tokens are HS256-signed JWTs containing a [`Claims`] payload. Two token
//! classes exist and are never interchangeable: [`TokenClass::Access`] travels
//! in the `Authorization: Bearer` header and [`TokenClass::Session`] in the
//! `token` cookie. Tokens are stateless; there is no server-side revocation.
//!
//! Expiry is checked against an explicit `now` rather than by `jsonwebtoken`
//! so every `*_at` method is deterministic under test.

use std::ops::RangeInclusive;

use booking_core::types::{DbId, Timestamp};
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::{ensure_range, parse_env, require_env, ConfigError};

/// Default access token expiry in minutes.
const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 15;
/// Default session token expiry in hours.
const DEFAULT_SESSION_EXPIRY_HOURS: i64 = 24;
/// Default window before expiry in which a token may be refreshed.
const DEFAULT_REFRESH_WINDOW_SECS: i64 = 30;

const ACCESS_EXPIRY_MINS_RANGE: RangeInclusive<i64> = 1..=24 * 60;
const SESSION_EXPIRY_HOURS_RANGE: RangeInclusive<i64> = 1..=365 * 24;
const REFRESH_WINDOW_SECS_RANGE: RangeInclusive<i64> = 0..=3600;

/// Which transport a token was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenClass {
    /// Short-lived bearer token for the `Authorization` header.
    Access,
    /// Longer-lived token carried by the `token` cookie.
    Session,
}

impl std::fmt::Display for TokenClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenClass::Access => f.write_str("access"),
            TokenClass::Session => f.write_str("session"),
        }
    }
}

/// JWT claims embedded in every token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject -- the user's id.
    pub sub: DbId,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Token class the token was issued for.
    pub kind: TokenClass,
}

/// Reasons a token is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("Token is malformed")]
    Malformed,

    #[error("Token signature is invalid")]
    SignatureInvalid,

    #[error("Token has expired")]
    Expired,

    #[error("Expected a {expected} token but received a {found} token")]
    WrongClass {
        expected: TokenClass,
        found: TokenClass,
    },

    #[error("Token is not yet eligible for refresh ({remaining_secs}s remaining)")]
    NotYetEligible { remaining_secs: i64 },

    #[error("Token could not be signed: {0}")]
    Signing(String),
}

/// Configuration for token generation and validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Access token lifetime in minutes (default: 15).
    pub access_token_expiry_mins: i64,
    /// Session token lifetime in hours (default: 24).
    pub session_token_expiry_hours: i64,
    /// Seconds before expiry from which refresh is allowed (default: 30).
    pub refresh_window_secs: i64,
}

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var                    | Required | Default |
    /// |----------------------------|----------|---------|
    /// | `JWT_SECRET`               | **yes**  | --      |
    /// | `JWT_ACCESS_EXPIRY_MINS`   | no       | `15`    |
    /// | `JWT_SESSION_EXPIRY_HOURS` | no       | `24`    |
    /// | `JWT_REFRESH_WINDOW_SECS`  | no       | `30`    |
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            secret: require_env("JWT_SECRET")?,
            access_token_expiry_mins: parse_env(
                "JWT_ACCESS_EXPIRY_MINS",
                DEFAULT_ACCESS_EXPIRY_MINS,
            )?,
            session_token_expiry_hours: parse_env(
                "JWT_SESSION_EXPIRY_HOURS",
                DEFAULT_SESSION_EXPIRY_HOURS,
            )?,
            refresh_window_secs: parse_env("JWT_REFRESH_WINDOW_SECS", DEFAULT_REFRESH_WINDOW_SECS)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Lifetimes must be positive and bounded; the refresh window may be zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_range(
            "JWT_ACCESS_EXPIRY_MINS",
            self.access_token_expiry_mins,
            ACCESS_EXPIRY_MINS_RANGE,
        )?;
        ensure_range(
            "JWT_SESSION_EXPIRY_HOURS",
            self.session_token_expiry_hours,
            SESSION_EXPIRY_HOURS_RANGE,
        )?;
        ensure_range(
            "JWT_REFRESH_WINDOW_SECS",
            self.refresh_window_secs,
            REFRESH_WINDOW_SECS_RANGE,
        )?;
        Ok(())
    }

    /// Lifetime of a freshly issued token of `class`, or `None` if the
    /// configured value does not fit a [`Duration`].
    pub fn ttl(&self, class: TokenClass) -> Option<Duration> {
        match class {
            TokenClass::Access => Duration::try_minutes(self.access_token_expiry_mins),
            TokenClass::Session => Duration::try_hours(self.session_token_expiry_hours),
        }
    }
}

/// A freshly signed token and its lifetime.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    /// Seconds until the token expires.
    pub expires_in: i64,
    pub claims: Claims,
}

/// Issues, verifies, and refreshes tokens with an injected signing key.
pub struct TokenService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    /// Reads claims without checking the signature, for the expiry check.
    unverified: Validation,
}

impl TokenService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        let mut unverified = validation.clone();
        unverified.insecure_disable_signature_validation();

        Self {
            config,
            encoding_key,
            decoding_key,
            validation,
            unverified,
        }
    }

    /// Issue a token of `class` for `subject`, expiring one TTL from now.
    pub fn issue(&self, subject: DbId, class: TokenClass) -> Result<IssuedToken, TokenError> {
        self.issue_at(subject, class, Utc::now())
    }

    pub fn issue_at(
        &self,
        subject: DbId,
        class: TokenClass,
        now: Timestamp,
    ) -> Result<IssuedToken, TokenError> {
        let out_of_range = || TokenError::Signing(format!("{class} token lifetime is out of range"));
        let ttl = self.config.ttl(class).ok_or_else(out_of_range)?;
        let expires_at = now.checked_add_signed(ttl).ok_or_else(out_of_range)?;
        let claims = Claims {
            sub: subject,
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
            kind: class,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        Ok(IssuedToken {
            token,
            expires_in: ttl.num_seconds(),
            claims,
        })
    }

    /// Verify a token presented over the transport bound to `class` and
    /// return its subject.
    pub fn verify(&self, token: &str, class: TokenClass) -> Result<DbId, TokenError> {
        self.verify_at(token, class, Utc::now())
    }

    pub fn verify_at(
        &self,
        token: &str,
        class: TokenClass,
        now: Timestamp,
    ) -> Result<DbId, TokenError> {
        self.verified_claims_at(token, class, now)
            .map(|claims| claims.sub)
    }

    /// Exchange a token that is close to expiry for a new one of the same
    /// class and subject.
    pub fn refresh(&self, token: &str, class: TokenClass) -> Result<IssuedToken, TokenError> {
        self.refresh_at(token, class, Utc::now())
    }

    pub fn refresh_at(
        &self,
        token: &str,
        class: TokenClass,
        now: Timestamp,
    ) -> Result<IssuedToken, TokenError> {
        let claims = self.verified_claims_at(token, class, now)?;

        let remaining_secs = claims.exp - now.timestamp();
        if remaining_secs > self.config.refresh_window_secs {
            return Err(TokenError::NotYetEligible { remaining_secs });
        }

        self.issue_at(claims.sub, class, now)
    }

    /// Expiry, then signature, then class. A past `exp` is reported as
    /// [`TokenError::Expired`] whoever signed the token.
    fn verified_claims_at(
        &self,
        token: &str,
        class: TokenClass,
        now: Timestamp,
    ) -> Result<Claims, TokenError> {
        let unverified = decode::<Claims>(token, &self.decoding_key, &self.unverified)
            .map_err(|_| TokenError::Malformed)?
            .claims;
        if now.timestamp() > unverified.exp {
            return Err(TokenError::Expired);
        }

        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
                _ => TokenError::Malformed,
            })?
            .claims;

        if claims.kind != class {
            return Err(TokenError::WrongClass {
                expected: class,
                found: claims.kind,
            });
        }
        Ok(claims)
    }
}
