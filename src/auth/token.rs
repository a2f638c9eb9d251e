//! Signed, time-limited bearer tokens.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::ServiceError;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;
const SECONDS_PER_MONTH: i64 = 30 * SECONDS_PER_DAY;
/// Longest lifetime a token may carry; matches the configuration ceiling.
pub const MAX_TTL_SECS: u64 = 10 * 365 * SECONDS_PER_DAY as u64;

/// JWT claims carried by every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Login email of the user the token was issued to
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and checks HS256 tokens. Built once at startup from the configured
/// secret and shared read-only afterwards.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl_secs", &self.ttl.num_seconds())
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        let ttl_secs = i64::try_from(ttl_secs.min(MAX_TTL_SECS)).unwrap_or(SECONDS_PER_DAY);
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::seconds(ttl_secs),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Human readable token lifetime, e.g. "6 month".
    pub fn expiration_label(&self) -> String {
        let secs = self.ttl.num_seconds();
        if secs >= SECONDS_PER_MONTH && secs % SECONDS_PER_MONTH == 0 {
            format!("{} month", secs / SECONDS_PER_MONTH)
        } else if secs >= SECONDS_PER_DAY && secs % SECONDS_PER_DAY == 0 {
            format!("{} days", secs / SECONDS_PER_DAY)
        } else {
            format!("{} seconds", secs)
        }
    }

    pub fn issue(&self, subject: &str) -> Result<String, ServiceError> {
        self.issue_at(subject, Utc::now())
    }

    pub fn issue_at(&self, subject: &str, issued_at: DateTime<Utc>) -> Result<String, ServiceError> {
        let claims = Claims {
            sub: subject.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ServiceError::JwtError(e.to_string()))
    }

    /// True only for a token with a good signature, the expected subject and
    /// an expiry still in the future. Never errors.
    pub fn validate(&self, token: &str, expected_subject: &str) -> bool {
        self.validate_at(token, expected_subject, Utc::now())
    }

    pub fn validate_at(&self, token: &str, expected_subject: &str, now: DateTime<Utc>) -> bool {
        match self.decode_claims(token) {
            Ok(claims) => claims.sub == expected_subject && claims.exp > now.timestamp(),
            Err(_) => false,
        }
    }

    /// Returns the subject after checking the signature only. Expiry is left
    /// to [`TokenService::validate`].
    pub fn extract_subject(&self, token: &str) -> Result<String, ServiceError> {
        self.decode_claims(token).map(|claims| claims.sub)
    }

    fn decode_claims(&self, token: &str) -> Result<Claims, ServiceError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| ServiceError::Unauthorized(format!("Invalid token: {}", e)))
    }
}
