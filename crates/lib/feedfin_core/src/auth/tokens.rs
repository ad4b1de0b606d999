//! Signed, time-bounded session tokens.
//!
//! Tokens are HMAC-signed JWTs. The codec owns the temporal claims:
//! `issued_at` and `expires_at`, unix milliseconds, are stamped on encode and
//! stripped on decode, so callers only ever see application claims.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use super::AuthError;

/// Application claims carried by a token.
pub type Claims = Map<String, Value>;

/// Reserved claim holding the issue instant (unix milliseconds).
pub const ISSUED_AT_CLAIM: &str = "issued_at";
/// Reserved claim holding the expiry instant (unix milliseconds).
pub const EXPIRES_AT_CLAIM: &str = "expires_at";

/// Length of secrets produced by [`generate_secret`].
const GENERATED_SECRET_LEN: usize = 64;

/// HMAC signing algorithms a codec can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SigningAlgorithm {
    Hs256,
    Hs384,
    #[default]
    Hs512,
}

impl From<SigningAlgorithm> for Algorithm {
    fn from(alg: SigningAlgorithm) -> Self {
        match alg {
            SigningAlgorithm::Hs256 => Algorithm::HS256,
            SigningAlgorithm::Hs384 => Algorithm::HS384,
            SigningAlgorithm::Hs512 => Algorithm::HS512,
        }
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SigningAlgorithm::Hs256 => "HS256",
            SigningAlgorithm::Hs384 => "HS384",
            SigningAlgorithm::Hs512 => "HS512",
        })
    }
}

#[derive(Debug, Error)]
#[error("unsupported signing algorithm: {0}")]
pub struct UnsupportedAlgorithm(pub String);

impl FromStr for SigningAlgorithm {
    type Err = UnsupportedAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "HS256" => Ok(SigningAlgorithm::Hs256),
            "HS384" => Ok(SigningAlgorithm::Hs384),
            "HS512" => Ok(SigningAlgorithm::Hs512),
            _ => Err(UnsupportedAlgorithm(s.to_string())),
        }
    }
}

/// Encodes claims into signed tokens and validates tokens back into claims.
///
/// Bound to one immutable signing context `(secret, algorithm, duration)`.
/// Tokens only validate under a codec sharing both secret and algorithm.
#[derive(Clone)]
pub struct TokenCodec {
    algorithm: SigningAlgorithm,
    duration: Duration,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &self.algorithm)
            .field("duration", &self.duration)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(secret: &str, algorithm: SigningAlgorithm, duration: Duration) -> Self {
        // Only the bound algorithm is accepted. The time window is checked in
        // `decode_at` with exclusive expiry and no leeway.
        let mut validation = Validation::new(algorithm.into());
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        Self {
            algorithm,
            duration,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Sign `claims` into a token valid from now for the codec's duration.
    pub fn encode(&self, claims: &Claims) -> Result<String, AuthError> {
        self.encode_at(claims, Utc::now())
    }

    /// Sign `claims` as if issued at `now`.
    ///
    /// Caller-supplied `issued_at`/`expires_at` are overwritten by the codec's own.
    pub fn encode_at(&self, claims: &Claims, now: DateTime<Utc>) -> Result<String, AuthError> {
        let expires_at = now
            .checked_add_signed(self.duration)
            .ok_or_else(|| AuthError::Internal("token duration out of range".into()))?;

        let mut payload = claims.clone();
        payload.insert(ISSUED_AT_CLAIM.into(), Value::from(now.timestamp_millis()));
        payload.insert(EXPIRES_AT_CLAIM.into(), Value::from(expires_at.timestamp_millis()));

        encode(
            &Header::new(self.algorithm.into()),
            &payload,
            &self.encoding_key,
        )
        .map_err(|e| AuthError::Internal(format!("jwt encode: {e}")))
    }

    /// Validate `token` against the current time, returning its application claims.
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        self.decode_at(token, Utc::now())
    }

    /// Validate `token` as of `now`.
    ///
    /// A token is valid iff its signature verifies under this codec and
    /// `issued_at <= now < expires_at`, compared in milliseconds.
    pub fn decode_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let mut claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                debug!(error = %e, "token failed verification");
                AuthError::InvalidToken
            })?
            .claims;

        let issued_at = take_timestamp(&mut claims, ISSUED_AT_CLAIM)?;
        let expires_at = take_timestamp(&mut claims, EXPIRES_AT_CLAIM)?;
        let now = now.timestamp_millis();

        if now < issued_at {
            debug!(issued_at, now, "token used before its issue time");
            return Err(AuthError::InvalidToken);
        }
        if now >= expires_at {
            debug!(expires_at, now, "token expired");
            return Err(AuthError::InvalidToken);
        }

        Ok(claims)
    }
}

/// Remove a reserved temporal claim, requiring it to be an integer.
fn take_timestamp(claims: &mut Claims, key: &str) -> Result<i64, AuthError> {
    match claims.remove(key).as_ref().and_then(Value::as_i64) {
        Some(ts) => Ok(ts),
        None => {
            debug!(claim = key, "token missing temporal claim");
            Err(AuthError::InvalidToken)
        }
    }
}

/// Generate a random alphanumeric signing secret.
pub fn generate_secret() -> String {
    rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_SECRET_LEN)
        .map(char::from)
        .collect()
}
