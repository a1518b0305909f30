//! JWT token generation and verification (HS512, shared secret).

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::debug;

use super::TokenError;
use crate::config::JwtConfig;
use crate::models::auth::{TokenClaims, UserIdentity};
use crate::uuid::token_id;

const ALGORITHM: Algorithm = Algorithm::HS512;

/// Issues and verifies the tokens of one application.
///
/// Built once from [`JwtConfig`] at startup and shared behind an `Arc`.
#[derive(Clone)]
pub struct JwtChecker {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    subject: String,
    context_key: String,
    duration: Duration,
}

impl fmt::Debug for JwtChecker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtChecker")
            .field("issuer", &self.issuer)
            .field("subject", &self.subject)
            .field("context_key", &self.context_key)
            .field("duration", &self.duration)
            .finish_non_exhaustive()
    }
}

impl JwtChecker {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.set_required_spec_claims(&["exp", "nbf", "iss"]);
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            issuer: config.issuer.clone(),
            subject: config.audience.clone(),
            context_key: config.context_key.clone(),
            duration: Duration::minutes(config.duration_minutes),
        }
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Label used when the verified claims are attached to a request.
    pub fn context_key(&self) -> &str {
        &self.context_key
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Signs a token for `user`, valid from now for the configured duration.
    pub fn issue_token(&self, user: &UserIdentity) -> Result<String, TokenError> {
        self.issue_token_at(user, Utc::now())
    }

    /// Signs a token as if issued at `now`.
    pub fn issue_token_at(
        &self,
        user: &UserIdentity,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = self.claims_for(user, now);
        debug!(jti = %claims.jti, login = %user.login, exp = claims.exp, "issuing token");
        encode(&Header::new(ALGORITHM), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    fn claims_for(&self, user: &UserIdentity, now: DateTime<Utc>) -> TokenClaims {
        let iat = now.timestamp();
        TokenClaims {
            jti: token_id(),
            iss: self.issuer.clone(),
            sub: self.subject.clone(),
            iat,
            nbf: iat,
            exp: (now + self.duration).timestamp(),
            user: user.clone(),
        }
    }

    /// Verifies signature and validity window, and decodes the claims.
    pub fn parse_token(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(TokenError::Malformed("token is empty".to_string()));
        }
        decode::<TokenClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| classify(e.kind()))
    }
}

fn classify(kind: &ErrorKind) -> TokenError {
    match kind {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::ImmatureSignature => TokenError::NotYetValid,
        ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        ErrorKind::InvalidToken => TokenError::Malformed("wrong segment count".to_string()),
        ErrorKind::InvalidAlgorithm => TokenError::Malformed("unexpected algorithm".to_string()),
        ErrorKind::Base64(e) => TokenError::Malformed(e.to_string()),
        ErrorKind::Utf8(e) => TokenError::Malformed(e.to_string()),
        ErrorKind::Json(e) => TokenError::InvalidClaims(e.to_string()),
        ErrorKind::MissingRequiredClaim(c) => {
            TokenError::InvalidClaims(format!("missing required claim {c}"))
        }
        other => TokenError::InvalidClaims(format!("{other:?}")),
    }
}
