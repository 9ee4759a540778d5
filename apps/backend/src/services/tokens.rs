//! JWT issuing, validation and revocation.
//!
//! Access tokens carry the caller's admin flag as a signed claim so no user
//! lookup is needed while serving requests. A token is accepted only when its
//! signature and expiry are valid, its `jti` has not been revoked, and its
//! `type` matches what the endpoint expects.

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::{ApiError, Result};
use crate::services::revocation::RevocationStore;

/// Token flavour, stored in the `type` claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

/// Signed token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub jti: Uuid,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
    #[serde(rename = "type")]
    pub kind: TokenKind,
    /// Issued directly from a password login
    pub fresh: bool,
    pub is_admin: bool,
}

/// Why a bearer token was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Request does not contain an access token.")]
    Missing,

    #[error("Signature verification failed.")]
    Invalid,

    #[error("The token has expired.")]
    Expired,

    #[error("The token has been revoked.")]
    Revoked,

    #[error("Only {} tokens are allowed.", .expected.as_str())]
    WrongKind { expected: TokenKind },

    #[error("The token is not fresh.")]
    NotFresh,
}

impl TokenError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Missing => "authorization_required",
            Self::Invalid | Self::WrongKind { .. } => "invalid_token",
            Self::Expired => "token_expired",
            Self::Revoked => "token_revoked",
            Self::NotFresh => "fresh_token_required",
        }
    }
}

/// Access and refresh token returned by a login
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Issues and validates HS256 tokens against an injected revocation store
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    access_ttl: chrono::Duration,
    refresh_ttl: chrono::Duration,
    revocations: Arc<dyn RevocationStore>,
}

impl TokenService {
    pub fn new(config: &AuthConfig, revocations: Arc<dyn RevocationStore>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_nbf = true;

        Self {
            encoding: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            access_ttl: config.access_token_ttl,
            refresh_ttl: config.refresh_token_ttl,
            revocations,
        }
    }

    /// Mint an access token; `fresh` only for password logins
    pub fn issue_access(&self, user_id: Uuid, is_admin: bool, fresh: bool) -> Result<String> {
        self.issue(user_id, is_admin, TokenKind::Access, fresh, self.access_ttl)
    }

    /// Mint a refresh token (never fresh)
    pub fn issue_refresh(&self, user_id: Uuid, is_admin: bool) -> Result<String> {
        self.issue(user_id, is_admin, TokenKind::Refresh, false, self.refresh_ttl)
    }

    /// Tokens handed out by a successful login
    pub fn issue_pair(&self, user_id: Uuid, is_admin: bool) -> Result<TokenPair> {
        Ok(TokenPair {
            access_token: self.issue_access(user_id, is_admin, true)?,
            refresh_token: self.issue_refresh(user_id, is_admin)?,
        })
    }

    fn issue(
        &self,
        user_id: Uuid,
        is_admin: bool,
        kind: TokenKind,
        fresh: bool,
        ttl: chrono::Duration,
    ) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            jti: Uuid::new_v4(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + ttl).timestamp(),
            kind,
            fresh,
            is_admin,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| ApiError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Decode a bearer token and check revocation and kind
    pub fn verify(&self, token: &str, expected: TokenKind) -> std::result::Result<Claims, TokenError> {
        let claims = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })?
            .claims;

        if self.revocations.is_revoked(claims.jti) {
            return Err(TokenError::Revoked);
        }
        if claims.kind != expected {
            return Err(TokenError::WrongKind { expected });
        }

        Ok(claims)
    }

    /// Reject the token's id on every later request
    pub fn revoke(&self, claims: &Claims) {
        self.revocations.revoke(claims.jti);
    }
}
