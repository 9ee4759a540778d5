//! Authentication middleware

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::error::Result;
use crate::services::tokens::{Claims, TokenError, TokenKind};
use crate::AppState;

/// Authenticated user info stored in request extensions
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub claims: Claims,
}

impl AuthenticatedUser {
    /// Sensitive operations need a token issued straight from a password login
    pub fn require_fresh(&self) -> std::result::Result<(), TokenError> {
        if !self.claims.fresh {
            return Err(TokenError::NotFresh);
        }
        Ok(())
    }
}

/// Extract the raw bearer token
fn bearer_token(headers: &HeaderMap) -> std::result::Result<&str, TokenError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(TokenError::Missing)?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(TokenError::Invalid)
}

async fn authenticate(
    state: &AppState,
    mut request: Request<Body>,
    next: Next,
    kind: TokenKind,
) -> Result<Response> {
    let claims = match bearer_token(request.headers()).and_then(|t| state.tokens.verify(t, kind)) {
        Ok(claims) => claims,
        Err(err) => {
            if err == TokenError::Revoked {
                tracing::warn!(path = %request.uri().path(), "Rejected revoked token");
            }
            return Err(err.into());
        }
    };

    request.extensions_mut().insert(AuthenticatedUser {
        user_id: claims.sub,
        claims,
    });

    Ok(next.run(request).await)
}

/// Auth middleware for regular endpoints - requires an access token
pub async fn require_access(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response> {
    authenticate(&state, request, next, TokenKind::Access).await
}

/// Auth middleware for POST /refresh - requires a refresh token
pub async fn require_refresh(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response> {
    authenticate(&state, request, next, TokenKind::Refresh).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_missing_header() {
        assert_eq!(bearer_token(&HeaderMap::new()), Err(TokenError::Missing));
    }

    #[test]
    fn test_bearer_token_wrong_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), Err(TokenError::Invalid));
    }

    #[test]
    fn test_bearer_token_extracted() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers), Ok("abc.def.ghi"));
    }
}
