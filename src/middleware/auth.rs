// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session JWT authentication middleware.

use crate::error::AppError;
use crate::models::Role;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Cookie carrying the session token.
pub const SESSION_COOKIE: &str = "card_session";

/// Session lifetime.
pub const SESSION_TTL_SECS: usize = 7 * 24 * 60 * 60;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user UID)
    pub sub: String,
    /// Role at sign-in time
    pub role: Role,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Authenticated user extracted from JWT.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub uid: String,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Admin access required".to_string()))
        }
    }

    /// Allow access to `uid`'s data for that user or an admin.
    pub fn require_self_or_admin(&self, uid: &str) -> Result<(), AppError> {
        if self.uid == uid || self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "You may only access your own records".to_string(),
            ))
        }
    }
}

/// Middleware that requires valid JWT authentication.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Try cookie first, then header
    let token = if let Some(cookie) = jar.get(SESSION_COOKIE) {
        cookie.value().to_string()
    } else {
        let auth_header = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
            Some(token) if !token.is_empty() => token.to_string(),
            _ => return Err(AppError::Unauthorized),
        }
    };

    let claims = verify_session_token(&token, &state.config.jwt_signing_key)?;
    let role = current_role(&state, &claims).await?;

    request.extensions_mut().insert(AuthUser {
        uid: claims.sub,
        role,
    });

    Ok(next.run(request).await)
}

/// Role to grant for a verified session.
///
/// Admin claims are re-checked against the stored user and the configured
/// admin list, so removing an address from `ADMIN_EMAILS` takes effect
/// before the token expires.
async fn current_role(state: &AppState, claims: &Claims) -> Result<Role, AppError> {
    if !claims.role.is_admin() {
        return Ok(claims.role);
    }

    let still_admin = state
        .db
        .get_user(&claims.sub)
        .await?
        .is_some_and(|user| user.role.is_admin() && state.config.is_admin_email(&user.email));

    if still_admin {
        Ok(Role::Admin)
    } else {
        tracing::warn!(uid = %claims.sub, "Admin session no longer backed by admin list");
        Ok(Role::Student)
    }
}

/// Middleware that rejects non-admin sessions. Must run after `require_auth`.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, AppError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or(AppError::Unauthorized)?;

    if let Err(err) = user.require_admin() {
        tracing::warn!(uid = %user.uid, "Non-admin attempted admin route");
        return Err(err);
    }

    Ok(next.run(request).await)
}

/// Decode and validate a session token.
pub fn verify_session_token(token: &str, signing_key: &[u8]) -> Result<Claims, AppError> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| {
        tracing::debug!(error = %e, "Session token rejected");
        AppError::InvalidToken
    })?;

    if token_data.claims.sub.is_empty() {
        return Err(AppError::InvalidToken);
    }

    Ok(token_data.claims)
}

/// Create a JWT for a user session.
pub fn create_session_token(uid: &str, role: Role, signing_key: &[u8]) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        sub: uid.to_string(),
        role,
        iat: now,
        exp: now + SESSION_TTL_SECS,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}
