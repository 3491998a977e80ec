// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google sign-in and session routes.

use crate::error::Result;
use crate::middleware::auth::{create_session_token, SESSION_COOKIE, SESSION_TTL_SECS};
use crate::models::User;
use crate::routes::extract::{not_blank, ValidJson};
use crate::routes::users::{upsert_profile, ProfileInput};
use crate::AppState;
use axum::{extract::State, routing::post, Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/google", post(google_sign_in))
        .route("/auth/logout", post(logout))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GoogleSignInRequest {
    #[validate(custom(function = "not_blank"))]
    pub id_token: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SessionResponse {
    pub token: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "unknown"))]
    pub user: User,
}

/// Build the session cookie. Cross-site frontends need `SameSite=None`,
/// which browsers only accept on secure cookies.
fn session_cookie(state: &AppState, token: String) -> Cookie<'static> {
    let secure = state.config.frontend_url.starts_with("https://");
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(if secure { SameSite::None } else { SameSite::Lax })
        .max_age(time::Duration::seconds(SESSION_TTL_SECS as i64))
        .build()
}

/// Expired copy of the session cookie with matching attributes, so
/// browsers replace the stored one.
fn removal_cookie(state: &AppState) -> Cookie<'static> {
    let mut cookie = session_cookie(state, String::new());
    cookie.make_removal();
    cookie
}

/// Exchange a Google ID token for a session.
async fn google_sign_in(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ValidJson(req): ValidJson<GoogleSignInRequest>,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    let identity = state.google_verifier.verify_id_token(&req.id_token).await?;

    let name = identity
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| {
            identity
                .email
                .split('@')
                .next()
                .unwrap_or_default()
                .to_string()
        });

    let (user, created) = upsert_profile(
        &state,
        ProfileInput {
            uid: identity.subject,
            email: identity.email,
            name,
            photo: identity.picture,
            verified_email: true,
        },
    )
    .await?;

    let token = create_session_token(&user.uid, user.role, &state.config.jwt_signing_key)?;

    tracing::info!(uid = %user.uid, role = ?user.role, created, "User signed in");

    let jar = jar.add(session_cookie(&state, token.clone()));
    Ok((jar, Json(SessionResponse { token, user })))
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub message: String,
}

/// Clear the session cookie. Bearer tokens simply expire.
async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> (CookieJar, Json<LogoutResponse>) {
    // add, not remove: remove() only emits a header if the request carried the cookie
    let jar = jar.add(removal_cookie(&state));
    (
        jar,
        Json(LogoutResponse {
            message: "Logged out".to_string(),
        }),
    )
}
