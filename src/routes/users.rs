// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User profile routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::user::normalize_email;
use crate::models::{Role, User};
use crate::routes::extract::{not_blank, ValidJson};
use crate::time_utils::now_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

/// Profile routes (require authentication).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/users", get(list_users).post(upsert_user))
        .route("/users/{uid}", get(get_user).put(update_user))
}

/// Profile fields asserted at sign-in or via `POST /users`.
pub(crate) struct ProfileInput {
    pub uid: String,
    pub email: String,
    pub name: String,
    pub photo: Option<String>,
    /// Email came from a verified Google ID token.
    pub verified_email: bool,
}

/// Create the user or refresh an existing profile.
///
/// Role comes from the configured admin list, re-evaluated on every
/// sign-in, and only for a verified email. Otherwise the stored role is
/// kept, and new users start as students. Returns the stored user and
/// whether it was created.
pub(crate) async fn upsert_profile(state: &AppState, input: ProfileInput) -> Result<(User, bool)> {
    let email = normalize_email(&input.email);
    let name = input.name.trim().to_string();
    let verified_role = input.verified_email.then(|| {
        if state.config.is_admin_email(&email) {
            Role::Admin
        } else {
            Role::Student
        }
    });
    let now = now_rfc3339();

    if let Some(mut user) = state.db.get_user(&input.uid).await? {
        if user.email != email {
            if let Some(other) = state.db.find_user_by_email(&email).await? {
                if other.uid != user.uid {
                    return Err(AppError::Conflict(
                        "Email is already registered to another user".to_string(),
                    ));
                }
            }
            user.email = email;
        }
        user.name = name;
        if input.photo.is_some() {
            user.photo = input.photo;
        }
        if let Some(role) = verified_role {
            user.role = role;
        }
        user.last_login = now;

        state.db.update_user(&user).await?;
        tracing::debug!(uid = %user.uid, role = ?user.role, "Refreshed user profile");
        return Ok((user, false));
    }

    if state.db.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict(
            "User already exists with this email or uid".to_string(),
        ));
    }

    let user = User {
        uid: input.uid,
        email,
        name,
        photo: input.photo,
        role: verified_role.unwrap_or_default(),
        created_at: now.clone(),
        last_login: now,
        updated_at: None,
    };
    state.db.create_user(&user).await?;

    tracing::info!(uid = %user.uid, role = ?user.role, "Created user");
    Ok((user, true))
}

/// Get the signed-in user's profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<User>> {
    let user = state
        .db
        .get_user(&auth.uid)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(user))
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpsertUserRequest {
    #[validate(custom(function = "not_blank"))]
    pub uid: String,
    #[validate(email)]
    pub email: String,
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[serde(default)]
    pub photo: Option<String>,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub message: String,
    pub user: User,
}

/// Create or update a profile; only for yourself unless admin.
///
/// Non-admins can only refresh the profile Google sign-in created, and
/// cannot change its email.
async fn upsert_user(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    ValidJson(req): ValidJson<UpsertUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    auth.require_self_or_admin(&req.uid)?;

    if !auth.is_admin() {
        let stored = state.db.get_user(&req.uid).await?.ok_or_else(|| {
            AppError::Forbidden("Sign in with Google to create your profile".to_string())
        })?;
        if normalize_email(&req.email) != stored.email {
            tracing::warn!(uid = %auth.uid, "Rejected email change without sign-in");
            return Err(AppError::Forbidden(
                "Email can only be changed by signing in with Google".to_string(),
            ));
        }
    }

    let (user, created) = upsert_profile(
        &state,
        ProfileInput {
            uid: req.uid,
            email: req.email,
            name: req.name,
            photo: req.photo,
            verified_email: false,
        },
    )
    .await?;

    let (status, message) = if created {
        (StatusCode::CREATED, "User created successfully")
    } else {
        (StatusCode::OK, "User updated successfully")
    };

    Ok((
        status,
        Json(UserResponse {
            message: message.to_string(),
            user,
        }),
    ))
}

/// List every user (admin only).
async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<User>>> {
    auth.require_admin()?;
    Ok(Json(state.db.list_users().await?))
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(uid): Path<String>,
) -> Result<Json<User>> {
    auth.require_self_or_admin(&uid)?;

    let user = state
        .db
        .get_user(&uid)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(user))
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(custom(function = "not_blank"))]
    pub name: Option<String>,
    pub photo: Option<String>,
}

/// Edit display name and/or photo.
async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(uid): Path<String>,
    ValidJson(req): ValidJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>> {
    auth.require_self_or_admin(&uid)?;

    let mut user = state
        .db
        .get_user(&uid)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if let Some(name) = req.name {
        user.name = name.trim().to_string();
    }
    if req.photo.is_some() {
        user.photo = req.photo;
    }
    user.updated_at = Some(now_rfc3339());

    state.db.update_user(&user).await?;
    tracing::info!(uid = %uid, by = %auth.uid, "Updated user profile");

    Ok(Json(UserResponse {
        message: "User updated successfully".to_string(),
        user,
    }))
}
