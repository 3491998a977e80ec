// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// Access level of a signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Admin,
}

impl Role {
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// User profile stored in Firestore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Identity provider subject (also used as document ID)
    pub uid: String,
    /// Lowercased email address, unique across users
    pub email: String,
    /// Display name
    pub name: String,
    /// Profile picture URL
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub role: Role,
    /// When the user first signed in
    pub created_at: String,
    /// Most recent sign-in
    pub last_login: String,
    /// Last explicit profile edit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Normalize an email for storage and uniqueness checks.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}
