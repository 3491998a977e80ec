// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! A `.env` file is honored for local development. Secrets are read once
//! at startup and kept in memory.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Minimum length of the session signing key in bytes.
const MIN_SIGNING_KEY_LEN: usize = 32;

/// Which document store backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Google Firestore (or the emulator when `FIRESTORE_EMULATOR_HOST` is set)
    Firestore,
    /// Process-local maps; data is lost on restart
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(Self::Firestore),
            "memory" => Ok(Self::Memory),
            other => Err(ConfigError::Invalid {
                name: "STORAGE_BACKEND",
                reason: format!("unknown backend '{other}' (expected 'firestore' or 'memory')"),
            }),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Document store backend
    pub storage_backend: StorageBackend,
    /// OAuth client ID that Google ID tokens must be issued for
    pub google_client_id: String,
    /// Lowercased emails that get the admin role on sign-in
    pub admin_emails: Vec<String>,
    /// Optional JSON file replacing the built-in participant roster
    pub participants_file: Option<PathBuf>,
    /// Visibility of roster participants without an explicit admin setting
    pub participants_enabled_by_default: bool,

    // --- Secrets ---
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let jwt_signing_key = env::var("JWT_SIGNING_KEY")
            .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
            .trim()
            .as_bytes()
            .to_vec();
        if jwt_signing_key.len() < MIN_SIGNING_KEY_LEN {
            return Err(ConfigError::Invalid {
                name: "JWT_SIGNING_KEY",
                reason: format!("must be at least {MIN_SIGNING_KEY_LEN} bytes"),
            });
        }

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => StorageBackend::Firestore,
        };

        let participants_enabled_by_default = match env::var("PARTICIPANTS_ENABLED_BY_DEFAULT") {
            Ok(value) => parse_bool(&value).ok_or_else(|| ConfigError::Invalid {
                name: "PARTICIPANTS_ENABLED_BY_DEFAULT",
                reason: format!("expected a boolean, got '{value}'"),
            })?,
            Err(_) => true,
        };

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .unwrap_or(5000),
            storage_backend,
            google_client_id: env::var("GOOGLE_CLIENT_ID")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("GOOGLE_CLIENT_ID"))?,
            admin_emails: parse_email_list(&env::var("ADMIN_EMAILS").unwrap_or_default()),
            participants_file: env::var("PARTICIPANTS_FILE")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            participants_enabled_by_default,
            jwt_signing_key,
        })
    }

    /// Deterministic configuration for tests.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 5000,
            storage_backend: StorageBackend::Memory,
            google_client_id: "test-client.apps.googleusercontent.com".to_string(),
            admin_emails: vec!["admin@example.com".to_string()],
            participants_file: None,
            participants_enabled_by_default: true,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!!".to_vec(),
        }
    }

    /// Whether the given email is on the admin list.
    pub fn is_admin_email(&self, email: &str) -> bool {
        let email = email.trim().to_ascii_lowercase();
        self.admin_emails.iter().any(|admin| *admin == email)
    }
}

fn parse_email_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|e| e.trim().to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}
