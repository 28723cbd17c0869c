//! Unified error types for the labelfeed API
//!
//! This module defines error types for each layer:
//! - `GitHubError`: GitHub API client errors (transient fetch failures)
//! - `RegistryError`: Feed token and registry errors
//! - `ConfigError`: Startup configuration errors
//! - `AppError`: Application layer errors (wraps the above for HTTP responses)

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// GitHub API client errors
#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Repository not found: {owner}/{repo}")]
    RepoNotFound { owner: String, repo: String },

    #[error("Rate limited")]
    RateLimited,

    #[error("Unauthorized - invalid token")]
    Unauthorized,

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

/// Feed registry errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("invalid feed hash")]
    InvalidToken,

    #[error("Token codec setup failed: {0}")]
    CodecSetup(String),
}

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Application layer errors - used by HTTP handlers
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Registration failed: {0}")]
    Registration(#[from] GitHubError),

    #[error("invalid feed hash")]
    InvalidFeed,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<RegistryError> for AppError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::InvalidToken => AppError::InvalidFeed,
            RegistryError::CodecSetup(msg) => AppError::Internal(msg),
        }
    }
}

/// Error response body for JSON responses
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Registration(e) => {
                tracing::error!("GitHub error during registration: {}", e);
                match e {
                    GitHubError::RepoNotFound { .. } => (
                        StatusCode::NOT_FOUND,
                        "Repository not found",
                        Some(e.to_string()),
                    ),
                    GitHubError::RateLimited => {
                        (StatusCode::TOO_MANY_REQUESTS, "Rate limited", None)
                    }
                    GitHubError::Api { message, .. } => (
                        StatusCode::BAD_GATEWAY,
                        "GitHub service error",
                        Some(message.clone()),
                    ),
                    _ => (StatusCode::BAD_GATEWAY, "GitHub service error", None),
                }
            }
            AppError::InvalidFeed => (StatusCode::NOT_FOUND, "invalid feed hash", None),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "Bad request", Some(msg.clone()))
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error.to_string(),
            details,
        });

        (status, body).into_response()
    }
}
