//! Feed handlers
//!
//! Public feed endpoints (one per syndication format) and dynamic
//! repository registration.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::feed::{
    render_atom, render_json, render_rss, ATOM_CONTENT_TYPE, JSON_CONTENT_TYPE, RSS_CONTENT_TYPE,
};
use crate::AppState;

/// GET /rss/:token
pub async fn get_rss(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Response, AppError> {
    let feed = state.feed_service.resolve_feed(&token)?;
    Ok(([(header::CONTENT_TYPE, RSS_CONTENT_TYPE)], render_rss(&feed)).into_response())
}

/// GET /atom/:token
pub async fn get_atom(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Response, AppError> {
    let feed = state.feed_service.resolve_feed(&token)?;
    Ok(([(header::CONTENT_TYPE, ATOM_CONTENT_TYPE)], render_atom(&feed)).into_response())
}

/// GET /json/:token
pub async fn get_json(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Response, AppError> {
    let feed = state.feed_service.resolve_feed(&token)?;
    let body = render_json(&feed).map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(([(header::CONTENT_TYPE, JSON_CONTENT_TYPE)], body).into_response())
}

/// Request body for POST /feeds
#[derive(Debug, Deserialize)]
pub struct RegisterFeedRequest {
    pub owner: String,
    pub repo: String,
    pub labels: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterFeedResponse {
    pub token: String,
    pub rss: String,
    pub atom: String,
    pub json: String,
}

impl RegisterFeedResponse {
    pub fn for_token(token: String) -> Self {
        Self {
            rss: format!("/rss/{}", token),
            atom: format!("/atom/{}", token),
            json: format!("/json/{}", token),
            token,
        }
    }
}

/// POST /feeds
///
/// Start tracking a repository. Fetches repository metadata from GitHub,
/// so this route sits behind the rate limiter.
pub async fn register_feed(
    State(state): State<AppState>,
    Json(body): Json<RegisterFeedRequest>,
) -> Result<(StatusCode, Json<RegisterFeedResponse>), AppError> {
    let token = state
        .feed_service
        .register_repository(body.owner.trim(), body.repo.trim(), body.labels)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterFeedResponse::for_token(token)),
    ))
}
