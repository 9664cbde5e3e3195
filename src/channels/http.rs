//! HTTP channel: Bot Framework style activity endpoint plus profile lookup.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::activity::{Activity, OutgoingResponse};
use crate::adapter::BotAdapter;
use crate::bot::UserProfile;
use crate::error::{ChannelError, Error};
use crate::state::{BotState, StateScope};
use crate::state::properties::USER_PROFILE;

/// Shared state for HTTP routes.
#[derive(Clone)]
pub struct HttpState {
    pub adapter: Arc<BotAdapter>,
}

/// Body returned by `POST /api/messages`.
#[derive(Debug, Serialize)]
pub struct TurnResponse {
    pub responses: Vec<OutgoingResponse>,
}

/// Build the HTTP routes.
pub fn http_routes(adapter: Arc<BotAdapter>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/messages", post(post_activity))
        .route("/api/profile/{channel}/{user_id}", get(get_profile))
        .layer(CorsLayer::permissive())
        .with_state(HttpState { adapter })
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "profile-bot"
    }))
}

/// POST /api/messages
///
/// Runs one turn for the posted activity and returns its replies in order.
async fn post_activity(
    State(state): State<HttpState>,
    Json(activity): Json<Activity>,
) -> impl IntoResponse {
    match state.adapter.process_activity(activity).await {
        Ok(responses) => (StatusCode::OK, Json(TurnResponse { responses })).into_response(),
        Err(Error::Channel(ChannelError::InvalidMessage(reason))) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": reason })),
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "Activity rejected");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// GET /api/profile/{channel}/{user_id}
///
/// Returns the stored profile, or 404 if the user never gave a name.
async fn get_profile(
    State(state): State<HttpState>,
    Path((channel, user_id)): Path<(String, String)>,
) -> impl IntoResponse {
    let key = StateScope::User.key(&channel, &user_id);
    let mut user_state = BotState::new(Arc::clone(state.adapter.store()), key);
    match user_state.get_or_default::<UserProfile>(USER_PROFILE).await {
        Ok(profile) if profile.name.is_some() => (StatusCode::OK, Json(profile)).into_response(),
        Ok(_) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "No profile exists yet" })),
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "Profile lookup failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}
