//! HTTP boundary: a single `GET /video-stream?videoId=<id>` route.
//!
//! When [`AuthPolicy::RequireBearer`] is set, requests without a bearer token
//! are rejected with 401 before anything else is looked at. Requests without a
//! `Range` header, or without a usable `videoId`, are then rejected with 400
//! before the stream service is involved. An `Authorization` header using any
//! other scheme counts as no token. The token, if any, is only passed on to the
//! lookup service.

use std::sync::Arc;

use axum::Router;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::header::{RANGE, WWW_AUTHENTICATE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, HeaderMapExt};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{BearerToken, StreamError, VideoStreamService};

/// Path the stream route is mounted on.
pub const STREAM_PATH: &str = "/video-stream";

/// Whether callers have to present `Authorization: Bearer <token>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthPolicy {
    #[default]
    Anonymous,
    RequireBearer,
}

#[derive(Debug, Clone)]
struct AppState {
    service: Arc<VideoStreamService>,
    auth: AuthPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct StreamQuery {
    video_id: i64,
}

/// Builds the router serving `service`.
pub fn router(service: Arc<VideoStreamService>, auth: AuthPolicy) -> Router {
    let state = AppState { service, auth };
    Router::new()
        .route(STREAM_PATH, get(video_stream))
        .with_state(state)
}

async fn video_stream(
    State(state): State<AppState>,
    query: Result<Query<StreamQuery>, QueryRejection>,
    headers: HeaderMap,
) -> Response {
    let auth = headers
        .typed_get::<Authorization<Bearer>>()
        .map(|Authorization(bearer)| BearerToken::new(bearer.token()));
    if state.auth == AuthPolicy::RequireBearer && auth.is_none() {
        debug!("rejecting request without bearer token");
        return (StatusCode::UNAUTHORIZED, [(WWW_AUTHENTICATE, "Bearer")], "missing bearer token").into_response();
    }

    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => return rejection.into_response(),
    };

    let Some(range) = headers.get(RANGE) else {
        return (StatusCode::BAD_REQUEST, "missing Range header").into_response();
    };
    let range = match range.to_str() {
        Ok(range) => range,
        Err(_) => {
            let value = String::from_utf8_lossy(range.as_bytes());
            return StreamError::invalid_range(&value).into_response();
        }
    };

    match state.service.prepare_content(range, query.video_id, auth.as_ref()).await {
        Ok(response) => response.into_response(),
        Err(e) => e.into_response(),
    }
}
