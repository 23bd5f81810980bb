use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde_json::json;
use tracing::{debug, error};
use uuid::Uuid;

use super::AppState;
use crate::errors::AppError;
use crate::services::OrganisationService;

pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("Request failed: {}", self);
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

/// `GET /__health`
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.database.ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
        Err(e) => {
            error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable", "error": e.to_string() })),
            )
        }
    }
}

/// `GET …/organisations/__ids`: one `{"id": …}` line per mapped identity
pub async fn list_identities(State(state): State<AppState>) -> impl IntoResponse {
    let body = Body::from_stream(identity_lines(state.organisations.clone()));

    (
        [
            (header::CONTENT_TYPE, NDJSON_CONTENT_TYPE),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        body,
    )
}

fn identity_lines(organisations: OrganisationService) -> impl Stream<Item = Result<Bytes, AppError>> {
    async_stream::stream! {
        let mut identities = organisations.identities();
        while let Some(identity) = identities.next().await {
            match identity {
                Ok(id) => yield Ok(Bytes::from(format!("{}\n", json!({ "id": id })))),
                Err(e) => {
                    error!("Identity listing aborted: {}", e);
                    yield Err(e);
                    break;
                }
            }
        }
    }
}

/// `GET …/organisations/__count`
pub async fn count_organisations(State(state): State<AppState>) -> Result<Json<i64>, AppError> {
    Ok(Json(state.organisations.count().await?))
}

/// `GET …/organisations/{uuid}`. Unknown and malformed identities are both
/// a 404 with an empty body.
pub async fn get_organisation(
    Path(uuid): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let Ok(identity) = Uuid::parse_str(&uuid) else {
        debug!("Not a uuid: {}", uuid);
        return Ok(StatusCode::NOT_FOUND.into_response());
    };

    match state.organisations.resolve(identity).await? {
        Some(organisation) => Ok(Json(organisation).into_response()),
        None => Ok(StatusCode::NOT_FOUND.into_response()),
    }
}
