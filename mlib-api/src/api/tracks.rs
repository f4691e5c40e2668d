//! Track endpoints
//!
//! Each handler performs one lookup or one write against the store and turns
//! the outcome into a JSON response.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use mlib_common::db::tracks;
use mlib_common::Track;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, error, info};

use super::error::ApiError;
use super::payload::parse_track_body;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub message: &'static str,
    pub count: usize,
    pub data: Vec<Track>,
}

#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub message: &'static str,
    pub data: T,
}

/// What remains of a track once it is deleted
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedTrack {
    pub track_id: i64,
    pub song_title: String,
    pub artist_name: String,
}

/// GET /api/tracks
pub async fn list_tracks(State(state): State<AppState>) -> Result<Json<ListResponse>, ApiError> {
    let tracks = tracks::list_tracks(&state.db).await.map_err(|e| {
        error!("Error fetching tracks: {}", e);
        ApiError::store("Failed to retrieve tracks", e)
    })?;

    Ok(Json(ListResponse {
        message: "success",
        count: tracks.len(),
        data: tracks,
    }))
}

/// GET /api/tracks/:id
pub async fn get_track(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DataResponse<Track>>, ApiError> {
    let track = find_track(&state, &id, "Failed to retrieve track").await?;

    Ok(Json(DataResponse {
        message: "success",
        data: track,
    }))
}

/// POST /api/tracks
pub async fn create_track(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<DataResponse<Track>>), ApiError> {
    let body = body_or_empty(body);
    let input = parse_track_body(&body).map_err(|missing| ApiError::MissingFields {
        missing,
        received: body.clone(),
    })?;

    let track = tracks::create_track(&state.db, &input).await.map_err(|e| {
        error!("Error creating track: {}", e);
        ApiError::store("Failed to create track", e)
    })?;
    info!(track_id = track.track_id, "Track created: {}", track.song_title);

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            message: "Track created successfully",
            data: track,
        }),
    ))
}

/// PUT /api/tracks/:id
///
/// The id is resolved before the body is looked at, so an unknown id is a
/// 404 whatever was submitted.
pub async fn update_track(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<DataResponse<Track>>, ApiError> {
    let existing = find_track(&state, &id, "Failed to update track").await?;

    let body = body_or_empty(body);
    let input = parse_track_body(&body).map_err(|missing| ApiError::MissingFields {
        missing,
        received: body.clone(),
    })?;

    let updated = tracks::replace_track(&state.db, &existing, &input)
        .await
        .map_err(|e| {
            error!("Error updating track: {}", e);
            ApiError::store("Failed to update track", e)
        })?
        .ok_or_else(|| ApiError::NotFound(id))?;
    info!(track_id = updated.track_id, "Track updated");

    Ok(Json(DataResponse {
        message: "Track updated successfully",
        data: updated,
    }))
}

/// DELETE /api/tracks/:id
pub async fn delete_track(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DataResponse<DeletedTrack>>, ApiError> {
    let track_id = parse_track_id(&id).ok_or_else(|| ApiError::NotFound(id.clone()))?;

    let deleted = tracks::delete_track(&state.db, track_id)
        .await
        .map_err(|e| {
            error!("Error deleting track: {}", e);
            ApiError::store("Failed to delete track", e)
        })?
        .ok_or_else(|| ApiError::NotFound(id))?;
    info!(track_id, "Track deleted: {}", deleted.song_title);

    Ok(Json(DataResponse {
        message: "Track deleted successfully",
        data: DeletedTrack {
            track_id: deleted.track_id,
            song_title: deleted.song_title,
            artist_name: deleted.artist_name,
        },
    }))
}

/// A path id that is not an integer names no row
fn parse_track_id(id: &str) -> Option<i64> {
    id.parse().ok()
}

async fn find_track(state: &AppState, id: &str, context: &'static str) -> Result<Track, ApiError> {
    let Some(track_id) = parse_track_id(id) else {
        return Err(ApiError::NotFound(id.to_string()));
    };

    tracks::get_track(&state.db, track_id)
        .await
        .map_err(|e| {
            error!("Error fetching track {}: {}", track_id, e);
            ApiError::store(context, e)
        })?
        .ok_or_else(|| ApiError::NotFound(id.to_string()))
}

/// Unreadable bodies (bad JSON, wrong content type) count as an empty object
fn body_or_empty(body: Result<Json<Value>, JsonRejection>) -> Value {
    match body {
        Ok(Json(value)) => value,
        Err(rejection) => {
            debug!("Unreadable request body: {}", rejection);
            Value::Object(Map::new())
        }
    }
}
