//! mlib-api library - HTTP layer of the music library track service
//!
//! Five routes map HTTP verbs onto single-row operations of the `tracks`
//! table; a health route reports liveness.

use axum::Router;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod logging;
pub mod seed;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Store handle, opened once at startup and closed at shutdown
    pub db: SqlitePool,
}

impl AppState {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

/// Method, path and summary of every track endpoint, for the startup banner
pub const ENDPOINTS: [(&str, &str, &str); 5] = [
    ("GET", "/api/tracks", "Get all tracks"),
    ("GET", "/api/tracks/:id", "Get track by ID"),
    ("POST", "/api/tracks", "Create new track"),
    ("PUT", "/api/tracks/:id", "Update track"),
    ("DELETE", "/api/tracks/:id", "Delete track"),
];

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    let tracks = Router::new()
        .route("/api/tracks", get(api::list_tracks).post(api::create_track))
        .route(
            "/api/tracks/:id",
            get(api::get_track)
                .put(api::update_track)
                .delete(api::delete_track),
        );

    Router::new()
        .merge(tracks)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
