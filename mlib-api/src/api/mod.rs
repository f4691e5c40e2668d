//! HTTP API handlers for the track service

pub mod error;
pub mod health;
pub mod payload;
pub mod tracks;

pub use error::ApiError;
pub use health::health_routes;
pub use tracks::{create_track, delete_track, get_track, list_tracks, update_track};
