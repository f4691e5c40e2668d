//! Track field validation
//!
//! Every create and update runs [`validate_track`] before touching the store.
//! A rejected write reports one [`FieldError`] per offending field, naming the
//! first rule that field broke. Fields are reported in column order.

use chrono::Datelike;
use serde::Serialize;

use crate::db::tracks::NewTrack;

/// Shortest accepted track length, in seconds
pub const MIN_DURATION_SECS: i64 = 1;

/// Earliest accepted release year
pub const MIN_RELEASE_YEAR: i64 = 1900;

/// A single field constraint violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// JSON field name (camelCase, matches the column name)
    pub field: &'static str,
    /// Human-readable explanation
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// The six business fields after every rule has passed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidTrack {
    pub song_title: String,
    pub artist_name: String,
    pub album_name: String,
    pub genre: String,
    pub duration: i64,
    pub release_year: i64,
}

/// Validate a track against the current calendar year
pub fn validate_track(input: &NewTrack) -> Result<ValidTrack, Vec<FieldError>> {
    validate_track_for_year(input, chrono::Local::now().year())
}

/// Validate a track with an explicit upper bound for `releaseYear`
pub fn validate_track_for_year(
    input: &NewTrack,
    current_year: i32,
) -> Result<ValidTrack, Vec<FieldError>> {
    let song_title = check_text("songTitle", "Song title", input.song_title.as_deref());
    let artist_name = check_text("artistName", "Artist name", input.artist_name.as_deref());
    let album_name = check_text("albumName", "Album name", input.album_name.as_deref());
    let genre = check_text("genre", "Genre", input.genre.as_deref());
    let duration = check_duration(input.duration);
    let release_year = check_release_year(input.release_year, i64::from(current_year));

    match (song_title, artist_name, album_name, genre, duration, release_year) {
        (Ok(song_title), Ok(artist_name), Ok(album_name), Ok(genre), Ok(duration), Ok(release_year)) => {
            Ok(ValidTrack {
                song_title,
                artist_name,
                album_name,
                genre,
                duration,
                release_year,
            })
        }
        (a, b, c, d, e, f) => Err([a.err(), b.err(), c.err(), d.err(), e.err(), f.err()]
            .into_iter()
            .flatten()
            .collect()),
    }
}

fn check_text(field: &'static str, label: &str, value: Option<&str>) -> Result<String, FieldError> {
    match value {
        None => Err(FieldError::new(field, format!("{} must be a string", label))),
        Some(text) if text.trim().is_empty() => {
            Err(FieldError::new(field, format!("{} cannot be empty", label)))
        }
        Some(text) => Ok(text.to_string()),
    }
}

fn check_duration(value: Option<i64>) -> Result<i64, FieldError> {
    match value {
        None => Err(FieldError::new("duration", "Duration must be an integer")),
        Some(secs) if secs < MIN_DURATION_SECS => Err(FieldError::new(
            "duration",
            format!("Duration must be at least {} second", MIN_DURATION_SECS),
        )),
        Some(secs) => Ok(secs),
    }
}

fn check_release_year(value: Option<i64>, current_year: i64) -> Result<i64, FieldError> {
    match value {
        None => Err(FieldError::new("releaseYear", "Release year must be an integer")),
        Some(year) if year < MIN_RELEASE_YEAR => Err(FieldError::new(
            "releaseYear",
            format!("Release year must be {} or later", MIN_RELEASE_YEAR),
        )),
        Some(year) if year > current_year => {
            Err(FieldError::new("releaseYear", "Release year cannot be in the future"))
        }
        Some(year) => Ok(year),
    }
}
