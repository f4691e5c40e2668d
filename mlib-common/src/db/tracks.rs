//! Track rows
//!
//! Each operation touches a single row of the `tracks` table. Writes are
//! validated first; a rejected write never reaches the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;

use crate::db::schema_sync::{ColumnDefinition, TableSchema, NOW_RFC3339};
use crate::validation::{validate_track, ValidTrack};
use crate::{Error, Result};

const UNKNOWN: &str = "'Unknown'";

/// `tracks` table definition
pub struct TrackSchema;

impl TableSchema for TrackSchema {
    fn table_name() -> &'static str {
        "tracks"
    }

    /// Backfills keep rows of an older table readable as [`Track`]: text
    /// columns get `'Unknown'`, numbers the lowest value validation accepts,
    /// and timestamps the time of the upgrade.
    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("trackId", "INTEGER")
                .primary_key()
                .autoincrement(),
            ColumnDefinition::new("songTitle", "TEXT").not_null().backfill(UNKNOWN),
            ColumnDefinition::new("artistName", "TEXT").not_null().backfill(UNKNOWN),
            ColumnDefinition::new("albumName", "TEXT").not_null().backfill(UNKNOWN),
            ColumnDefinition::new("genre", "TEXT").not_null().backfill(UNKNOWN),
            ColumnDefinition::new("duration", "INTEGER").not_null().backfill("1"),
            ColumnDefinition::new("releaseYear", "INTEGER").not_null().backfill("1900"),
            ColumnDefinition::new("createdAt", "DATETIME")
                .not_null()
                .backfill(NOW_RFC3339),
            ColumnDefinition::new("updatedAt", "DATETIME")
                .not_null()
                .backfill(NOW_RFC3339),
        ]
    }
}

/// A stored track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct Track {
    pub track_id: i64,
    pub song_title: String,
    pub artist_name: String,
    pub album_name: String,
    pub genre: String,
    /// Length in whole seconds
    pub duration: i64,
    pub release_year: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Business fields of a track as submitted, before validation
///
/// A text field is `None` when the submitted value was not a string; an
/// integer field is `None` when it could not be read as an integer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTrack {
    pub song_title: Option<String>,
    pub artist_name: Option<String>,
    pub album_name: Option<String>,
    pub genre: Option<String>,
    pub duration: Option<i64>,
    pub release_year: Option<i64>,
}

impl NewTrack {
    pub fn new(
        song_title: impl Into<String>,
        artist_name: impl Into<String>,
        album_name: impl Into<String>,
        genre: impl Into<String>,
        duration: i64,
        release_year: i64,
    ) -> Self {
        Self {
            song_title: Some(song_title.into()),
            artist_name: Some(artist_name.into()),
            album_name: Some(album_name.into()),
            genre: Some(genre.into()),
            duration: Some(duration),
            release_year: Some(release_year),
        }
    }
}

/// All tracks in the store's natural order
pub async fn list_tracks(db: &SqlitePool) -> Result<Vec<Track>> {
    let tracks = sqlx::query_as::<_, Track>("SELECT * FROM tracks")
        .fetch_all(db)
        .await?;

    Ok(tracks)
}

pub async fn count_tracks(db: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tracks")
        .fetch_one(db)
        .await?;

    Ok(count)
}

pub async fn get_track(db: &SqlitePool, track_id: i64) -> Result<Option<Track>> {
    let track = sqlx::query_as::<_, Track>("SELECT * FROM tracks WHERE trackId = ?")
        .bind(track_id)
        .fetch_optional(db)
        .await?;

    Ok(track)
}

/// Validate and insert a track, returning it with its assigned id
pub async fn create_track(db: &SqlitePool, input: &NewTrack) -> Result<Track> {
    let fields = validate_track(input).map_err(Error::Validation)?;
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO tracks (songTitle, artistName, albumName, genre, duration, releaseYear, createdAt, updatedAt)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&fields.song_title)
    .bind(&fields.artist_name)
    .bind(&fields.album_name)
    .bind(&fields.genre)
    .bind(fields.duration)
    .bind(fields.release_year)
    .bind(now)
    .bind(now)
    .execute(db)
    .await?;

    let track_id = result.last_insert_rowid();
    debug!(track_id, "Inserted track");

    Ok(stored(track_id, fields, now, now))
}

/// Replace all six business fields of an existing track
///
/// Returns `Ok(None)` when no row has `track_id`; that check comes before
/// validation, so an unknown id is reported as such whatever the input.
pub async fn update_track(db: &SqlitePool, track_id: i64, input: &NewTrack) -> Result<Option<Track>> {
    let Some(existing) = get_track(db, track_id).await? else {
        return Ok(None);
    };
    replace_track(db, &existing, input).await
}

/// [`update_track`] for a caller that already holds the current row
///
/// `existing` supplies the id and `createdAt`; the row is not read again.
/// Returns `Ok(None)` if the row was deleted in the meantime.
pub async fn replace_track(db: &SqlitePool, existing: &Track, input: &NewTrack) -> Result<Option<Track>> {
    let fields = validate_track(input).map_err(Error::Validation)?;
    let track_id = existing.track_id;
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        UPDATE tracks
        SET songTitle = ?, artistName = ?, albumName = ?, genre = ?,
            duration = ?, releaseYear = ?, updatedAt = ?
        WHERE trackId = ?
        "#,
    )
    .bind(&fields.song_title)
    .bind(&fields.artist_name)
    .bind(&fields.album_name)
    .bind(&fields.genre)
    .bind(fields.duration)
    .bind(fields.release_year)
    .bind(now)
    .bind(track_id)
    .execute(db)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    debug!(track_id, "Updated track");

    Ok(Some(stored(track_id, fields, existing.created_at, now)))
}

/// Delete a track, returning the row as it was just before removal
pub async fn delete_track(db: &SqlitePool, track_id: i64) -> Result<Option<Track>> {
    let Some(track) = get_track(db, track_id).await? else {
        return Ok(None);
    };

    let result = sqlx::query("DELETE FROM tracks WHERE trackId = ?")
        .bind(track_id)
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    debug!(track_id, "Deleted track");

    Ok(Some(track))
}

/// Remove every track. Ids keep counting up from the highest ever assigned.
pub async fn delete_all_tracks(db: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM tracks").execute(db).await?;
    Ok(result.rows_affected())
}

fn stored(
    track_id: i64,
    fields: ValidTrack,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> Track {
    Track {
        track_id,
        song_title: fields.song_title,
        artist_name: fields.artist_name,
        album_name: fields.album_name,
        genre: fields.genre,
        duration: fields.duration,
        release_year: fields.release_year,
        created_at,
        updated_at,
    }
}
