//! Sample catalogue for a fresh library
//!
//! Rows go through the normal create path, so they are validated like any
//! other write.

use mlib_common::db::tracks::{count_tracks, create_track, delete_all_tracks};
use mlib_common::{NewTrack, Result};
use sqlx::SqlitePool;
use tracing::info;

const SAMPLE_TRACKS: [(&str, &str, &str, &str, i64, i64); 12] = [
    ("Bohemian Rhapsody", "Queen", "A Night at the Opera", "Rock", 355, 1975),
    ("Billie Jean", "Michael Jackson", "Thriller", "Pop", 294, 1982),
    ("Stairway to Heaven", "Led Zeppelin", "Led Zeppelin IV", "Rock", 482, 1971),
    ("Imagine", "John Lennon", "Imagine", "Rock", 183, 1971),
    ("Like a Rolling Stone", "Bob Dylan", "Highway 61 Revisited", "Folk Rock", 369, 1965),
    ("What's Going On", "Marvin Gaye", "What's Going On", "Soul", 232, 1971),
    ("Purple Haze", "The Jimi Hendrix Experience", "Are You Experienced", "Rock", 167, 1967),
    ("Respect", "Aretha Franklin", "I Never Loved a Man the Way I Love You", "Soul", 147, 1967),
    ("Good Vibrations", "The Beach Boys", "Pet Sounds", "Pop", 219, 1966),
    ("Hey Jude", "The Beatles", "Past Masters", "Rock", 431, 1968),
    ("Smells Like Teen Spirit", "Nirvana", "Nevermind", "Grunge", 301, 1991),
    ("I Want to Hold Your Hand", "The Beatles", "Meet the Beatles!", "Rock", 145, 1963),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// Table already had rows and no reset was requested
    Skipped { existing: i64 },
    Seeded { removed: u64, inserted: usize },
}

pub fn sample_catalogue() -> Vec<NewTrack> {
    SAMPLE_TRACKS
        .iter()
        .map(|&(title, artist, album, genre, duration, year)| {
            NewTrack::new(title, artist, album, genre, duration, year)
        })
        .collect()
}

/// Insert the sample catalogue
///
/// With `reset` every existing track is removed first; without it an
/// already-populated table is left alone.
pub async fn seed_tracks(db: &SqlitePool, reset: bool) -> Result<SeedOutcome> {
    let removed = if reset {
        let removed = delete_all_tracks(db).await?;
        info!("Removed {} existing tracks", removed);
        removed
    } else {
        let existing = count_tracks(db).await?;
        if existing > 0 {
            return Ok(SeedOutcome::Skipped { existing });
        }
        0
    };

    let catalogue = sample_catalogue();
    for input in &catalogue {
        let track = create_track(db, input).await?;
        info!(track_id = track.track_id, "Seeded: {} - {}", track.artist_name, track.song_title);
    }

    Ok(SeedOutcome::Seeded {
        removed,
        inserted: catalogue.len(),
    })
}
