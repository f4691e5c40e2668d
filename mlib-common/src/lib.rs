//! # Music Library Common
//!
//! Persistence layer for the music library track service:
//! - Track schema and row operations
//! - Field validation run before every write
//! - Store initialization with non-destructive table sync

pub mod db;
pub mod error;
pub mod validation;

pub use db::tracks::{NewTrack, Track};
pub use error::{Error, Result};
pub use validation::{FieldError, ValidTrack};
