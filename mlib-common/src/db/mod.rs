//! Database access: store initialization, schema sync, track rows

pub mod init;
pub mod schema_sync;
pub mod tracks;

pub use init::*;
