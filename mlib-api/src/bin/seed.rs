//! mlib-seed - load the sample catalogue into the track store

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use mlib_api::config::{load_dotenv, StoreArgs};
use mlib_api::logging::init_tracing;
use mlib_api::seed::{seed_tracks, SeedOutcome};
use mlib_common::db::init::{close_database, init_database};

#[derive(Parser, Debug)]
#[command(name = "mlib-seed")]
#[command(about = "Insert sample tracks into the music library")]
#[command(version)]
struct Args {
    #[command(flatten)]
    store: StoreArgs,

    /// Delete existing tracks before seeding
    #[arg(long)]
    reset: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    load_dotenv();
    init_tracing();

    let args = Args::parse();
    let pool = init_database(&args.store.db_storage)
        .await
        .context("Unable to open the database")?;

    let outcome = seed_tracks(&pool, args.reset).await;
    close_database(&pool).await;

    match outcome.context("Seeding failed")? {
        SeedOutcome::Skipped { existing } => {
            info!("Library already holds {} tracks; use --reset to replace them", existing);
        }
        SeedOutcome::Seeded { removed, inserted } => {
            info!("Seeded {} tracks ({} removed)", inserted, removed);
        }
    }

    Ok(())
}
