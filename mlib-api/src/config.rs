//! Command-line and environment configuration
//!
//! Each setting resolves in order: command-line flag, environment variable
//! (a `.env` file in the working directory is loaded first), built-in default.

use clap::{Args, Parser};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DB_STORAGE: &str = "./music_library.db";

/// Location of the store file, shared by the server and the seeder
#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// SQLite file holding the tracks table
    #[arg(long, env = "DB_STORAGE", default_value = DEFAULT_DB_STORAGE)]
    pub db_storage: PathBuf,
}

/// Command-line arguments for mlib-api
#[derive(Parser, Debug, Clone)]
#[command(name = "mlib-api")]
#[command(about = "Music library track service")]
#[command(version)]
pub struct Config {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Interface to bind
    #[arg(long, env = "HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    #[command(flatten)]
    pub store: StoreArgs,
}

impl Config {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Load `.env` from the working directory if one exists
///
/// Variables already set in the environment win over the file.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}
