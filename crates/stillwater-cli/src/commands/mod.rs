pub mod achievements;
pub mod chat;
pub mod config;
pub mod dashboard;
pub mod entry;
pub mod evaluation;
pub mod heatmap;
pub mod stats;
pub mod user;

use stillwater_core::{Config, Database, Stillwater};

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Open the database and wire the app with the on-disk config.
pub fn open_app() -> Result<(Stillwater, Config), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let db = Database::open()?;
    Ok((Stillwater::new(db, &config), config))
}

/// Single-threaded runtime for the async core calls.
pub fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}
