//! This module aggregates various utility submodules used throughout the application.

/// Environment-driven bot configuration.
pub mod config;
/// SQLite storage for saved playlists.
#[cfg(feature = "music")]
pub mod database;
