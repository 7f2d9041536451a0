//! SQLite persistence for saved playlists.
//!
//! Every call runs on the blocking pool against a single shared connection.
//! Tracks are stored as JSON, one row per position.

use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, Result as SqlResult, params};
use serenity::model::id::GuildId;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use crate::commands::music::utils::music_manager::{MusicError, MusicResult};
use crate::commands::music::utils::playlist::{Playlist, PlaylistStore};
use crate::commands::music::utils::track::Track;

/// The default filename for the SQLite database.
pub const APPDATA_DB: &str = "application_data.db";

impl From<rusqlite::Error> for MusicError {
    fn from(err: rusqlite::Error) -> Self {
        MusicError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for MusicError {
    fn from(err: serde_json::Error) -> Self {
        MusicError::Database(format!("corrupt track entry: {}", err))
    }
}

/// Creates the `playlists` and `playlist_tracks` tables if they don't exist.
fn create_tables(conn: &Connection) -> SqlResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS playlists (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            guild_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            UNIQUE (guild_id, name)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS playlist_tracks (
            playlist_id INTEGER NOT NULL REFERENCES playlists (id),
            position INTEGER NOT NULL,
            track TEXT NOT NULL,
            PRIMARY KEY (playlist_id, position)
        )",
        [],
    )?;

    Ok(())
}

fn playlist_id(conn: &Connection, guild_id: GuildId, name: &str) -> MusicResult<Option<i64>> {
    Ok(conn
        .query_row(
            "SELECT id FROM playlists WHERE guild_id = ?1 AND name = ?2",
            params![guild_id.get(), name],
            |row| row.get(0),
        )
        .optional()?)
}

fn not_found(name: &str) -> MusicError {
    MusicError::NotFound(format!("no playlist named '{}'", name))
}

#[derive(Clone)]
pub struct SqlitePlaylistStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqlitePlaylistStore {
    /// Open (or create) the database file and make sure the tables exist.
    pub fn open(path: impl AsRef<Path>) -> MusicResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        create_tables(&conn)?;
        info!("Opened playlist database at {}", path.as_ref().display());
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> MusicResult<Self> {
        let conn = Connection::open_in_memory()?;
        create_tables(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_connection<T, F>(&self, op: F) -> MusicResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> MusicResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|_| MusicError::Database("connection lock poisoned".to_string()))?;
            op(&mut conn)
        })
        .await
        .map_err(|e| MusicError::Database(e.to_string()))?
    }
}

#[async_trait]
impl PlaylistStore for SqlitePlaylistStore {
    async fn save(&self, guild_id: GuildId, playlist: &Playlist) -> MusicResult<()> {
        let playlist = playlist.clone();
        self.with_connection(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO playlists (guild_id, name) VALUES (?1, ?2)
                 ON CONFLICT (guild_id, name) DO NOTHING",
                params![guild_id.get(), playlist.name()],
            )?;
            let id = playlist_id(&tx, guild_id, playlist.name())?
                .ok_or_else(|| not_found(playlist.name()))?;

            tx.execute("DELETE FROM playlist_tracks WHERE playlist_id = ?1", [id])?;
            {
                let mut insert = tx.prepare(
                    "INSERT INTO playlist_tracks (playlist_id, position, track) VALUES (?1, ?2, ?3)",
                )?;
                for (position, track) in playlist.tracks().iter().enumerate() {
                    insert.execute(params![id, position as i64, serde_json::to_string(track)?])?;
                }
            }
            tx.commit()?;

            debug!(
                "Saved playlist '{}' ({} tracks) for guild {}",
                playlist.name(),
                playlist.len(),
                guild_id
            );
            Ok(())
        })
        .await
    }

    async fn load(&self, guild_id: GuildId, name: &str) -> MusicResult<Playlist> {
        let name = name.to_string();
        self.with_connection(move |conn| {
            let id = playlist_id(conn, guild_id, &name)?.ok_or_else(|| not_found(&name))?;

            let mut select = conn.prepare(
                "SELECT track FROM playlist_tracks WHERE playlist_id = ?1 ORDER BY position",
            )?;
            let rows = select.query_map([id], |row| row.get::<_, String>(0))?;

            let mut tracks = Vec::new();
            for row in rows {
                tracks.push(serde_json::from_str::<Track>(&row?)?);
            }
            Ok(Playlist::with_tracks(name, tracks))
        })
        .await
    }

    async fn delete(&self, guild_id: GuildId, name: &str) -> MusicResult<()> {
        let name = name.to_string();
        self.with_connection(move |conn| {
            let tx = conn.transaction()?;
            let id = playlist_id(&tx, guild_id, &name)?.ok_or_else(|| not_found(&name))?;
            tx.execute("DELETE FROM playlist_tracks WHERE playlist_id = ?1", [id])?;
            tx.execute("DELETE FROM playlists WHERE id = ?1", [id])?;
            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn list(&self, guild_id: GuildId) -> MusicResult<Vec<String>> {
        self.with_connection(move |conn| {
            let mut select =
                conn.prepare("SELECT name FROM playlists WHERE guild_id = ?1 ORDER BY name")?;
            let names = select
                .query_map(params![guild_id.get()], |row| row.get(0))?
                .collect::<SqlResult<Vec<String>>>()?;
            Ok(names)
        })
        .await
    }
}
