use super::*;
use super::utils::playlist::Playlist;
use super::utils::track::Track;

const MAX_NAME_LEN: usize = 100;

fn validate_name(name: &str) -> MusicResult<&str> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
        return Err(MusicError::InvalidArgument(format!(
            "playlist names must be 1 to {} characters",
            MAX_NAME_LEN
        )));
    }
    Ok(name)
}

async fn autocomplete_playlist(ctx: Context<'_>, partial: &str) -> Vec<String> {
    let Some(guild_id) = ctx.guild_id() else {
        return Vec::new();
    };
    let partial = partial.to_lowercase();
    ctx.data()
        .playlists
        .list(guild_id)
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|name| name.to_lowercase().contains(&partial))
        .collect()
}

/// Manage saved playlists
#[poise::command(
    slash_command,
    category = "Music",
    subcommands("create", "add", "remove", "sync", "load", "show", "list", "delete"),
    subcommand_required
)]
pub async fn playlist(_ctx: Context<'_>) -> CommandResult {
    Ok(())
}

/// Create an empty playlist
#[poise::command(slash_command)]
pub async fn create(
    ctx: Context<'_>,
    #[description = "Playlist name"] name: String,
) -> CommandResult {
    let reply: MusicResult<CreateReply> = async {
        let guild_id = guild_id(ctx)?;
        let name = validate_name(&name)?;
        let store = &ctx.data().playlists;

        if store.list(guild_id).await?.iter().any(|existing| existing == name) {
            return Err(MusicError::InvalidArgument(format!(
                "a playlist named '{}' already exists",
                name
            )));
        }
        let playlist = Playlist::new(name);
        store.save(guild_id, &playlist).await?;
        Ok(embedded_messages::playlist_saved(&playlist))
    }
    .await;

    respond(ctx, reply).await
}

/// Add a song (or every song of a playlist link) to a playlist
#[poise::command(slash_command)]
pub async fn add(
    ctx: Context<'_>,
    #[description = "Playlist name"]
    #[autocomplete = "autocomplete_playlist"]
    name: String,
    #[description = "URL or search query"] query: String,
) -> CommandResult {
    ctx.defer().await?;

    let reply: MusicResult<CreateReply> = async {
        let guild_id = guild_id(ctx)?;
        let data = ctx.data();
        let mut playlist = data.playlists.load(guild_id, validate_name(&name)?).await?;

        for track in data.resolver.resolve(&query, &ctx.author().name).await? {
            playlist.add_track(track);
        }
        data.playlists.save(guild_id, &playlist).await?;
        Ok(embedded_messages::playlist_saved(&playlist))
    }
    .await;

    respond(ctx, reply).await
}

/// Remove a song from a playlist by its position or URL
#[poise::command(slash_command)]
pub async fn remove(
    ctx: Context<'_>,
    #[description = "Playlist name"]
    #[autocomplete = "autocomplete_playlist"]
    name: String,
    #[description = "Position of the song (1-based) or its URL"] song: String,
) -> CommandResult {
    let reply: MusicResult<CreateReply> = async {
        let guild_id = guild_id(ctx)?;
        let store = &ctx.data().playlists;
        let mut playlist = store.load(guild_id, validate_name(&name)?).await?;

        let (removed, position) = remove_song(&mut playlist, &song)?;
        store.save(guild_id, &playlist).await?;
        Ok(embedded_messages::track_removed(&removed, position))
    }
    .await;

    respond(ctx, reply).await
}

/// Remove by 1-based position when `song` is a number, otherwise by track id.
/// Returns the removed track and the position it held.
fn remove_song(playlist: &mut Playlist, song: &str) -> MusicResult<(Track, usize)> {
    let song = song.trim();
    if let Ok(position) = song.parse::<usize>() {
        let index = position
            .checked_sub(1)
            .ok_or_else(|| MusicError::InvalidArgument("positions start at 1".to_string()))?;
        return Ok((playlist.remove_at(index)?, position));
    }

    let position = playlist
        .track_ids()
        .position(|id| id == song)
        .map_or(0, |index| index + 1);
    Ok((playlist.remove_track(song)?, position))
}

/// Merge everything in the player (played, playing and queued) into a playlist
#[poise::command(slash_command)]
pub async fn sync(
    ctx: Context<'_>,
    #[description = "Playlist name (created if missing)"]
    #[autocomplete = "autocomplete_playlist"]
    name: String,
) -> CommandResult {
    let reply: MusicResult<CreateReply> = async {
        let guild_id = guild_id(ctx)?;
        let name = validate_name(&name)?;
        let timeline: Vec<_> = {
            let player = active_player(ctx)?;
            let player = player.lock().await;
            let session = player.session();
            session
                .history()
                .iter()
                .chain(session.current_track())
                .chain(session.queue().iter())
                .cloned()
                .collect()
        };

        let store = &ctx.data().playlists;
        let mut playlist = match store.load(guild_id, name).await {
            Ok(playlist) => playlist,
            Err(MusicError::NotFound(_)) => Playlist::new(name),
            Err(err) => return Err(err),
        };
        playlist.replace_all(timeline);
        store.save(guild_id, &playlist).await?;
        Ok(embedded_messages::playlist_saved(&playlist))
    }
    .await;

    respond(ctx, reply).await
}

/// Queue every song of a playlist
#[poise::command(slash_command)]
pub async fn load(
    ctx: Context<'_>,
    #[description = "Playlist name"]
    #[autocomplete = "autocomplete_playlist"]
    name: String,
) -> CommandResult {
    let reply: MusicResult<CreateReply> = async {
        let guild_id = guild_id(ctx)?;
        let playlist = ctx
            .data()
            .playlists
            .load(guild_id, validate_name(&name)?)
            .await?;
        if playlist.is_empty() {
            return Err(MusicError::InvalidArgument(format!(
                "'{}' has no songs yet",
                playlist.name()
            )));
        }

        let requester = ctx.author().name.clone();
        let tracks = playlist
            .tracks()
            .iter()
            .cloned()
            .map(|track| track.requested_by(requester.as_str()))
            .collect();
        let player = connect_player(ctx).await?;
        let position = player.lock().await.enqueue(tracks).await?;
        Ok(embedded_messages::playlist_loaded(&playlist, position))
    }
    .await;

    respond(ctx, reply).await
}

/// List the songs in a playlist
#[poise::command(slash_command)]
pub async fn show(
    ctx: Context<'_>,
    #[description = "Playlist name"]
    #[autocomplete = "autocomplete_playlist"]
    name: String,
) -> CommandResult {
    let reply: MusicResult<CreateReply> = async {
        let guild_id = guild_id(ctx)?;
        let playlist = ctx
            .data()
            .playlists
            .load(guild_id, validate_name(&name)?)
            .await?;
        Ok(embedded_messages::playlist(&playlist))
    }
    .await;

    respond(ctx, reply).await
}

/// List the playlists saved in this server
#[poise::command(slash_command)]
pub async fn list(ctx: Context<'_>) -> CommandResult {
    let reply: MusicResult<CreateReply> = async {
        let guild_id = guild_id(ctx)?;
        let names = ctx.data().playlists.list(guild_id).await?;
        Ok(embedded_messages::playlists(&names))
    }
    .await;

    respond(ctx, reply).await
}

/// Delete a playlist
#[poise::command(slash_command)]
pub async fn delete(
    ctx: Context<'_>,
    #[description = "Playlist name"]
    #[autocomplete = "autocomplete_playlist"]
    name: String,
) -> CommandResult {
    let reply: MusicResult<CreateReply> = async {
        let guild_id = guild_id(ctx)?;
        let name = validate_name(&name)?;
        ctx.data().playlists.delete(guild_id, name).await?;
        Ok(embedded_messages::playlist_deleted(name))
    }
    .await;

    respond(ctx, reply).await
}
