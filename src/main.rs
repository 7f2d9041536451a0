use dotenv::dotenv;
use poise::serenity_prelude as serenity;
use serenity::ClientBuilder;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use rusty_jukebox::utils::config::Config;
use rusty_jukebox::{Data, Error, help, register};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize logging with debug level for our crate
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("rusty_jukebox=debug,warn")),
        )
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_target(true)
        .with_ansi(true)
        .pretty()
        .init();

    dotenv().ok();
    let config = Config::from_env()?;
    let token = config.discord_token.clone();

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_VOICE_STATES;

    // Create a vector to hold our commands
    #[allow(unused_mut)]
    let mut commands = vec![
        // Default commands
        register(),
        help(),
    ];

    #[cfg(feature = "music")]
    commands.extend(rusty_jukebox::commands::music::commands());

    let data = build_data(config)?;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands,
            #[cfg(feature = "music")]
            event_handler: |ctx, event, framework, data| {
                Box::pin(rusty_jukebox::events::event_handler(
                    ctx, event, framework, data,
                ))
            },
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("Logged in as {}", ready.user.name);
                Ok(data)
            })
        });

    let client_builder = ClientBuilder::new(token, intents).framework(framework.build());

    // Create and run client
    build_and_start_client(client_builder).await
}

#[cfg(feature = "music")]
fn build_data(config: Config) -> Result<Data, Error> {
    use rusty_jukebox::commands::music::audio_sources::YoutubeResolver;
    use rusty_jukebox::player::music_manager::SessionRegistry;
    use rusty_jukebox::utils::database::SqlitePlaylistStore;
    use std::sync::Arc;

    let playlists = SqlitePlaylistStore::open(&config.database_path)?;

    let (playback_events, playback_rx) = tokio::sync::mpsc::unbounded_channel();
    let players = Arc::new(SessionRegistry::new(config.player));
    Arc::clone(&players).spawn_dispatcher(playback_rx);
    Arc::clone(&players).spawn_reaper();

    Ok(Data {
        config,
        players,
        playlists: Arc::new(playlists),
        resolver: Arc::new(YoutubeResolver::new()),
        playback_events,
        http_client: reqwest::Client::new(),
    })
}

#[cfg(not(feature = "music"))]
fn build_data(config: Config) -> Result<Data, Error> {
    Ok(Data {
        config,
        http_client: reqwest::Client::new(),
    })
}

async fn build_and_start_client(client_builder: ClientBuilder) -> Result<(), Error> {
    #[cfg(feature = "music")]
    {
        use songbird::SerenityInit;

        let mut client = client_builder.register_songbird().await?;
        client.start().await.map_err(Into::into)
    }

    #[cfg(not(feature = "music"))]
    {
        let mut client = client_builder.await?;
        client.start().await.map_err(Into::into)
    }
}
