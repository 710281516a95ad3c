// SortingHat - Rust Edition
// A Discord bot that grants roles from values posted in a designated channel

mod api;
mod commands;
mod error;
mod features;
mod models;
mod utils;

use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context as _;
use poise::serenity_prelude as serenity;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::discord::DiscordPlatform;
use crate::api::platform::ChatPlatform;
use crate::features::dispatcher::handle_message;
use crate::features::guild_store::GuildConfigStore;
use crate::utils::config::Settings;

/// User data shared across all event handlers
pub struct Data {
    pub http_client: reqwest::Client,
    pub store: Arc<GuildConfigStore>,
    pub settings: Arc<Settings>,
    pub ready: AtomicBool,
}

// Manual Debug impl so the token in Settings never reaches the logs
impl std::fmt::Debug for Data {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Data")
            .field("http_client", &"reqwest::Client")
            .field("guilds", &self.store.len())
            .field("prefix", &self.settings.prefix)
            .field("ready", &self.ready.load(Ordering::Relaxed))
            .finish()
    }
}

type Error = Box<dyn std::error::Error + Send + Sync>;

/// Everything a handler needs: the platform to talk to, guild state, settings
#[derive(Clone)]
pub struct BotContext {
    pub platform: Arc<dyn ChatPlatform>,
    pub store: Arc<GuildConfigStore>,
    pub settings: Arc<Settings>,
}

#[cfg(test)]
impl BotContext {
    pub fn for_tests(mock: Arc<api::platform::mock::MockPlatform>) -> Self {
        use std::time::Duration;

        Self {
            platform: mock,
            store: Arc::new(GuildConfigStore::new()),
            settings: Arc::new(Settings {
                token: "test".to_string(),
                prefix: '!',
                feedback_ttl: Duration::from_secs(5),
                admin_warning_ttl: Duration::from_secs(5),
                response_limit: utils::config::MESSAGE_CHAR_LIMIT,
            }),
        }
    }
}

async fn log_status(store: &GuildConfigStore, ready: bool) {
    let report = store.status_report(ready).await;
    match serde_json::to_string(&report) {
        Ok(json) => info!("Status: {}", json),
        Err(e) => warn!("Failed to serialize status report: {}", e),
    }
}

async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Ready { data_about_bot } => {
            info!("Logged in as {}", data_about_bot.user.name);
            data.ready.store(true, Ordering::SeqCst);
            log_status(&data.store, true).await;
        }
        serenity::FullEvent::Message { new_message } => {
            let platform = DiscordPlatform::new(ctx, data.http_client.clone());
            let Some(msg) = platform.inbound(new_message, data.settings.prefix).await else {
                // Direct messages carry no guild and are ignored
                return Ok(());
            };

            let bot = BotContext {
                platform: Arc::new(platform),
                store: data.store.clone(),
                settings: data.settings.clone(),
            };
            let outcome = handle_message(&bot, &msg).await;
            debug!("Handled message {}: {:?}", msg.id, outcome);
        }
        _ => {}
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            env::var("RUST_LOG").unwrap_or_else(|_| "sortinghat_rs=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let settings = Arc::new(Settings::from_env().context("Failed to load configuration")?);

    info!("Starting SortingHat (Rust Edition) with prefix '{}'...", settings.prefix);

    // Build HTTP client for attachment downloads
    let http_client = reqwest::Client::builder()
        .user_agent("SortingHat-Bot/1.0")
        .build()
        .context("Failed to create HTTP client")?;

    let store = Arc::new(GuildConfigStore::new());
    let token = settings.token.clone();

    let framework_store = store.clone();
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            on_error: |error| {
                Box::pin(async move {
                    error!("Framework error: {:?}", error);
                })
            },
            ..Default::default()
        })
        .setup(move |_ctx, _ready, _framework| {
            Box::pin(async move {
                Ok(Data {
                    http_client,
                    store: framework_store,
                    settings,
                    ready: AtomicBool::new(false),
                })
            })
        })
        .build();

    // MESSAGE_CONTENT and GUILD_MEMBERS are privileged, enable both in the Discord Dev Portal
    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_MEMBERS;

    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .context("Failed to create client")?;

    // Run with graceful shutdown
    let shard_manager = client.shard_manager.clone();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to register Ctrl+C handler: {}", e);
            return;
        }
        info!("Shutting down...");
        shard_manager.shutdown_all().await;
    });

    if let Err(why) = client.start().await {
        error!("Client error: {:?}", why);
    }

    log_status(&store, false).await;
    info!("Goodbye!");
    Ok(())
}
