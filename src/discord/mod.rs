//! Discord adapter: gateway client, event handler and transport.

pub mod commands;
pub mod handler;
pub mod transport;

use async_trait::async_trait;
use serenity::cache::Cache;
use serenity::gateway::ShardManager;
use serenity::model::gateway::GatewayIntents;
use serenity::Client;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::roster::RosterService;
use crate::supervisor::{ConnectionProbe, Connector, Worker};

use handler::Handler;

/// Gateway intents the roster bot needs.
pub fn intents() -> GatewayIntents {
    GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::GUILD_MESSAGE_REACTIONS
        | GatewayIntents::MESSAGE_CONTENT
}

/// Shared view of one running client.
#[derive(Default)]
pub struct DiscordLink {
    shard_manager: OnceLock<Arc<ShardManager>>,
    cache: OnceLock<Arc<Cache>>,
    connected: AtomicBool,
}

impl DiscordLink {
    fn attach(&self, shard_manager: Arc<ShardManager>, cache: Arc<Cache>) {
        let _ = self.shard_manager.set(shard_manager);
        let _ = self.cache.set(cache);
    }

    pub(crate) fn shard_manager(&self) -> Option<&Arc<ShardManager>> {
        self.shard_manager.get()
    }

    pub(crate) fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }
}

#[async_trait]
impl ConnectionProbe for DiscordLink {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn guild_count(&self) -> usize {
        self.cache.get().map(|c| c.guild_count()).unwrap_or(0)
    }

    async fn disconnect(&self) {
        self.set_connected(false);
        if let Some(manager) = self.shard_manager.get() {
            manager.shutdown_all().await;
        }
    }
}

/// Builds a fresh gateway client, with its own roster cache, per launch.
pub struct DiscordConnector {
    settings: Settings,
    token: String,
}

impl DiscordConnector {
    pub fn new(settings: Settings) -> Result<Self> {
        let token = settings.require_token()?.to_string();
        Ok(Self { settings, token })
    }
}

#[async_trait]
impl Connector for DiscordConnector {
    async fn launch(&self) -> Result<Worker> {
        let link = Arc::new(DiscordLink::default());
        let handler = Handler {
            service: Arc::new(RosterService::from_settings(&self.settings)),
            link: link.clone(),
            prefix: self.settings.discord.command_prefix.clone(),
            command_name: self.settings.discord.command_name.clone(),
        };

        let mut client = Client::builder(&self.token, intents())
            .event_handler(handler)
            .await?;
        link.attach(client.shard_manager.clone(), client.cache.clone());

        let task_link = link.clone();
        let task = tokio::spawn(async move {
            tracing::info!("Starting Discord gateway connection...");
            if let Err(e) = client.start().await {
                match Error::from(e) {
                    Error::Auth(reason) => {
                        tracing::error!("Discord rejected the bot token: {}", reason)
                    }
                    other => tracing::error!("Discord client error: {}", other),
                }
            }
            task_link.set_connected(false);
            tracing::info!("Discord client stopped");
        });

        Ok(Worker { task, probe: link })
    }
}
