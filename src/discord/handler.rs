//! Gateway event handler.

use serenity::async_trait;
use serenity::builder::{CreateEmbed, CreateMessage};
use serenity::gateway::{ActivityData, ConnectionStage, ShardStageUpdateEvent};
use serenity::model::channel::{Message, Reaction, ReactionType};
use serenity::model::event::MessageUpdateEvent;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use std::sync::Arc;

use crate::roster::{CommandEvent, EditEvent, ReactionEvent, RosterService};

use super::commands::{parse_command, pong_reply, Command, UNKNOWN_COMMAND_REPLY};
use super::transport::SerenityTransport;
use super::DiscordLink;

pub struct Handler {
    pub(super) service: Arc<RosterService>,
    pub(super) link: Arc<DiscordLink>,
    pub(super) prefix: String,
    pub(super) command_name: String,
}

impl Handler {
    fn transport(&self, ctx: &Context) -> SerenityTransport {
        let bot_id = ctx.cache.current_user().id.get();
        SerenityTransport::new(ctx.http.clone(), bot_id)
    }

    async fn latency_ms(&self, ctx: &Context) -> Option<u128> {
        let manager = self.link.shard_manager()?;
        let runners = manager.runners.lock().await;
        runners
            .get(&ctx.shard_id)
            .and_then(|runner| runner.latency)
            .map(|d| d.as_millis())
    }

    async fn send_status(&self, ctx: &Context, msg: &Message) -> serenity::Result<()> {
        let latency = match self.latency_ms(ctx).await {
            Some(ms) => format!("{}ms", ms),
            None => "unbekannt".to_string(),
        };
        let embed = CreateEmbed::new()
            .title("Bot Status")
            .description("Bot ist aktiv und funktioniert.")
            .colour(0x2ecc71_u32)
            .field("Latenz", latency, true)
            .field("Server", ctx.cache.guild_count().to_string(), true)
            .field("Version", env!("CARGO_PKG_VERSION"), true);
        msg.channel_id
            .send_message(&ctx.http, CreateMessage::new().embed(embed))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        tracing::info!("Bot connected as {} (ID: {})", ready.user.name, ready.user.id);
        tracing::info!("Connected to {} guilds", ready.guilds.len());
        self.link.set_connected(true);
        ctx.set_activity(Some(ActivityData::watching(format!(
            "Teilnehmerlisten | {}{}",
            self.prefix, self.command_name
        ))));
    }

    async fn shard_stage_update(&self, _ctx: Context, event: ShardStageUpdateEvent) {
        tracing::debug!("Shard {} stage {:?} -> {:?}", event.shard_id.0, event.old, event.new);
        self.link
            .set_connected(matches!(event.new, ConnectionStage::Connected));
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }
        let Some(command) = parse_command(&msg.content, &self.prefix, &self.command_name) else {
            return;
        };

        let result = match command {
            Command::Roster(args) => {
                let event = CommandEvent {
                    channel_id: msg.channel_id.get(),
                    guild_id: msg.guild_id.map(|g| g.get()),
                    message_id: msg.id.get(),
                    author_id: msg.author.id.get(),
                    args: args.to_string(),
                };
                let transport = self.transport(&ctx);
                self.service
                    .create_board(&transport, event)
                    .await
                    .map(|_| ())
            }
            Command::Ping => {
                let reply = pong_reply(self.latency_ms(&ctx).await);
                msg.channel_id
                    .say(&ctx.http, reply)
                    .await
                    .map(|_| ())
                    .map_err(Into::into)
            }
            Command::Status => self.send_status(&ctx, &msg).await.map_err(Into::into),
            Command::Unknown(name) => {
                tracing::debug!("Unknown command '{}'", name);
                msg.channel_id
                    .say(&ctx.http, UNKNOWN_COMMAND_REPLY)
                    .await
                    .map(|_| ())
                    .map_err(Into::into)
            }
        };

        if let Err(e) = result {
            tracing::error!("Command in channel {} failed: {}", msg.channel_id, e);
        }
    }

    async fn message_update(
        &self,
        ctx: Context,
        _old: Option<Message>,
        _new: Option<Message>,
        event: MessageUpdateEvent,
    ) {
        let edit = EditEvent {
            channel_id: event.channel_id.get(),
            guild_id: event.guild_id.map(|g| g.get()),
            message_id: event.id.get(),
            author_id: event.author.as_ref().map(|a| a.id.get()),
            content: event.content.clone(),
        };
        let transport = self.transport(&ctx);
        if let Err(e) = self.service.process_edit(&transport, edit).await {
            tracing::error!("Failed to apply edit of message {}: {}", event.id, e);
        }
    }

    async fn reaction_add(&self, ctx: Context, reaction: Reaction) {
        let Some(user_id) = reaction.user_id else {
            return;
        };
        let ReactionType::Unicode(emoji) = &reaction.emoji else {
            return;
        };

        let event = ReactionEvent {
            channel_id: reaction.channel_id.get(),
            guild_id: reaction.guild_id.map(|g| g.get()),
            message_id: reaction.message_id.get(),
            user_id: user_id.get(),
            display_name: reaction
                .member
                .as_ref()
                .map(|m| m.display_name().to_string()),
            message_author_id: reaction.message_author_id.map(|u| u.get()),
            emoji: emoji.clone(),
        };
        let transport = self.transport(&ctx);
        if let Err(e) = self.service.process_reaction(&transport, event).await {
            tracing::error!(
                "Failed to apply reaction on message {}: {}",
                reaction.message_id,
                e
            );
        }
    }
}
