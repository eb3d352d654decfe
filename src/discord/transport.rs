//! Serenity-backed implementation of the roster transport.

use async_trait::async_trait;
use serenity::builder::{CreateEmbed, CreateMessage, EditMessage};
use serenity::http::Http;
use serenity::model::channel::{Embed, Message, ReactionType};
use serenity::model::id::{ChannelId, GuildId, MessageId, UserId};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Result;
use crate::roster::{
    BoardEmbed, EmbedField, FetchedMessage, Identity, RenderedBoard, Transport, ABSENT_MARKER,
    PRESENT_MARKER,
};

/// Page size of guild member listing.
const MEMBER_PAGE: u64 = 1000;

pub struct SerenityTransport {
    http: Arc<Http>,
    bot_user_id: u64,
}

impl SerenityTransport {
    pub fn new(http: Arc<Http>, bot_user_id: u64) -> Self {
        Self { http, bot_user_id }
    }
}

/// Convert a received message into the board representation.
pub fn board_from_message(message: &Message) -> RenderedBoard {
    RenderedBoard {
        content: message.content.clone(),
        embed: message.embeds.first().map(board_embed),
    }
}

fn board_embed(embed: &Embed) -> BoardEmbed {
    BoardEmbed {
        title: embed.title.clone(),
        description: embed.description.clone(),
        color: embed.colour.map(|c| c.0),
        fields: embed
            .fields
            .iter()
            .map(|f| EmbedField::new(f.name.clone(), f.value.clone(), f.inline))
            .collect(),
    }
}

fn create_embed(embed: &BoardEmbed) -> CreateEmbed {
    let mut builder = CreateEmbed::new();
    if let Some(title) = &embed.title {
        builder = builder.title(title);
    }
    if let Some(description) = &embed.description {
        builder = builder.description(description);
    }
    if let Some(color) = embed.color {
        builder = builder.colour(color);
    }
    builder.fields(
        embed
            .fields
            .iter()
            .map(|f| (f.name.clone(), f.value.clone(), f.inline)),
    )
}

#[async_trait]
impl Transport for SerenityTransport {
    fn bot_user_id(&self) -> u64 {
        self.bot_user_id
    }

    async fn fetch_message(&self, channel_id: u64, message_id: u64) -> Result<FetchedMessage> {
        let message = ChannelId::new(channel_id)
            .message(&*self.http, MessageId::new(message_id))
            .await?;
        Ok(FetchedMessage {
            id: message.id.get(),
            author_id: message.author.id.get(),
            reply_to: message
                .message_reference
                .as_ref()
                .and_then(|r| r.message_id)
                .map(|id| id.get()),
            board: board_from_message(&message),
        })
    }

    async fn send_board(
        &self,
        channel_id: u64,
        reply_to: u64,
        board: &RenderedBoard,
    ) -> Result<u64> {
        let channel = ChannelId::new(channel_id);
        let mut builder =
            CreateMessage::new().reference_message((channel, MessageId::new(reply_to)));
        builder = match &board.embed {
            Some(embed) => builder.embed(create_embed(embed)),
            None => builder.content(&board.content),
        };
        let message = channel.send_message(&*self.http, builder).await?;
        Ok(message.id.get())
    }

    async fn edit_board(
        &self,
        channel_id: u64,
        message_id: u64,
        board: &RenderedBoard,
    ) -> Result<()> {
        let mut builder = EditMessage::new().content(&board.content);
        if let Some(embed) = &board.embed {
            builder = builder.embed(create_embed(embed));
        }
        ChannelId::new(channel_id)
            .edit_message(&*self.http, MessageId::new(message_id), builder)
            .await?;
        Ok(())
    }

    async fn add_status_markers(&self, channel_id: u64, message_id: u64) -> Result<()> {
        for marker in [PRESENT_MARKER, ABSENT_MARKER] {
            self.http
                .create_reaction(
                    ChannelId::new(channel_id),
                    MessageId::new(message_id),
                    &ReactionType::Unicode(marker.to_string()),
                )
                .await?;
        }
        Ok(())
    }

    async fn send_text(&self, channel_id: u64, text: &str) -> Result<()> {
        ChannelId::new(channel_id).say(&*self.http, text).await?;
        Ok(())
    }

    async fn resolve_members(&self, guild_id: u64) -> Result<Vec<Identity>> {
        let guild = GuildId::new(guild_id);
        let roles = guild.roles(&*self.http).await?;
        let role_names: HashMap<_, _> = roles
            .into_iter()
            .map(|(id, role)| (id, role.name))
            .collect();

        let mut identities = Vec::new();
        let mut after: Option<UserId> = None;
        loop {
            let page = guild
                .members(&*self.http, Some(MEMBER_PAGE), after)
                .await?;
            let fetched = page.len() as u64;
            after = page.last().map(|m| m.user.id);

            identities.extend(page.iter().map(|member| Identity {
                id: member.user.id.get(),
                display_name: member.display_name().to_string(),
                username: member.user.name.clone(),
                roles: member
                    .roles
                    .iter()
                    .filter_map(|r| role_names.get(r).cloned())
                    .collect(),
            }));

            if fetched < MEMBER_PAGE {
                break;
            }
        }
        tracing::debug!("Resolved {} members of guild {}", identities.len(), guild_id);
        Ok(identities)
    }

    async fn display_name(&self, guild_id: Option<u64>, user_id: u64) -> Result<Option<String>> {
        let user = UserId::new(user_id);
        match guild_id {
            Some(guild_id) => {
                let member = GuildId::new(guild_id).member(&*self.http, user).await?;
                Ok(Some(member.display_name().to_string()))
            }
            None => {
                let user = user.to_user(&*self.http).await?;
                Ok(Some(user.global_name.clone().unwrap_or(user.name)))
            }
        }
    }
}
