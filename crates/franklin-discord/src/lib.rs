//! Discord adapter (serenity).
//!
//! Implements the `franklin-core` messaging ports over the Discord HTTP API.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use serenity::all::{
    CommandDataOptionValue, CommandInteraction, CommandOptionType, CreateCommand,
    CreateCommandOption, CreateEmbed, CreateInteractionResponse, CreateInteractionResponseFollowup,
    CreateInteractionResponseMessage, CreateMessage, Http, Message, User,
};

pub mod router;

use franklin_core::{
    domain::{Author, ChannelId, MessageId, MessageRef, UserId},
    errors::Error,
    messaging::{
        port::{InteractionResponder, MessagingPort},
        types::{CommandInvocation, CommandSpec, Embed, InboundMessage},
    },
    Result,
};

fn map_err(e: serenity::Error) -> Error {
    Error::External(format!("discord error: {e}"))
}

#[derive(Clone)]
pub struct DiscordMessenger {
    http: Arc<Http>,
}

impl DiscordMessenger {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl MessagingPort for DiscordMessenger {
    async fn reply_to(&self, msg: MessageRef, text: &str) -> Result<MessageRef> {
        let channel = serenity::all::ChannelId::new(msg.channel_id.0);
        let builder = CreateMessage::new()
            .content(text)
            .reference_message((channel, serenity::all::MessageId::new(msg.message_id.0)));
        let sent = channel
            .send_message(&*self.http, builder)
            .await
            .map_err(map_err)?;

        Ok(MessageRef {
            channel_id: msg.channel_id,
            message_id: MessageId(sent.id.get()),
        })
    }

    async fn send_direct(&self, user: UserId, text: &str) -> Result<()> {
        let dm = serenity::all::UserId::new(user.0)
            .create_dm_channel(&*self.http)
            .await
            .map_err(map_err)?;
        dm.send_message(&*self.http, CreateMessage::new().content(text))
            .await
            .map_err(map_err)?;
        Ok(())
    }
}

/// Responder bound to one slash-command interaction.
pub struct DiscordInteraction {
    http: Arc<Http>,
    interaction: CommandInteraction,
    responded: AtomicBool,
}

impl DiscordInteraction {
    pub fn new(http: Arc<Http>, interaction: CommandInteraction) -> Self {
        Self {
            http,
            interaction,
            responded: AtomicBool::new(false),
        }
    }

    /// Platform-neutral view of the invocation.
    pub fn invocation(&self) -> CommandInvocation {
        let data = &self.interaction.data;
        command_invocation(
            &data.name,
            &self.interaction.user,
            data.options.iter().map(|opt| (opt.name.as_str(), &opt.value)),
        )
    }
}

/// Only string options are kept; the bot registers no other kind.
pub fn command_invocation<'a>(
    name: &str,
    user: &User,
    options: impl IntoIterator<Item = (&'a str, &'a CommandDataOptionValue)>,
) -> CommandInvocation {
    let options: HashMap<String, String> = options
        .into_iter()
        .filter_map(|(name, value)| match value {
            CommandDataOptionValue::String(s) => Some((name.to_string(), s.clone())),
            _ => None,
        })
        .collect();

    CommandInvocation {
        name: name.to_string(),
        user: author_of(user),
        options,
    }
}

#[async_trait]
impl InteractionResponder for DiscordInteraction {
    async fn reply(&self, text: &str) -> Result<()> {
        let response =
            CreateInteractionResponse::Message(CreateInteractionResponseMessage::new().content(text));
        self.interaction
            .create_response(&*self.http, response)
            .await
            .map_err(map_err)?;
        self.responded.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn defer(&self) -> Result<()> {
        self.interaction.defer(&*self.http).await.map_err(map_err)?;
        self.responded.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn follow_up(&self, text: &str) -> Result<()> {
        self.interaction
            .create_followup(&*self.http, CreateInteractionResponseFollowup::new().content(text))
            .await
            .map_err(map_err)?;
        Ok(())
    }

    async fn follow_up_embed(&self, embed: Embed) -> Result<()> {
        let embed = CreateEmbed::new()
            .title(embed.title)
            .description(embed.description);
        self.interaction
            .create_followup(&*self.http, CreateInteractionResponseFollowup::new().embed(embed))
            .await
            .map_err(map_err)?;
        Ok(())
    }

    fn has_responded(&self) -> bool {
        self.responded.load(Ordering::SeqCst)
    }
}

pub fn author_of(user: &User) -> Author {
    Author {
        id: UserId(user.id.get()),
        name: user.name.clone(),
        is_bot: user.bot,
    }
}

pub fn inbound_message(msg: &Message) -> InboundMessage {
    InboundMessage {
        message: MessageRef {
            channel_id: ChannelId(msg.channel_id.get()),
            message_id: MessageId(msg.id.get()),
        },
        author: author_of(&msg.author),
        content: msg.content.clone(),
    }
}

/// Map platform-neutral command specs onto serenity builders.
pub fn create_commands(specs: &[CommandSpec]) -> Vec<CreateCommand> {
    specs
        .iter()
        .map(|spec| {
            spec.options.iter().fold(
                CreateCommand::new(spec.name).description(spec.description),
                |cmd, opt| {
                    cmd.add_option(
                        CreateCommandOption::new(CommandOptionType::String, opt.name, opt.description)
                            .required(opt.required),
                    )
                },
            )
        })
        .collect()
}
