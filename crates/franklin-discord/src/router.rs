use std::sync::Arc;

use async_trait::async_trait;
use serenity::all::{
    ApplicationId, Client, Command, Context, EventHandler, GatewayIntents, Interaction, Message,
    Ready,
};
use tracing::{error, info};

use franklin_core::{
    commands::{command_specs, CommandHandlers},
    config::Config,
    messaging::port::MessagingPort,
    pipeline::MessagePipeline,
    ports::{ArchiveLookup, DomainStore},
};

use crate::{create_commands, inbound_message, DiscordInteraction, DiscordMessenger};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: MessagePipeline,
    pub commands: CommandHandlers,
}

struct Handler {
    cfg: Arc<Config>,
    store: Arc<dyn DomainStore>,
    lookup: Arc<dyn ArchiveLookup>,
    state: tokio::sync::OnceCell<Arc<AppState>>,
}

impl Handler {
    /// Services are built lazily because the messenger needs the client's `Http`.
    async fn state(&self, ctx: &Context) -> Arc<AppState> {
        self.state
            .get_or_init(|| async {
                let messenger: Arc<dyn MessagingPort> =
                    Arc::new(DiscordMessenger::new(ctx.http.clone()));
                Arc::new(AppState {
                    pipeline: MessagePipeline::new(
                        self.cfg.clone(),
                        self.store.clone(),
                        self.lookup.clone(),
                        messenger.clone(),
                    ),
                    commands: CommandHandlers::new(self.cfg.clone(), self.store.clone(), messenger),
                })
            })
            .await
            .clone()
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(user = %ready.user.tag(), "Ready! Logged in");

        let commands = create_commands(&command_specs());
        match Command::set_global_commands(&ctx.http, commands).await {
            Ok(registered) => info!(count = registered.len(), "Registered slash commands"),
            Err(e) => error!(error = %e, "Failed to register slash commands"),
        }
    }

    async fn message(&self, ctx: Context, msg: Message) {
        let state = self.state(&ctx).await;
        let outcome = state.pipeline.on_message(&inbound_message(&msg)).await;
        info!(message_id = msg.id.get(), ?outcome, "Message handled");
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        // Only chat-input commands are handled.
        let Interaction::Command(command) = interaction else {
            return;
        };

        let state = self.state(&ctx).await;
        let responder = DiscordInteraction::new(ctx.http.clone(), command);
        let invocation = responder.invocation();
        let outcome = state.commands.dispatch(&invocation, &responder).await;
        info!(command = %invocation.name, ?outcome, "Interaction handled");
    }
}

/// Link detection needs message bodies, hence `MESSAGE_CONTENT`.
fn gateway_intents() -> GatewayIntents {
    GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::DIRECT_MESSAGES
}

pub async fn run_gateway(
    cfg: Arc<Config>,
    store: Arc<dyn DomainStore>,
    lookup: Arc<dyn ArchiveLookup>,
) -> anyhow::Result<()> {
    let handler = Handler {
        cfg: cfg.clone(),
        store,
        lookup,
        state: tokio::sync::OnceCell::new(),
    };

    let mut client = Client::builder(&cfg.discord_token, gateway_intents())
        .application_id(ApplicationId::new(cfg.app_id))
        .event_handler(handler)
        .await?;

    info!(
        app_id = cfg.app_id,
        dm_owner_on_failure = cfg.dm_bot_owner_on_archive_failure,
        "Connecting to Discord"
    );
    client.start().await?;
    Ok(())
}
