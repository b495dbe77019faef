//! Inbound message -> archived links reply.
//!
//! `Start -> Extracting -> LookingUp -> Replying -> Done`. Any failure after
//! `Start` restarts the whole run after a fixed delay, up to
//! `max_invocation_attempts`; the last failure is escalated to the bot owner.

use std::sync::Arc;

use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::{
    archive::get_latest_archived_url,
    config::Config,
    errors::Error,
    extract::extract_paywall_domain_urls,
    formatting::generate_reply,
    messaging::{port::MessagingPort, types::InboundMessage},
    notify::OwnerNotifier,
    ports::{ArchiveLookup, DomainStore},
    Result,
};

/// Terminal state of one pipeline invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Author is a bot; nothing examined.
    IgnoredBot,
    /// No links on watched domains.
    NoMatches,
    /// Matches found, but none has a snapshot.
    NoArchives,
    /// Reply posted with this text.
    Replied(String),
    /// Every attempt failed. `escalated` is true when the owner DM path was taken.
    Failed { escalated: bool },
}

/// Retry state for one inbound message.
#[derive(Clone, Copy, Debug)]
struct InvocationContext {
    attempt: u32,
    max_attempts: u32,
}

impl InvocationContext {
    fn new(max_attempts: u32) -> Self {
        Self {
            attempt: 1,
            max_attempts: max_attempts.max(1),
        }
    }

    fn can_retry(&self) -> bool {
        self.attempt < self.max_attempts
    }
}

#[derive(Clone)]
pub struct MessagePipeline {
    cfg: Arc<Config>,
    store: Arc<dyn DomainStore>,
    lookup: Arc<dyn ArchiveLookup>,
    messenger: Arc<dyn MessagingPort>,
    notifier: OwnerNotifier,
}

impl MessagePipeline {
    pub fn new(
        cfg: Arc<Config>,
        store: Arc<dyn DomainStore>,
        lookup: Arc<dyn ArchiveLookup>,
        messenger: Arc<dyn MessagingPort>,
    ) -> Self {
        let notifier = OwnerNotifier::new(cfg.clone(), messenger.clone());
        Self {
            cfg,
            store,
            lookup,
            messenger,
            notifier,
        }
    }

    pub async fn on_message(&self, msg: &InboundMessage) -> PipelineOutcome {
        let mut ctx = InvocationContext::new(self.cfg.max_invocation_attempts);

        loop {
            if msg.author.is_bot {
                return PipelineOutcome::IgnoredBot;
            }

            info!(
                message_id = msg.message.message_id.0,
                author = %msg.author.name,
                attempt = ctx.attempt,
                "Incoming message"
            );

            match self.run_once(msg).await {
                Ok(outcome) => return outcome,
                Err(e) => {
                    error!(
                        message_id = msg.message.message_id.0,
                        attempt = ctx.attempt,
                        error = %e,
                        "Encountered an error handling an incoming message"
                    );
                    if !ctx.can_retry() {
                        return self.escalate(msg, &e).await;
                    }
                    info!(
                        attempt = ctx.attempt,
                        max_attempts = ctx.max_attempts,
                        delay_ms = self.cfg.retry_delay.as_millis() as u64,
                        "Retrying message"
                    );
                    sleep(self.cfg.retry_delay).await;
                    ctx.attempt += 1;
                }
            }
        }
    }

    async fn run_once(&self, msg: &InboundMessage) -> Result<PipelineOutcome> {
        let matches = extract_paywall_domain_urls(
            self.store.as_ref(),
            &msg.content,
            self.cfg.max_urls_per_message,
        )
        .await?;
        if matches.is_empty() {
            return Ok(PipelineOutcome::NoMatches);
        }
        info!(count = matches.len(), "Found paywalled URLs");

        let mut archived = Vec::with_capacity(matches.len());
        for m in &matches {
            // Absent snapshots are expected; only errors are retried.
            if let Some(memento) = get_latest_archived_url(self.lookup.as_ref(), &m.url).await? {
                archived.push(memento.url);
            }
        }

        let Some(reply) = generate_reply(&archived) else {
            return Ok(PipelineOutcome::NoArchives);
        };
        self.messenger.reply_to(msg.message, &reply).await?;
        Ok(PipelineOutcome::Replied(reply))
    }

    async fn escalate(&self, msg: &InboundMessage, err: &Error) -> PipelineOutcome {
        if !self.notifier.enabled() {
            error!(
                message_id = msg.message.message_id.0,
                error = %err,
                "Reached max invocation attempts, giving up"
            );
            return PipelineOutcome::Failed { escalated: false };
        }

        warn!("Reached max invocation attempts, informing the bot owner");
        self.notifier
            .notify(&[
                format!("Message: {}", msg.content),
                format!("Author: {}", msg.author.mention()),
                format!("Error: {err}"),
            ])
            .await;
        PipelineOutcome::Failed { escalated: true }
    }
}
