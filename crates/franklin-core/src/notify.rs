//! Best-effort operator diagnostics.

use std::sync::Arc;

use tracing::{error, info};

use crate::{config::Config, domain::UserId, messaging::port::MessagingPort};

pub const DIAGNOSTIC_HEADER: &str = "Error from the Franklin Bot!";

/// Sends diagnostic DMs to the configured bot owner when escalation is enabled.
#[derive(Clone)]
pub struct OwnerNotifier {
    cfg: Arc<Config>,
    messenger: Arc<dyn MessagingPort>,
}

impl OwnerNotifier {
    pub fn new(cfg: Arc<Config>, messenger: Arc<dyn MessagingPort>) -> Self {
        Self { cfg, messenger }
    }

    pub fn enabled(&self) -> bool {
        self.cfg.dm_bot_owner_on_archive_failure
    }

    /// DM the owner. Never fails: a delivery error is logged and swallowed.
    pub async fn notify(&self, lines: &[String]) {
        if !self.enabled() {
            return;
        }

        let mut body = vec![DIAGNOSTIC_HEADER.to_string()];
        body.extend(lines.iter().cloned());

        match self
            .messenger
            .send_direct(UserId(self.cfg.bot_owner), &body.join("\n"))
            .await
        {
            Ok(()) => info!(owner = self.cfg.bot_owner, "Informed bot owner of the failure"),
            Err(e) => error!(error = %e, "Failed to inform the bot owner of the failure"),
        }
    }
}
