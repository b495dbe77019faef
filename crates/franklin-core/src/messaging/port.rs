use async_trait::async_trait;

use crate::{
    domain::{MessageRef, UserId},
    messaging::types::Embed,
    Result,
};

/// Outbound messaging that is not tied to an interaction.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    /// Post `text` in the message's channel as a threaded reply to it.
    async fn reply_to(&self, msg: MessageRef, text: &str) -> Result<MessageRef>;

    /// Open (or reuse) a DM channel with `user` and send `text`.
    async fn send_direct(&self, user: UserId, text: &str) -> Result<()>;
}

/// Response surface of a single command invocation.
///
/// An invocation gets exactly one initial response (`reply` or `defer`);
/// anything after that goes through `follow_up*`.
#[async_trait]
pub trait InteractionResponder: Send + Sync {
    async fn reply(&self, text: &str) -> Result<()>;
    async fn defer(&self) -> Result<()>;
    async fn follow_up(&self, text: &str) -> Result<()>;
    async fn follow_up_embed(&self, embed: Embed) -> Result<()>;

    /// True once `reply` or `defer` has succeeded.
    fn has_responded(&self) -> bool;
}
