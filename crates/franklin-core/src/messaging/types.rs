use std::collections::HashMap;

use crate::domain::{Author, MessageRef};

/// A text message seen on the gateway.
#[derive(Clone, Debug)]
pub struct InboundMessage {
    pub message: MessageRef,
    pub author: Author,
    pub content: String,
}

/// A structured (slash) command invocation with its string options.
#[derive(Clone, Debug)]
pub struct CommandInvocation {
    pub name: String,
    pub user: Author,
    pub options: HashMap<String, String>,
}

impl CommandInvocation {
    pub fn option(&self, name: &str) -> Option<&str> {
        self.options.get(name).map(String::as_str)
    }
}

/// A titled rich block (Discord embed).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Embed {
    pub title: String,
    pub description: String,
}

/// Registration shape of a command, independent of the platform builder API.
#[derive(Clone, Debug)]
pub struct CommandSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub options: Vec<CommandOptionSpec>,
}

#[derive(Clone, Debug)]
pub struct CommandOptionSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
}
