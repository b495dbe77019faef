//! In-memory fakes for the ports, shared by unit tests.

use std::{
    collections::VecDeque,
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::{
    domain::{ArchivedMemento, ChannelId, MessageId, MessageRef, UserId},
    errors::Error,
    messaging::{
        port::{InteractionResponder, MessagingPort},
        types::Embed,
    },
    ports::{ArchiveLookup, DomainStore},
    Result,
};

static COUNTER: AtomicU64 = AtomicU64::new(0);

pub fn tmp_dir(prefix: &str) -> PathBuf {
    let ts = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!("{prefix}-{}-{ts}-{n}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

pub fn memento(url: &str, day: u32) -> ArchivedMemento {
    ArchivedMemento {
        url: url.to_string(),
        timestamp: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
    }
}

#[derive(Default)]
pub struct MemoryStore {
    pub domains: Mutex<Vec<String>>,
    pub saves: AtomicUsize,
    pub fail_list: AtomicBool,
}

impl MemoryStore {
    pub fn with(domains: &[&str]) -> Self {
        Self {
            domains: Mutex::new(domains.iter().map(|d| d.to_string()).collect()),
            ..Self::default()
        }
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.domains.lock().unwrap().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DomainStore for MemoryStore {
    async fn list(&self) -> Result<Vec<String>> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(Error::storage("/memory", "unreadable"));
        }
        Ok(self.snapshot())
    }

    async fn save(&self, mut domains: Vec<String>) -> Result<()> {
        domains.sort();
        domains.dedup();
        *self.domains.lock().unwrap() = domains;
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Scripted archive lookups: each call pops the next queued result, else returns `default`.
#[derive(Default)]
pub struct FakeLookup {
    pub script: Mutex<VecDeque<Result<Vec<ArchivedMemento>>>>,
    pub by_url: Mutex<Vec<(String, Vec<ArchivedMemento>)>>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeLookup {
    pub fn push(&self, result: Result<Vec<ArchivedMemento>>) {
        self.script.lock().unwrap().push_back(result);
    }

    pub fn archive(&self, url: &str, mementos: Vec<ArchivedMemento>) {
        self.by_url.lock().unwrap().push((url.to_string(), mementos));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArchiveLookup for FakeLookup {
    async fn timemap(&self, url: &str) -> Result<Vec<ArchivedMemento>> {
        self.calls.lock().unwrap().push(url.to_string());
        if let Some(next) = self.script.lock().unwrap().pop_front() {
            return next;
        }
        let by_url = self.by_url.lock().unwrap();
        Ok(by_url
            .iter()
            .find(|(u, _)| u == url)
            .map(|(_, m)| m.clone())
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub struct FakeMessenger {
    pub replies: Mutex<Vec<(MessageRef, String)>>,
    pub dms: Mutex<Vec<(UserId, String)>>,
    pub fail_dm: AtomicBool,
    pub fail_reply: AtomicBool,
    next_id: AtomicU64,
}

impl FakeMessenger {
    pub fn replies(&self) -> Vec<(MessageRef, String)> {
        self.replies.lock().unwrap().clone()
    }

    pub fn dms(&self) -> Vec<(UserId, String)> {
        self.dms.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessagingPort for FakeMessenger {
    async fn reply_to(&self, msg: MessageRef, text: &str) -> Result<MessageRef> {
        if self.fail_reply.load(Ordering::SeqCst) {
            return Err(Error::External("reply rejected".to_string()));
        }
        self.replies.lock().unwrap().push((msg, text.to_string()));
        Ok(MessageRef {
            channel_id: msg.channel_id,
            message_id: MessageId(1_000 + self.next_id.fetch_add(1, Ordering::SeqCst)),
        })
    }

    async fn send_direct(&self, user: UserId, text: &str) -> Result<()> {
        if self.fail_dm.load(Ordering::SeqCst) {
            return Err(Error::External("cannot DM user".to_string()));
        }
        self.dms.lock().unwrap().push((user, text.to_string()));
        Ok(())
    }
}

/// What a fake interaction saw, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Sent {
    Reply(String),
    Defer,
    FollowUp(String),
    FollowUpEmbed(Embed),
}

#[derive(Default)]
pub struct FakeResponder {
    pub sent: Mutex<Vec<Sent>>,
    pub responded: AtomicBool,
    pub fail_follow_up: AtomicBool,
}

impl FakeResponder {
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn only_reply(&self) -> String {
        match self.sent().as_slice() {
            [Sent::Reply(text)] => text.clone(),
            other => panic!("expected a single reply, got {other:?}"),
        }
    }
}

#[async_trait]
impl InteractionResponder for FakeResponder {
    async fn reply(&self, text: &str) -> Result<()> {
        assert!(!self.has_responded(), "interaction already acknowledged");
        self.sent.lock().unwrap().push(Sent::Reply(text.to_string()));
        self.responded.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn defer(&self) -> Result<()> {
        assert!(!self.has_responded(), "interaction already acknowledged");
        self.sent.lock().unwrap().push(Sent::Defer);
        self.responded.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn follow_up(&self, text: &str) -> Result<()> {
        if self.fail_follow_up.load(Ordering::SeqCst) {
            return Err(Error::External("follow-up rejected".to_string()));
        }
        self.sent.lock().unwrap().push(Sent::FollowUp(text.to_string()));
        Ok(())
    }

    async fn follow_up_embed(&self, embed: Embed) -> Result<()> {
        if self.fail_follow_up.load(Ordering::SeqCst) {
            return Err(Error::External("follow-up rejected".to_string()));
        }
        self.sent.lock().unwrap().push(Sent::FollowUpEmbed(embed));
        Ok(())
    }

    fn has_responded(&self) -> bool {
        self.responded.load(Ordering::SeqCst)
    }
}

pub fn channel_message(channel: u64, id: u64) -> MessageRef {
    MessageRef {
        channel_id: ChannelId(channel),
        message_id: MessageId(id),
    }
}
