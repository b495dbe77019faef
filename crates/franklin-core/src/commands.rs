//! Administrative slash commands for the watched-domain list.

use std::sync::Arc;

use tracing::{error, info};

use crate::{
    config::Config,
    domain::WatchedDomain,
    formatting::{chunk_chars, code_block, NOTICE, SUCCESS},
    messaging::{
        port::{InteractionResponder, MessagingPort},
        types::{CommandInvocation, CommandOptionSpec, CommandSpec, Embed},
    },
    notify::OwnerNotifier,
    ports::DomainStore,
    Result,
};

pub const DOMAIN_OPTION: &str = "domain";
pub const LIST_TITLE: &str = "Paywall Domain List";
pub const GENERIC_ERROR_MESSAGE: &str = "FranklinBot encountered an issue ... apologies!";
pub const GREETING_MESSAGE: &str =
    "👋 Hello from Franklin Bot! I'm up and keeping an eye out for paywalled links.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandName {
    AddPaywallDomain,
    ListPaywallDomains,
    RemovePaywallDomain,
    Greeting,
}

impl CommandName {
    pub const ALL: [CommandName; 4] = [
        CommandName::AddPaywallDomain,
        CommandName::ListPaywallDomains,
        CommandName::RemovePaywallDomain,
        CommandName::Greeting,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CommandName::AddPaywallDomain => "add-paywall-domain",
            CommandName::ListPaywallDomains => "list-paywall-domains",
            CommandName::RemovePaywallDomain => "remove-paywall-domain",
            CommandName::Greeting => "greeting",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }
}

/// Registration payload for every command, in a platform-neutral shape.
pub fn command_specs() -> Vec<CommandSpec> {
    CommandName::ALL
        .into_iter()
        .map(|name| match name {
            CommandName::AddPaywallDomain => CommandSpec {
                name: name.as_str(),
                description: "Adds a domain to the paywall domain list for archive lookup eligibility",
                options: vec![CommandOptionSpec {
                    name: DOMAIN_OPTION,
                    description: "The domain to add to the paywall domain list",
                    required: true,
                }],
            },
            CommandName::ListPaywallDomains => CommandSpec {
                name: name.as_str(),
                description: "Lists the domains in the paywall domain list",
                options: vec![],
            },
            CommandName::RemovePaywallDomain => CommandSpec {
                name: name.as_str(),
                description: "Removes a domain from the paywall domain list",
                options: vec![CommandOptionSpec {
                    name: DOMAIN_OPTION,
                    description: "The domain to remove from the paywall domain list",
                    required: true,
                }],
            },
            CommandName::Greeting => CommandSpec {
                name: name.as_str(),
                description: "Says hello, so you know the bot is alive",
                options: vec![],
            },
        })
        .collect()
}

/// How a command invocation ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Not one of ours.
    Ignored,
    Completed,
    /// The handler failed; the apology path ran.
    Failed,
}

#[derive(Clone)]
pub struct CommandHandlers {
    cfg: Arc<Config>,
    store: Arc<dyn DomainStore>,
    notifier: OwnerNotifier,
}

impl CommandHandlers {
    pub fn new(
        cfg: Arc<Config>,
        store: Arc<dyn DomainStore>,
        messenger: Arc<dyn MessagingPort>,
    ) -> Self {
        let notifier = OwnerNotifier::new(cfg.clone(), messenger);
        Self {
            cfg,
            store,
            notifier,
        }
    }

    /// Route one invocation. Never fails: handler errors become an owner DM
    /// (when enabled) plus a generic apology to the invoking user.
    pub async fn dispatch(
        &self,
        inv: &CommandInvocation,
        responder: &dyn InteractionResponder,
    ) -> CommandOutcome {
        let Some(name) = CommandName::parse(&inv.name) else {
            return CommandOutcome::Ignored;
        };

        let res = match name {
            CommandName::AddPaywallDomain => self.add_domain(inv, responder).await,
            CommandName::ListPaywallDomains => self.list_domains(responder).await,
            CommandName::RemovePaywallDomain => self.remove_domain(inv, responder).await,
            CommandName::Greeting => responder.reply(GREETING_MESSAGE).await,
        };

        let Err(e) = res else {
            return CommandOutcome::Completed;
        };

        error!(
            command = %inv.name,
            user = inv.user.id.0,
            user_name = %inv.user.name,
            error = %e,
            "Encountered an error when handling an interaction"
        );
        self.notifier
            .notify(&[
                format!("Interaction: {}", inv.name),
                format!("Author: {}", inv.user.mention()),
                format!("Error: {e}"),
            ])
            .await;

        let apology = if responder.has_responded() {
            responder.follow_up(GENERIC_ERROR_MESSAGE).await
        } else {
            responder.reply(GENERIC_ERROR_MESSAGE).await
        };
        if let Err(inner) = apology {
            error!(error = %inner, "Encountered an error while concluding the interaction");
        }
        CommandOutcome::Failed
    }

    async fn add_domain(
        &self,
        inv: &CommandInvocation,
        responder: &dyn InteractionResponder,
    ) -> Result<()> {
        info!("Add paywall domain entry");
        let Some(raw) = inv.option(DOMAIN_OPTION).filter(|s| !s.is_empty()) else {
            return responder
                .reply(&format!("{NOTICE} You must supply a domain to add to the list"))
                .await;
        };
        let Ok(domain) = WatchedDomain::parse(raw) else {
            return responder.reply(&invalid_domain_notice("add to")).await;
        };

        let mut domains = self.store.list().await?;
        if domains.iter().any(|d| d == domain.as_str()) {
            return responder
                .reply(&format!(
                    "{NOTICE} **{domain}** already existed in the list -- there is nothing for us to add! {}",
                    list_hint()
                ))
                .await;
        }

        domains.push(domain.to_string());
        self.store.save(domains).await?;

        let msg = format!("{SUCCESS} Successfully added **{domain}** to the paywall domain list!");
        info!(%domain, "Added paywall domain");
        responder.reply(&msg).await
    }

    async fn list_domains(&self, responder: &dyn InteractionResponder) -> Result<()> {
        info!("List paywall domain entries");
        responder.defer().await?;

        let domains = self.store.list().await?;
        if domains.is_empty() {
            return responder
                .follow_up(&format!("{NOTICE} The paywall domain list is empty"))
                .await;
        }

        for chunk in chunk_chars(&domains.join(", "), self.cfg.list_chunk_size) {
            responder
                .follow_up_embed(Embed {
                    title: LIST_TITLE.to_string(),
                    description: code_block(&chunk),
                })
                .await?;
        }
        Ok(())
    }

    async fn remove_domain(
        &self,
        inv: &CommandInvocation,
        responder: &dyn InteractionResponder,
    ) -> Result<()> {
        info!("Remove paywall domain entry");
        let Some(raw) = inv.option(DOMAIN_OPTION).filter(|s| !s.is_empty()) else {
            return responder
                .reply(&format!("{NOTICE} You must supply a domain to remove from the list"))
                .await;
        };
        let Ok(domain) = WatchedDomain::parse(raw) else {
            return responder.reply(&invalid_domain_notice("remove from")).await;
        };

        let mut domains = self.store.list().await?;
        let Some(idx) = domains.iter().position(|d| d == domain.as_str()) else {
            return responder
                .reply(&format!(
                    "{NOTICE} **{domain}** does not exist in the list -- there is nothing for us to remove! {}",
                    list_hint()
                ))
                .await;
        };

        domains.remove(idx);
        self.store.save(domains).await?;

        let msg =
            format!("{SUCCESS} Successfully removed **{domain}** from the paywall domain list!");
        info!(%domain, "Removed paywall domain");
        responder.reply(&msg).await
    }
}

fn invalid_domain_notice(verb: &str) -> String {
    format!(
        "{NOTICE} Please supply a valid domain to {verb} the list. Valid domains do not have the TLD at the end i.e `bloomberg` instead of `bloomberg.com`"
    )
}

fn list_hint() -> String {
    format!(
        "You can always use the `/{}` command to view the currently supported domains",
        CommandName::ListPaywallDomains.as_str()
    )
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::atomic::Ordering};

    use super::*;
    use crate::{
        config::test_config,
        domain::{Author, UserId},
        test_support::{tmp_dir, FakeMessenger, FakeResponder, MemoryStore, Sent},
    };

    struct Harness {
        store: Arc<MemoryStore>,
        messenger: Arc<FakeMessenger>,
        handlers: CommandHandlers,
    }

    fn harness(domains: &[&str], dm_owner: bool) -> Harness {
        let mut cfg = test_config(&tmp_dir("franklin-commands"));
        cfg.dm_bot_owner_on_archive_failure = dm_owner;
        let store = Arc::new(MemoryStore::with(domains));
        let messenger = Arc::new(FakeMessenger::default());
        let handlers = CommandHandlers::new(Arc::new(cfg), store.clone(), messenger.clone());
        Harness {
            store,
            messenger,
            handlers,
        }
    }

    fn invocation(name: &str, domain: Option<&str>) -> CommandInvocation {
        let mut options = HashMap::new();
        if let Some(d) = domain {
            options.insert(DOMAIN_OPTION.to_string(), d.to_string());
        }
        CommandInvocation {
            name: name.to_string(),
            user: Author {
                id: UserId(5),
                name: "admin".to_string(),
                is_bot: false,
            },
            options,
        }
    }

    async fn run(h: &Harness, inv: CommandInvocation) -> (CommandOutcome, FakeResponder) {
        let responder = FakeResponder::default();
        let outcome = h.handlers.dispatch(&inv, &responder).await;
        (outcome, responder)
    }

    #[test]
    fn command_names_round_trip() {
        for c in CommandName::ALL {
            assert_eq!(CommandName::parse(c.as_str()), Some(c));
        }
        assert_eq!(CommandName::parse("addpaywalldomain"), None);
    }

    #[test]
    fn specs_require_domain_for_add_and_remove() {
        let specs = command_specs();
        assert_eq!(specs.len(), 4);
        for spec in specs {
            let needs_domain = matches!(spec.name, "add-paywall-domain" | "remove-paywall-domain");
            assert_eq!(
                spec.options.iter().any(|o| o.name == DOMAIN_OPTION && o.required),
                needs_domain,
                "{}",
                spec.name
            );
        }
    }

    #[tokio::test]
    async fn add_normalizes_and_persists() {
        let h = harness(&["wsj"], false);
        let (outcome, r) = run(&h, invocation("add-paywall-domain", Some("NYTimes"))).await;

        assert_eq!(outcome, CommandOutcome::Completed);
        assert_eq!(
            r.only_reply(),
            "✅ Successfully added **nytimes** to the paywall domain list!"
        );
        assert_eq!(h.store.snapshot(), vec!["nytimes", "wsj"]);
    }

    #[tokio::test]
    async fn add_duplicate_is_notice_without_write() {
        let h = harness(&["nytimes"], false);
        let (_, r) = run(&h, invocation("add-paywall-domain", Some("nytimes"))).await;

        let reply = r.only_reply();
        assert!(reply.starts_with("⚠️ **nytimes** already existed"), "{reply}");
        assert!(reply.contains("/list-paywall-domains"));
        assert_eq!(h.store.save_count(), 0);
        assert_eq!(h.store.snapshot(), vec!["nytimes"]);
    }

    #[tokio::test]
    async fn add_rejects_missing_and_invalid_input() {
        let h = harness(&[], false);

        let (_, r) = run(&h, invocation("add-paywall-domain", None)).await;
        assert_eq!(r.only_reply(), "⚠️ You must supply a domain to add to the list");

        for bad in ["bloomberg.com", "x", "news/site", "bad_name"] {
            let (outcome, r) = run(&h, invocation("add-paywall-domain", Some(bad))).await;
            assert_eq!(outcome, CommandOutcome::Completed);
            assert!(r.only_reply().contains("instead of `bloomberg.com`"), "{bad}");
        }
        assert_eq!(h.store.save_count(), 0);
        assert!(h.messenger.dms().is_empty());
    }

    #[tokio::test]
    async fn empty_domain_option_counts_as_missing() {
        let h = harness(&["wsj"], false);

        let (_, r) = run(&h, invocation("add-paywall-domain", Some(""))).await;
        assert_eq!(r.only_reply(), "⚠️ You must supply a domain to add to the list");

        let (_, r) = run(&h, invocation("remove-paywall-domain", Some(""))).await;
        assert_eq!(r.only_reply(), "⚠️ You must supply a domain to remove from the list");
        assert_eq!(h.store.save_count(), 0);
    }

    #[tokio::test]
    async fn remove_deletes_and_persists() {
        let h = harness(&["ft", "wsj"], false);
        let (_, r) = run(&h, invocation("remove-paywall-domain", Some("WSJ"))).await;

        assert_eq!(
            r.only_reply(),
            "✅ Successfully removed **wsj** from the paywall domain list!"
        );
        assert_eq!(h.store.snapshot(), vec!["ft"]);
    }

    #[tokio::test]
    async fn remove_absent_is_notice_without_write() {
        let h = harness(&["ft"], false);
        let (_, r) = run(&h, invocation("remove-paywall-domain", Some("wsj"))).await;

        assert!(r.only_reply().starts_with("⚠️ **wsj** does not exist in the list"));
        assert_eq!(h.store.save_count(), 0);

        let (_, r) = run(&h, invocation("remove-paywall-domain", None)).await;
        assert_eq!(r.only_reply(), "⚠️ You must supply a domain to remove from the list");
    }

    #[tokio::test]
    async fn list_defers_then_sends_titled_code_block() {
        let h = harness(&["ft", "wsj"], false);
        let (_, r) = run(&h, invocation("list-paywall-domains", None)).await;

        assert_eq!(
            r.sent(),
            vec![
                Sent::Defer,
                Sent::FollowUpEmbed(Embed {
                    title: "Paywall Domain List".to_string(),
                    description: "```\nft, wsj\n```".to_string(),
                }),
            ]
        );
    }

    #[tokio::test]
    async fn list_chunks_long_output() {
        let long: Vec<String> = (0..100).map(|i| format!("{i:0>50}")).collect();
        let refs: Vec<&str> = long.iter().map(String::as_str).collect();
        let h = harness(&refs, false);
        let joined_len = long.join(", ").chars().count();
        assert!(joined_len > 4000);

        let (_, r) = run(&h, invocation("list-paywall-domains", None)).await;

        let embeds: Vec<Embed> = r
            .sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::FollowUpEmbed(e) => Some(e),
                _ => None,
            })
            .collect();
        assert_eq!(embeds.len(), joined_len.div_ceil(4000));
        for e in &embeds {
            let body = e
                .description
                .trim_start_matches("```\n")
                .trim_end_matches("\n```");
            assert!(body.chars().count() <= 4000);
        }
    }

    #[tokio::test]
    async fn list_of_empty_store_still_answers() {
        let h = harness(&[], false);
        let (_, r) = run(&h, invocation("list-paywall-domains", None)).await;
        assert_eq!(
            r.sent(),
            vec![
                Sent::Defer,
                Sent::FollowUp("⚠️ The paywall domain list is empty".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn greeting_is_fixed_reply_without_store() {
        let h = harness(&[], false);
        h.store.fail_list.store(true, Ordering::SeqCst);
        let (outcome, r) = run(&h, invocation("greeting", None)).await;
        assert_eq!(outcome, CommandOutcome::Completed);
        assert_eq!(r.only_reply(), GREETING_MESSAGE);
    }

    #[tokio::test]
    async fn unknown_command_is_ignored() {
        let h = harness(&[], false);
        let (outcome, r) = run(&h, invocation("something-else", None)).await;
        assert_eq!(outcome, CommandOutcome::Ignored);
        assert!(r.sent().is_empty());
    }

    #[tokio::test]
    async fn storage_failure_apologizes_and_dms_owner() {
        let h = harness(&["ft"], true);
        h.store.fail_list.store(true, Ordering::SeqCst);

        let (outcome, r) = run(&h, invocation("add-paywall-domain", Some("wsj"))).await;
        assert_eq!(outcome, CommandOutcome::Failed);
        assert_eq!(r.only_reply(), GENERIC_ERROR_MESSAGE);

        let dms = h.messenger.dms();
        assert_eq!(dms.len(), 1);
        assert!(dms[0].1.contains("Interaction: add-paywall-domain"));
        assert!(dms[0].1.contains("Author: <@5>"));
    }

    #[tokio::test]
    async fn failure_after_defer_apologizes_with_follow_up() {
        let h = harness(&["ft"], false);
        h.store.fail_list.store(true, Ordering::SeqCst);

        let (outcome, r) = run(&h, invocation("list-paywall-domains", None)).await;
        assert_eq!(outcome, CommandOutcome::Failed);
        assert_eq!(
            r.sent(),
            vec![Sent::Defer, Sent::FollowUp(GENERIC_ERROR_MESSAGE.to_string())]
        );
        assert!(h.messenger.dms().is_empty());
    }

    #[tokio::test]
    async fn failing_apology_is_only_logged() {
        let h = harness(&["ft"], false);
        let responder = FakeResponder::default();
        responder.fail_follow_up.store(true, Ordering::SeqCst);

        let outcome = h
            .handlers
            .dispatch(&invocation("list-paywall-domains", None), &responder)
            .await;
        assert_eq!(outcome, CommandOutcome::Failed);
    }
}
