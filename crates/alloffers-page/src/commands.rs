use std::str::FromStr;

use anyhow::{Context, anyhow, bail};
use tracing::{info, warn};

use alloffers_client::ApiClient;
use alloffers_types::api::Vote;
use alloffers_types::dom::{Selector, VoteScope};
use alloffers_ui::Page;
use alloffers_ui::cosmetic::Intersection;
use alloffers_ui::dom::{Dom, LoggedDom, MemoryDom};

pub const USAGE: &str = "\
commands:
  search <text>                      type into the search box (empty clears)
  like <offer>                       toggle like on an offer
  follow-business <id>               toggle business follow
  follow-category <id>               toggle category follow
  vote review|reply like|dislike <id>
  read <notification>                mark a notification read
  refresh                            fetch the unread count now
  sidebar                            collapse / expand the sidebar
  menu                               open / close the mobile menu
  click <selector>                   click the first matching element
  scroll <selector>                  bring matching elements into view
  help
  quit

The page starts as the bare dashboard skeleton. Set ALLOFFERS_FIXTURE to a
JSON element list (see fixtures/offer-page.json) to add the like, follow,
vote and expiry elements the commands above patch.";

/// One line of stdin input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    Like(u64),
    FollowBusiness(u64),
    FollowCategory(u64),
    Vote { scope: VoteScope, vote: Vote, id: u64 },
    Read(u64),
    Refresh,
    Sidebar,
    Menu,
    Click(Selector),
    Scroll(Selector),
    Help,
    Quit,
}

fn id(arg: Option<&str>, what: &str) -> anyhow::Result<u64> {
    let raw = arg.ok_or_else(|| anyhow!("missing {} id", what))?;
    raw.parse().with_context(|| format!("invalid {} id '{}'", what, raw))
}

fn selector(rest: &str) -> anyhow::Result<Selector> {
    if rest.is_empty() {
        bail!("missing selector");
    }
    Ok(rest.parse()?)
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (name, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let mut args = rest.split_whitespace();

        let cmd = match name {
            "search" => Self::Search(rest.to_string()),
            "like" => Self::Like(id(args.next(), "offer")?),
            "follow-business" => Self::FollowBusiness(id(args.next(), "business")?),
            "follow-category" => Self::FollowCategory(id(args.next(), "category")?),
            "vote" => {
                let scope = match args.next() {
                    Some("review") => VoteScope::Review,
                    Some("reply") => VoteScope::Reply,
                    other => bail!("expected review or reply, got {:?}", other),
                };
                let vote = match args.next() {
                    Some("like") => Vote::Like,
                    Some("dislike") => Vote::Dislike,
                    other => bail!("expected like or dislike, got {:?}", other),
                };
                Self::Vote { scope, vote, id: id(args.next(), scope.prefix())? }
            }
            "read" => Self::Read(id(args.next(), "notification")?),
            "refresh" => Self::Refresh,
            "sidebar" => Self::Sidebar,
            "menu" => Self::Menu,
            "click" => Self::Click(selector(rest)?),
            "scroll" => Self::Scroll(selector(rest)?),
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => bail!("unknown command '{}' (try 'help')", other),
        };
        Ok(cmd)
    }
}

/// Run one command against the page. Network-bound commands are spawned
/// so input keeps flowing while requests are in flight.
pub fn execute(cmd: Command, page: &mut Page<ApiClient>, dom: &LoggedDom<MemoryDom>) -> anyhow::Result<()> {
    match cmd {
        Command::Search(text) => page.search_input(&text),
        Command::Like(offer_id) => {
            let toggles = page.toggles();
            tokio::spawn(async move {
                let outcome = toggles.toggle_like(offer_id).await;
                info!(offer_id, ?outcome, "Like toggled");
            });
        }
        Command::FollowBusiness(business_id) => {
            let toggles = page.toggles();
            tokio::spawn(async move {
                let outcome = toggles.toggle_follow_business(business_id).await;
                info!(business_id, ?outcome, "Business follow toggled");
            });
        }
        Command::FollowCategory(category_id) => {
            let toggles = page.toggles();
            tokio::spawn(async move {
                let outcome = toggles.toggle_follow_category(category_id).await;
                info!(category_id, ?outcome, "Category follow toggled");
            });
        }
        Command::Vote { scope, vote, id } => {
            let toggles = page.toggles();
            tokio::spawn(async move {
                let outcome = toggles.toggle_vote(scope, id, vote).await;
                info!(id, ?scope, ?vote, ?outcome, "Vote toggled");
            });
        }
        Command::Read(notification_id) => {
            let notifications = page.notifications();
            tokio::spawn(async move {
                match notifications.mark_read(notification_id).await {
                    Ok(count) => info!(notification_id, unread = count, "Notification read"),
                    Err(e) => warn!(notification_id, error = %e, "Could not mark notification read"),
                }
            });
        }
        Command::Refresh => {
            let notifications = page.notifications();
            tokio::spawn(async move {
                if let Err(e) = notifications.refresh().await {
                    warn!(error = %e, "Unread count refresh failed");
                }
            });
        }
        Command::Sidebar => page.sidebar_mut().toggle_collapsed(),
        Command::Menu => page.sidebar_mut().toggle_mobile(),
        Command::Click(selector) => {
            let node = dom
                .inner()
                .find(&selector)
                .ok_or_else(|| anyhow!("nothing matches {}", selector))?;
            page.click(node);
        }
        Command::Scroll(selector) => {
            let entries: Vec<Intersection> = dom
                .query_all(&selector)
                .into_iter()
                .map(|node| Intersection { node, ratio: 1.0 })
                .collect();
            let revealed = page.reveal().on_intersections(&entries);
            info!(%selector, revealed = revealed.len(), "Scrolled into view");
        }
        Command::Help => println!("{}", USAGE),
        Command::Quit => {}
    }
    Ok(())
}
