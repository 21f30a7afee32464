use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeDelta, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use alloffers_types::dom::{self, EXPIRES_AT_ATTR, Selector, class};
use alloffers_types::patch::Patch;

use crate::config::Locale;
use crate::dom::Dom;

/// Naive layouts accepted after RFC 3339, read in the server's zone.
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Time left before an offer expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remaining {
    Expired,
    Days { days: i64, hours: i64 },
    Hours { hours: i64, minutes: i64 },
}

impl Remaining {
    pub fn render(self, locale: Locale) -> String {
        match self {
            Self::Expired => locale.strings().expired.to_string(),
            Self::Days { days, hours } => format!("{}d {}h", days, hours),
            Self::Hours { hours, minutes } => format!("{}h {}m", hours, minutes),
        }
    }

    /// Under a day left.
    pub fn is_warning(self) -> bool {
        matches!(self, Self::Hours { .. })
    }
}

pub fn remaining(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Remaining {
    let diff = expires_at - now;
    if diff <= TimeDelta::zero() {
        return Remaining::Expired;
    }

    let days = diff.num_days();
    let hours = diff.num_hours() % 24;
    if days >= 1 {
        Remaining::Days { days, hours }
    } else {
        Remaining::Hours { hours, minutes: diff.num_minutes() % 60 }
    }
}

/// Timestamps without an offset are wall-clock times at `server_offset`.
pub fn parse_expiry(raw: &str, server_offset: FixedOffset) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .and_then(|ndt| ndt.and_local_timezone(server_offset).single())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Text and classes for one element. Classes are only ever added.
pub fn countdown_patches(target: Selector, remaining: Remaining, locale: Locale) -> Vec<Patch> {
    let mut patches = vec![Patch::text(target.clone(), remaining.render(locale))];
    match remaining {
        Remaining::Expired => patches.push(Patch::add_class(target, class::TEXT_DANGER)),
        r if r.is_warning() => patches.push(Patch::add_class(target, class::TEXT_WARNING)),
        _ => {}
    }
    patches
}

/// Re-render every expiry element against `now`. Returns how many were
/// updated; elements with an unreadable timestamp are skipped.
pub fn refresh_countdowns(
    dom: &dyn Dom,
    now: DateTime<Utc>,
    locale: Locale,
    server_offset: FixedOffset,
) -> usize {
    let mut updated = 0;
    for node in dom.query_all(&dom::expiring()) {
        let Some(raw) = dom.attribute(node, EXPIRES_AT_ATTR) else {
            continue;
        };
        let Some(expires_at) = parse_expiry(&raw, server_offset) else {
            warn!(%node, value = %raw, "Unparseable expiry timestamp");
            continue;
        };
        dom.apply_all(countdown_patches(Selector::Node(node), remaining(expires_at, now), locale));
        updated += 1;
    }
    updated
}

/// Render now, then on every tick until cancelled.
pub async fn run_countdowns(
    dom: Arc<dyn Dom>,
    locale: Locale,
    server_offset: FixedOffset,
    every: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(every);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("Countdown refresh stopped");
                return;
            }
            _ = interval.tick() => {
                let updated = refresh_countdowns(dom.as_ref(), Utc::now(), locale, server_offset);
                debug!(updated, "Countdowns refreshed");
            }
        }
    }
}
