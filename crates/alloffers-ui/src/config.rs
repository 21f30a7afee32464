use std::str::FromStr;
use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};

/// Queries shorter than this never reach the server.
pub const MIN_QUERY_LEN: usize = 2;

/// Badge counts above this render as `"99+"`.
pub const BADGE_CAP: u64 = 99;

/// Offset of the server's `America/Panama` zone, which has no DST.
pub const SERVER_UTC_OFFSET_SECS: i32 = -5 * 3600;

/// Fixed delays driving every timer on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// Quiet period before a search request is issued.
    pub debounce: Duration,
    /// Unread-count refresh interval while healthy.
    pub poll_interval: Duration,
    /// Upper bound of the poll backoff delay.
    pub poll_backoff_cap: Duration,
    /// Expiry countdown refresh interval.
    pub countdown_interval: Duration,
    /// Time a flash message stays before fading.
    pub flash_delay: Duration,
    /// Fade duration before the flash message is removed.
    pub flash_fade: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            poll_interval: Duration::from_secs(30),
            poll_backoff_cap: Duration::from_secs(300),
            countdown_interval: Duration::from_secs(60),
            flash_delay: Duration::from_secs(5),
            flash_fade: Duration::from_millis(150),
        }
    }
}

/// Display language of generated labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    Es,
    En,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown locale '{0}' (expected es or en)")]
pub struct LocaleParseError(pub String);

impl FromStr for Locale {
    type Err = LocaleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "es" => Ok(Self::Es),
            "en" => Ok(Self::En),
            other => Err(LocaleParseError(other.to_string())),
        }
    }
}

/// Fixed UI strings.
#[derive(Debug)]
pub struct Strings {
    pub expired: &'static str,
    pub following: &'static str,
    pub follow: &'static str,
    pub no_results: &'static str,
    pub confirm_delete: &'static str,
    pub action_failed: &'static str,
}

static ES: Strings = Strings {
    expired: "Expirada",
    following: "Siguiendo",
    follow: "Seguir",
    no_results: "No se encontraron resultados",
    confirm_delete: "¿Estás seguro de que quieres eliminar esto?",
    action_failed: "No se pudo completar la acción. Inténtalo de nuevo.",
};

static EN: Strings = Strings {
    expired: "Expired",
    following: "Following",
    follow: "Follow",
    no_results: "No results found",
    confirm_delete: "Are you sure you want to delete this?",
    action_failed: "The action could not be completed. Please try again.",
};

impl Locale {
    pub fn strings(self) -> &'static Strings {
        match self {
            Self::Es => &ES,
            Self::En => &EN,
        }
    }
}

/// Per-page settings shared by all components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageConfig {
    /// Path of the page being driven, used as the login `next` target.
    pub path: String,
    pub locale: Locale,
    /// Zone of timestamps the server renders without an offset.
    pub server_offset: FixedOffset,
    pub timings: Timings,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            path: "/".into(),
            locale: Locale::default(),
            server_offset: FixedOffset::east_opt(SERVER_UTC_OFFSET_SECS).unwrap_or_else(|| Utc.fix()),
            timings: Timings::default(),
        }
    }
}

impl PageConfig {
    /// Where to send the user when the session is no longer valid.
    pub fn login_url(&self) -> String {
        format!("/login/?next={}", utf8_percent_encode(&self.path, NON_ALPHANUMERIC))
    }
}
