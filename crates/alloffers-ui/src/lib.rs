//! Headless page components.
//!
//! Each component reads the document through [`dom::Dom`], talks to the
//! server through the [`backend`] traits and answers with
//! [`Patch`](alloffers_types::patch::Patch) commands. Timers and polling
//! run as tokio tasks; [`page::Page`] wires everything for one loaded page.

pub mod backend;
pub mod config;
pub mod confirm;
pub mod cosmetic;
pub mod countdown;
pub mod dom;
pub mod fence;
pub mod flash;
pub mod markup;
pub mod notifications;
pub mod page;
pub mod prefs;
pub mod search;
pub mod sidebar;
pub mod toggles;

pub use backend::Backend;
pub use config::{Locale, LocaleParseError, PageConfig, Timings};
pub use page::Page;
