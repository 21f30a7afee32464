use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use alloffers_types::dom::{self, NodeId};

use crate::backend::Backend;
use crate::config::PageConfig;
use crate::confirm::{self, Confirm};
use crate::cosmetic::{self, RevealOptions, RevealWatcher};
use crate::countdown;
use crate::dom::Dom;
use crate::flash;
use crate::notifications::{self, NotificationCenter, PollState};
use crate::prefs::PreferenceStore;
use crate::search::LiveSearch;
use crate::sidebar::Sidebar;
use crate::toggles::Toggles;

/// Every component of one loaded page, wired to a shared document and
/// backend. Background loops run until [`shutdown`](Self::shutdown).
pub struct Page<B> {
    config: PageConfig,
    toggles: Arc<Toggles<B>>,
    notifications: Arc<NotificationCenter<B>>,
    search: LiveSearch<B>,
    sidebar: Sidebar,
    reveal: RevealWatcher,
    cancel: CancellationToken,
    poller: Option<JoinHandle<PollState>>,
    countdowns: Option<JoinHandle<()>>,
    flash: JoinHandle<()>,
}

impl<B: Backend> Page<B> {
    /// Page-load sequence. Must run inside a tokio runtime.
    ///
    /// Polling starts only when the page has a notification badge, and
    /// countdowns only when it has expiry elements.
    pub fn load(
        dom: Arc<dyn Dom>,
        backend: Arc<B>,
        store: Arc<dyn PreferenceStore>,
        config: PageConfig,
    ) -> Self {
        let cancel = CancellationToken::new();

        let sidebar = Sidebar::init(dom.clone(), store);
        let search = LiveSearch::new(backend.clone(), dom.clone(), config.clone());
        cosmetic::init_widgets(dom.as_ref());
        let reveal = RevealWatcher::new(dom.clone(), RevealOptions::default());
        let observed = reveal.observe_all();

        let flash = tokio::spawn(flash::dismiss_flash_messages(dom.clone(), config.timings));

        let notifications = Arc::new(NotificationCenter::new(backend.clone(), dom.clone(), config.clone()));
        let poller = notifications.has_badge().then(|| {
            tokio::spawn(notifications::run_poller(
                notifications.clone(),
                config.timings,
                cancel.child_token(),
            ))
        });

        let countdowns = dom.exists(&dom::expiring()).then(|| {
            tokio::spawn(countdown::run_countdowns(
                dom.clone(),
                config.locale,
                config.server_offset,
                config.timings.countdown_interval,
                cancel.child_token(),
            ))
        });

        let toggles = Arc::new(Toggles::new(backend, dom, config.clone()));

        info!(
            path = %config.path,
            polling = poller.is_some(),
            countdowns = countdowns.is_some(),
            observed,
            "Page loaded"
        );

        Self {
            config,
            toggles,
            notifications,
            search,
            sidebar,
            reveal,
            cancel,
            poller,
            countdowns,
            flash,
        }
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    /// Shared handle so toggles can run concurrently with other input.
    pub fn toggles(&self) -> Arc<Toggles<B>> {
        self.toggles.clone()
    }

    pub fn notifications(&self) -> Arc<NotificationCenter<B>> {
        self.notifications.clone()
    }

    pub fn sidebar(&self) -> &Sidebar {
        &self.sidebar
    }

    pub fn sidebar_mut(&mut self) -> &mut Sidebar {
        &mut self.sidebar
    }

    pub fn reveal(&self) -> &RevealWatcher {
        &self.reveal
    }

    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(|task| !task.is_finished())
    }

    pub fn has_countdowns(&self) -> bool {
        self.countdowns.is_some()
    }

    /// Input event on the search box.
    pub fn search_input(&mut self, raw: &str) {
        self.search.on_input(raw);
    }

    /// Document-level click.
    pub fn click(&mut self, target: NodeId) {
        if self.sidebar.handle_click(target) {
            debug!(%target, "Sidebar control clicked");
        }
        self.search.on_click(target);
    }

    pub fn confirm_delete(&self, host: &impl Confirm, message: Option<&str>) -> bool {
        confirm::confirm_delete(host, message, self.config.locale)
    }

    /// Stop background loops and wait for them to finish.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        self.flash.abort();

        if let Some(poller) = self.poller {
            match poller.await {
                Ok(state) => debug!(?state, "Poller finished"),
                Err(e) => warn!(error = %e, "Poller task failed"),
            }
        }
        if let Some(countdowns) = self.countdowns {
            if let Err(e) = countdowns.await {
                warn!(error = %e, "Countdown task failed");
            }
        }
        info!(path = %self.config.path, "Page unloaded");
    }
}
