use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use alloffers_client::ApiError;
use alloffers_types::dom;
use alloffers_types::patch::{Display, Patch};

use crate::backend::NotificationBackend;
use crate::config::{BADGE_CAP, PageConfig, Timings};
use crate::dom::Dom;
use crate::fence::SequenceFence;

/// Badge label for an unread count.
pub fn badge_text(count: u64) -> String {
    if count > BADGE_CAP {
        format!("{}+", BADGE_CAP)
    } else {
        count.to_string()
    }
}

/// Zero hides the badge entirely.
pub fn badge_patches(count: u64) -> Vec<Patch> {
    let badge = dom::notification_badge();
    if count > 0 {
        vec![
            Patch::text(badge.clone(), badge_text(count)),
            Patch::display(badge, Display::Flex),
        ]
    } else {
        vec![Patch::display(badge, Display::None)]
    }
}

/// Unread-count badge and read receipts. Every refresh is fenced, so a
/// slow poll can never overwrite the count fetched after a mark-as-read.
pub struct NotificationCenter<B> {
    backend: Arc<B>,
    dom: Arc<dyn Dom>,
    fence: SequenceFence,
    config: PageConfig,
}

impl<B: NotificationBackend> NotificationCenter<B> {
    pub fn new(backend: Arc<B>, dom: Arc<dyn Dom>, config: PageConfig) -> Self {
        Self { backend, dom, fence: SequenceFence::new(), config }
    }

    /// Whether the page has a badge to keep updated.
    pub fn has_badge(&self) -> bool {
        self.dom.exists(&dom::notification_badge())
    }

    /// Fetch the unread count and update the badge.
    pub async fn refresh(&self) -> Result<u64, ApiError> {
        let seq = self.fence.issue();
        match self.backend.unread_count().await {
            Ok(count) => {
                if self.fence.run_if_current(seq, || self.dom.apply_all(badge_patches(count))).is_none() {
                    debug!(seq, count, "Stale unread count dropped");
                }
                Ok(count)
            }
            Err(e) => {
                if e.is_unauthorized() {
                    self.dom.apply(Patch::navigate(self.config.login_url()));
                }
                Err(e)
            }
        }
    }

    /// Mark one notification read, then re-fetch the count from the server.
    /// The badge is never decremented locally.
    pub async fn mark_read(&self, notification_id: u64) -> Result<u64, ApiError> {
        if let Err(e) = self.backend.mark_read(notification_id).await {
            warn!(notification_id, error = %e, "Mark as read failed");
            if e.is_unauthorized() {
                self.dom.apply(Patch::navigate(self.config.login_url()));
            }
            return Err(e);
        }
        self.refresh().await
    }
}

/// Poll loop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Polling,
    BackingOff { failures: u32 },
    Stopped,
}

impl PollState {
    pub fn on_success(self) -> Self {
        match self {
            Self::Stopped => Self::Stopped,
            _ => Self::Polling,
        }
    }

    /// Auth failures stop the loop; anything else backs off.
    pub fn on_failure(self, error: &ApiError) -> Self {
        match self {
            Self::Stopped => Self::Stopped,
            _ if error.is_unauthorized() => Self::Stopped,
            Self::Polling => Self::BackingOff { failures: 1 },
            Self::BackingOff { failures } => Self::BackingOff { failures: failures.saturating_add(1) },
        }
    }

    /// Delay before the next poll; `None` once stopped.
    ///
    /// Backing off after `n` consecutive failures waits `interval * 2^n`,
    /// capped.
    pub fn next_delay(self, interval: Duration, cap: Duration) -> Option<Duration> {
        match self {
            Self::Polling => Some(interval),
            Self::BackingOff { failures } => {
                let factor = 1u32.checked_shl(failures).unwrap_or(u32::MAX);
                Some(interval.saturating_mul(factor).min(cap))
            }
            Self::Stopped => None,
        }
    }
}

/// Refresh eagerly, then keep polling until cancelled or stopped.
/// Returns the final state.
pub async fn run_poller<B: NotificationBackend>(
    center: Arc<NotificationCenter<B>>,
    timings: Timings,
    cancel: CancellationToken,
) -> PollState {
    let mut state = PollState::Polling;

    loop {
        state = match center.refresh().await {
            Ok(count) => {
                debug!(count, "Unread count refreshed");
                state.on_success()
            }
            Err(e) => {
                let next = state.on_failure(&e);
                warn!(error = %e, state = ?next, "Unread count poll failed");
                next
            }
        };

        let Some(delay) = state.next_delay(timings.poll_interval, timings.poll_backoff_cap) else {
            info!("Notification polling stopped");
            return state;
        };

        tokio::select! {
            _ = cancel.cancelled() => {
                info!("Notification polling cancelled");
                return PollState::Stopped;
            }
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use alloffers_client::StatusCode;
    use tokio::time::Instant;

    use super::*;
    use crate::dom::{Element, MemoryDom};

    #[derive(Default)]
    struct Scripted {
        counts: Mutex<VecDeque<Result<u64, ApiError>>>,
        polled_at: Mutex<Vec<Instant>>,
        read: Mutex<Vec<u64>>,
    }

    impl Scripted {
        fn push(&self, reply: Result<u64, ApiError>) {
            self.counts.lock().unwrap().push_back(reply);
        }
    }

    impl NotificationBackend for Scripted {
        async fn unread_count(&self) -> Result<u64, ApiError> {
            self.polled_at.lock().unwrap().push(Instant::now());
            self.counts
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(ApiError::Status(StatusCode::SERVICE_UNAVAILABLE)))
        }

        async fn mark_read(&self, notification_id: u64) -> Result<(), ApiError> {
            self.read.lock().unwrap().push(notification_id);
            Ok(())
        }
    }

    fn page() -> Arc<MemoryDom> {
        let dom = MemoryDom::new();
        dom.insert(Element::new("span").with_class("notification-badge"));
        Arc::new(dom)
    }

    fn center(backend: &Arc<Scripted>, dom: &Arc<MemoryDom>) -> Arc<NotificationCenter<Scripted>> {
        Arc::new(NotificationCenter::new(backend.clone(), dom.clone(), PageConfig::default()))
    }

    fn failure() -> Result<u64, ApiError> {
        Err(ApiError::Status(StatusCode::BAD_GATEWAY))
    }

    #[tokio::test]
    async fn badge_caps_and_hides() {
        let backend = Arc::new(Scripted::default());
        let dom = page();
        let center = center(&backend, &dom);

        for (count, text, display) in [(150, "99+", Display::Flex), (5, "5", Display::Flex)] {
            backend.push(Ok(count));
            center.refresh().await.unwrap();
            let badge = dom.element(&dom::notification_badge()).unwrap();
            assert_eq!(badge.text(), text);
            assert_eq!(badge.display(), Some(display));
        }

        backend.push(Ok(0));
        center.refresh().await.unwrap();
        assert!(!dom.element(&dom::notification_badge()).unwrap().is_displayed());
    }

    #[tokio::test]
    async fn mark_read_refetches_instead_of_decrementing() {
        let backend = Arc::new(Scripted::default());
        let dom = page();
        let center = center(&backend, &dom);
        backend.push(Ok(4));
        center.refresh().await.unwrap();

        // Server says 4 remain even after reading one (another arrived).
        backend.push(Ok(4));
        assert_eq!(center.mark_read(11).await.unwrap(), 4);

        assert_eq!(*backend.read.lock().unwrap(), vec![11]);
        assert_eq!(dom.element(&dom::notification_badge()).unwrap().text(), "4");
    }

    #[test]
    fn backoff_doubles_to_cap_and_resets() {
        let interval = Duration::from_secs(30);
        let cap = Duration::from_secs(300);
        let err = ApiError::Status(StatusCode::INTERNAL_SERVER_ERROR);

        let mut state = PollState::Polling;
        let mut delays = Vec::new();
        for _ in 0..5 {
            state = state.on_failure(&err);
            delays.push(state.next_delay(interval, cap).unwrap().as_secs());
        }
        assert_eq!(delays, vec![60, 120, 240, 300, 300]);

        state = state.on_success();
        assert_eq!(state, PollState::Polling);
        assert_eq!(state.next_delay(interval, cap), Some(interval));
    }

    #[test]
    fn backoff_never_overflows() {
        let state = PollState::BackingOff { failures: u32::MAX };
        let delay = state.next_delay(Duration::from_secs(30), Duration::from_secs(300));
        assert_eq!(delay, Some(Duration::from_secs(300)));
    }

    #[test]
    fn auth_failure_stops_for_good() {
        let state = PollState::BackingOff { failures: 2 }.on_failure(&ApiError::Unauthorized(StatusCode::FORBIDDEN));
        assert_eq!(state, PollState::Stopped);
        assert_eq!(state.on_success(), PollState::Stopped);
        assert_eq!(state.next_delay(Duration::from_secs(1), Duration::from_secs(2)), None);
    }

    #[tokio::test(start_paused = true)]
    async fn poller_backs_off_then_recovers() {
        let backend = Arc::new(Scripted::default());
        let dom = page();
        backend.push(Ok(1));
        backend.push(failure());
        backend.push(failure());
        backend.push(Ok(2));
        backend.push(Ok(3));

        let cancel = CancellationToken::new();
        let start = Instant::now();
        let task = tokio::spawn(run_poller(center(&backend, &dom), Timings::default(), cancel.clone()));

        // 0s ok, 30s fail, +60s fail, +120s ok, +30s ok
        tokio::time::sleep(Duration::from_secs(241)).await;
        cancel.cancel();
        assert_eq!(task.await.unwrap(), PollState::Stopped);

        let offsets: Vec<u64> = backend
            .polled_at
            .lock()
            .unwrap()
            .iter()
            .map(|t| (*t - start).as_secs())
            .collect();
        assert_eq!(offsets, vec![0, 30, 90, 210, 240]);
        assert_eq!(dom.element(&dom::notification_badge()).unwrap().text(), "3");
    }

    #[tokio::test(start_paused = true)]
    async fn poller_stops_and_redirects_on_expired_session() {
        let backend = Arc::new(Scripted::default());
        let dom = page();
        backend.push(Ok(2));
        backend.push(Err(ApiError::Unauthorized(StatusCode::FOUND)));

        let state = run_poller(center(&backend, &dom), Timings::default(), CancellationToken::new()).await;

        assert_eq!(state, PollState::Stopped);
        assert_eq!(backend.polled_at.lock().unwrap().len(), 2);
        assert_eq!(dom.location().as_deref(), Some("/login/?next=%2F"));
    }
}
