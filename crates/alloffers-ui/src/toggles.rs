use std::future::Future;
use std::sync::Arc;

use tracing::{debug, error};

use alloffers_client::ApiError;
use alloffers_types::api::{FollowResponse, LikeResponse, Vote, VoteResponse};
use alloffers_types::dom::{self, VoteScope, class};
use alloffers_types::patch::{NoticeLevel, Patch};

use crate::backend::ToggleBackend;
use crate::config::{Locale, PageConfig};
use crate::dom::Dom;
use crate::fence::FenceMap;
use crate::markup;

/// Entity a toggle request is about. Each one is its own fenced stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Offer(u64),
    Business(u64),
    Category(u64),
    Vote(VoteScope, u64),
}

/// What happened to a toggle request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Response rendered.
    Applied,
    /// A newer request for the same entity was issued; response dropped.
    Superseded,
    /// Request failed; DOM untouched, user notified.
    Failed,
}

pub fn like_patches(offer_id: u64, resp: &LikeResponse) -> Vec<Patch> {
    let button = dom::like_button(offer_id);
    vec![
        Patch::class(button.clone(), class::LIKED, resp.liked),
        Patch::html(button, markup::like_button(resp.liked)),
        Patch::text(dom::like_count(offer_id), resp.likes_count.to_string()),
    ]
}

pub fn follow_business_patches(business_id: u64, resp: &FollowResponse, locale: Locale) -> Vec<Patch> {
    let button = dom::follow_business_button(business_id);
    let mut patches = vec![
        Patch::html(button.clone(), markup::follow_button(resp.following, locale)),
        Patch::class(button.clone(), class::BTN_PRIMARY, !resp.following),
        Patch::class(button, class::BTN_SECONDARY, resp.following),
    ];
    if let Some(count) = resp.followers_count {
        patches.push(Patch::text(dom::followers_count(business_id), count.to_string()));
    }
    patches
}

pub fn follow_category_patches(category_id: u64, resp: &FollowResponse, locale: Locale) -> Vec<Patch> {
    let button = dom::follow_category_button(category_id);
    vec![
        Patch::html(button.clone(), markup::follow_button(resp.following, locale)),
        Patch::class(button.clone(), class::BTN_OUTLINE_PRIMARY, !resp.following),
        Patch::class(button, class::BTN_PRIMARY, resp.following),
    ]
}

/// Counts always update. Liking clears the opposite vote server side, so an
/// active vote also deactivates the other button.
pub fn vote_patches(scope: VoteScope, id: u64, vote: Vote, resp: &VoteResponse) -> Vec<Patch> {
    let other = match vote {
        Vote::Like => Vote::Dislike,
        Vote::Dislike => Vote::Like,
    };
    let mut patches = vec![
        Patch::text(dom::vote_count(scope, Vote::Like, id), resp.likes_count.to_string()),
        Patch::text(dom::vote_count(scope, Vote::Dislike, id), resp.dislikes_count.to_string()),
    ];
    if let Some(active) = resp.active(vote) {
        patches.push(Patch::class(dom::vote_button(scope, vote, id), class::ACTIVE, active));
        if active {
            patches.push(Patch::remove_class(dom::vote_button(scope, other, id), class::ACTIVE));
        }
    }
    patches
}

/// Like / follow / vote buttons.
///
/// No optimistic update: the DOM changes only once the server answered.
/// Double clicks are not locked out, but only the latest request per entity
/// renders.
pub struct Toggles<B> {
    backend: Arc<B>,
    dom: Arc<dyn Dom>,
    fences: FenceMap<Entity>,
    config: PageConfig,
}

impl<B: ToggleBackend> Toggles<B> {
    pub fn new(backend: Arc<B>, dom: Arc<dyn Dom>, config: PageConfig) -> Self {
        Self { backend, dom, fences: FenceMap::new(), config }
    }

    pub async fn toggle_like(&self, offer_id: u64) -> ToggleOutcome {
        self.run(Entity::Offer(offer_id), self.backend.toggle_like(offer_id), |resp| {
            like_patches(offer_id, &resp)
        })
        .await
    }

    pub async fn toggle_follow_business(&self, business_id: u64) -> ToggleOutcome {
        let locale = self.config.locale;
        self.run(
            Entity::Business(business_id),
            self.backend.toggle_follow_business(business_id),
            |resp| follow_business_patches(business_id, &resp, locale),
        )
        .await
    }

    pub async fn toggle_follow_category(&self, category_id: u64) -> ToggleOutcome {
        let locale = self.config.locale;
        self.run(
            Entity::Category(category_id),
            self.backend.toggle_follow_category(category_id),
            |resp| follow_category_patches(category_id, &resp, locale),
        )
        .await
    }

    pub async fn toggle_vote(&self, scope: VoteScope, id: u64, vote: Vote) -> ToggleOutcome {
        self.run(Entity::Vote(scope, id), self.backend.toggle_vote(scope, id, vote), |resp| {
            vote_patches(scope, id, vote, &resp)
        })
        .await
    }

    async fn run<T>(
        &self,
        entity: Entity,
        call: impl Future<Output = Result<T, ApiError>>,
        render: impl FnOnce(T) -> Vec<Patch>,
    ) -> ToggleOutcome {
        let seq = self.fences.issue(entity);
        match call.await {
            Ok(resp) => {
                let patches = render(resp);
                match self.fences.run_if_current(&entity, seq, || self.dom.apply_all(patches)) {
                    Some(()) => ToggleOutcome::Applied,
                    None => {
                        debug!(?entity, seq, "Superseded toggle response dropped");
                        ToggleOutcome::Superseded
                    }
                }
            }
            Err(e) => {
                let patch = if e.is_unauthorized() {
                    Patch::navigate(self.config.login_url())
                } else {
                    Patch::notify(NoticeLevel::Danger, self.config.locale.strings().action_failed)
                };
                match self.fences.run_if_current(&entity, seq, || self.dom.apply(patch)) {
                    Some(()) => {
                        error!(?entity, error = %e, "Toggle failed");
                        ToggleOutcome::Failed
                    }
                    None => {
                        debug!(?entity, seq, error = %e, "Superseded toggle failure dropped");
                        ToggleOutcome::Superseded
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use alloffers_client::StatusCode;
    use alloffers_types::dom::Selector;
    use tokio::sync::oneshot;

    use super::*;
    use crate::dom::{Element, MemoryDom};

    type Reply<T> = Result<T, ApiError>;

    /// Scripted backend: each call pops the next queued reply for its key.
    #[derive(Default)]
    struct Scripted {
        likes: Mutex<HashMap<u64, Vec<oneshot::Receiver<Reply<LikeResponse>>>>>,
        follows: Mutex<Vec<Reply<FollowResponse>>>,
        votes: Mutex<Vec<Reply<VoteResponse>>>,
    }

    impl Scripted {
        fn queue_like(&self, offer_id: u64) -> oneshot::Sender<Reply<LikeResponse>> {
            let (tx, rx) = oneshot::channel();
            self.likes.lock().unwrap().entry(offer_id).or_default().push(rx);
            tx
        }
    }

    fn unavailable() -> ApiError {
        ApiError::Status(StatusCode::SERVICE_UNAVAILABLE)
    }

    impl ToggleBackend for Scripted {
        async fn toggle_like(&self, offer_id: u64) -> Reply<LikeResponse> {
            let rx = self.likes.lock().unwrap().get_mut(&offer_id).map(|q| q.remove(0));
            match rx {
                Some(rx) => rx.await.unwrap_or_else(|_| Err(unavailable())),
                None => Err(unavailable()),
            }
        }

        async fn toggle_follow_business(&self, _business_id: u64) -> Reply<FollowResponse> {
            self.follows.lock().unwrap().remove(0)
        }

        async fn toggle_follow_category(&self, _category_id: u64) -> Reply<FollowResponse> {
            self.follows.lock().unwrap().remove(0)
        }

        async fn toggle_vote(&self, _scope: VoteScope, _id: u64, _vote: Vote) -> Reply<VoteResponse> {
            self.votes.lock().unwrap().remove(0)
        }
    }

    fn offer_page(offer_id: u64, liked: bool) -> Arc<MemoryDom> {
        let dom = MemoryDom::new();
        let mut button = Element::new("button").with_attr("data-offer-id", offer_id);
        if liked {
            button = button.with_class("liked");
        }
        dom.insert(button);
        dom.insert(Element::new("span").with_id(&format!("like-count-{}", offer_id)).with_text("7"));
        Arc::new(dom)
    }

    fn toggles(backend: &Arc<Scripted>, dom: &Arc<MemoryDom>) -> Toggles<Scripted> {
        Toggles::new(backend.clone(), dom.clone(), PageConfig::default())
    }

    #[tokio::test]
    async fn like_response_sets_state_regardless_of_prior_dom() {
        for prior in [false, true] {
            let backend = Arc::new(Scripted::default());
            let dom = offer_page(4, prior);
            let tx = backend.queue_like(4);
            tx.send(Ok(LikeResponse { liked: true, likes_count: 12 })).unwrap();

            let outcome = toggles(&backend, &dom).toggle_like(4).await;

            assert_eq!(outcome, ToggleOutcome::Applied);
            let button = dom.element(&dom::like_button(4)).unwrap();
            assert!(button.has_class("liked"));
            assert!(button.html().contains("fas fa-heart"));
            assert_eq!(dom.element(&dom::like_count(4)).unwrap().text(), "12");
        }
    }

    #[tokio::test]
    async fn unlike_restores_outline_heart() {
        let backend = Arc::new(Scripted::default());
        let dom = offer_page(4, true);
        backend.queue_like(4).send(Ok(LikeResponse { liked: false, likes_count: 6 })).unwrap();

        toggles(&backend, &dom).toggle_like(4).await;

        let button = dom.element(&dom::like_button(4)).unwrap();
        assert!(!button.has_class("liked"));
        assert!(button.html().contains("far fa-heart"));
    }

    #[tokio::test]
    async fn failure_leaves_dom_and_notifies() {
        let backend = Arc::new(Scripted::default());
        let dom = offer_page(4, false);
        backend.queue_like(4).send(Err(unavailable())).unwrap();

        let outcome = toggles(&backend, &dom).toggle_like(4).await;

        assert_eq!(outcome, ToggleOutcome::Failed);
        assert!(!dom.element(&dom::like_button(4)).unwrap().has_class("liked"));
        assert_eq!(dom.element(&dom::like_count(4)).unwrap().text(), "7");
        let notices = dom.notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].0, NoticeLevel::Danger);
    }

    #[tokio::test]
    async fn expired_session_navigates_to_login() {
        let backend = Arc::new(Scripted::default());
        let dom = offer_page(4, false);
        backend
            .queue_like(4)
            .send(Err(ApiError::Unauthorized(StatusCode::FOUND)))
            .unwrap();

        toggles(&backend, &dom).toggle_like(4).await;

        assert_eq!(dom.location().as_deref(), Some("/login/?next=%2F"));
        assert!(dom.notices().is_empty());
    }

    #[tokio::test]
    async fn double_click_renders_latest_response_only() {
        let backend = Arc::new(Scripted::default());
        let dom = offer_page(4, false);
        let first = backend.queue_like(4);
        let second = backend.queue_like(4);
        let toggles = Arc::new(toggles(&backend, &dom));

        let t1 = tokio::spawn({
            let toggles = toggles.clone();
            async move { toggles.toggle_like(4).await }
        });
        tokio::task::yield_now().await;
        let t2 = tokio::spawn({
            let toggles = toggles.clone();
            async move { toggles.toggle_like(4).await }
        });
        tokio::task::yield_now().await;

        // Second click resolves first, first click's stale answer arrives last.
        second.send(Ok(LikeResponse { liked: false, likes_count: 7 })).unwrap();
        assert_eq!(t2.await.unwrap(), ToggleOutcome::Applied);
        first.send(Ok(LikeResponse { liked: true, likes_count: 8 })).unwrap();
        assert_eq!(t1.await.unwrap(), ToggleOutcome::Superseded);

        assert!(!dom.element(&dom::like_button(4)).unwrap().has_class("liked"));
        assert_eq!(dom.element(&dom::like_count(4)).unwrap().text(), "7");
    }

    #[tokio::test]
    async fn stale_failure_after_newer_success_is_silent() {
        let backend = Arc::new(Scripted::default());
        let dom = offer_page(4, false);
        let first = backend.queue_like(4);
        let second = backend.queue_like(4);
        let toggles = Arc::new(toggles(&backend, &dom));

        let t1 = tokio::spawn({
            let toggles = toggles.clone();
            async move { toggles.toggle_like(4).await }
        });
        tokio::task::yield_now().await;
        let t2 = tokio::spawn({
            let toggles = toggles.clone();
            async move { toggles.toggle_like(4).await }
        });
        tokio::task::yield_now().await;

        second.send(Ok(LikeResponse { liked: true, likes_count: 8 })).unwrap();
        assert_eq!(t2.await.unwrap(), ToggleOutcome::Applied);
        first.send(Err(unavailable())).unwrap();
        assert_eq!(t1.await.unwrap(), ToggleOutcome::Superseded);

        assert!(dom.element(&dom::like_button(4)).unwrap().has_class("liked"));
        assert_eq!(dom.element(&dom::like_count(4)).unwrap().text(), "8");
        assert!(dom.notices().is_empty());
        assert!(dom.location().is_none());
    }

    #[tokio::test]
    async fn follow_business_swaps_button_style_and_count() {
        let backend = Arc::new(Scripted::default());
        let dom = Arc::new(MemoryDom::new());
        dom.insert(Element::new("button").with_id("follow-btn-9").with_class("btn-primary"));
        dom.insert(Element::new("span").with_id("followers-count-9").with_text("3"));
        backend.follows.lock().unwrap().push(Ok(FollowResponse { following: true, followers_count: Some(4) }));

        toggles(&backend, &dom).toggle_follow_business(9).await;

        let button = dom.element(&dom::follow_business_button(9)).unwrap();
        assert!(button.has_class("btn-secondary"));
        assert!(!button.has_class("btn-primary"));
        assert_eq!(button.text(), "Siguiendo");
        assert_eq!(dom.element(&dom::followers_count(9)).unwrap().text(), "4");
    }

    #[tokio::test]
    async fn unfollow_category_uses_outline_style() {
        let backend = Arc::new(Scripted::default());
        let dom = Arc::new(MemoryDom::new());
        dom.insert(Element::new("button").with_id("follow-cat-2").with_class("btn-primary"));
        backend.follows.lock().unwrap().push(Ok(FollowResponse { following: false, followers_count: Some(10) }));

        toggles(&backend, &dom).toggle_follow_category(2).await;

        let button = dom.element(&dom::follow_category_button(2)).unwrap();
        assert!(button.has_class("btn-outline-primary"));
        assert!(!button.has_class("btn-primary"));
        assert_eq!(button.text(), "Seguir");
    }

    #[tokio::test]
    async fn review_like_clears_dislike_button() {
        let backend = Arc::new(Scripted::default());
        let dom = Arc::new(MemoryDom::new());
        dom.insert(Element::new("button").with_id("review-like-5"));
        dom.insert(Element::new("button").with_id("review-dislike-5").with_class("active"));
        dom.insert(Element::new("span").with_id("review-likes-5"));
        dom.insert(Element::new("span").with_id("review-dislikes-5"));
        backend.votes.lock().unwrap().push(Ok(VoteResponse {
            liked: Some(true),
            disliked: None,
            likes_count: 3,
            dislikes_count: 0,
            net_likes: Some(3),
        }));

        toggles(&backend, &dom).toggle_vote(VoteScope::Review, 5, Vote::Like).await;

        assert!(dom.element(&Selector::id("review-like-5")).unwrap().has_class("active"));
        assert!(!dom.element(&Selector::id("review-dislike-5")).unwrap().has_class("active"));
        assert_eq!(dom.element(&Selector::id("review-likes-5")).unwrap().text(), "3");
        assert_eq!(dom.element(&Selector::id("review-dislikes-5")).unwrap().text(), "0");
    }
}
