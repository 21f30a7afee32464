//! Seams between components and the network. `ApiClient` implements every
//! trait; tests substitute scripted fakes.

use std::future::Future;

use alloffers_client::{ApiClient, ApiError};
use alloffers_types::api::{FollowResponse, LikeResponse, SearchResult, Vote, VoteResponse};
use alloffers_types::dom::VoteScope;

pub trait ToggleBackend: Send + Sync + 'static {
    fn toggle_like(&self, offer_id: u64) -> impl Future<Output = Result<LikeResponse, ApiError>> + Send;

    fn toggle_follow_business(
        &self,
        business_id: u64,
    ) -> impl Future<Output = Result<FollowResponse, ApiError>> + Send;

    fn toggle_follow_category(
        &self,
        category_id: u64,
    ) -> impl Future<Output = Result<FollowResponse, ApiError>> + Send;

    fn toggle_vote(
        &self,
        scope: VoteScope,
        id: u64,
        vote: Vote,
    ) -> impl Future<Output = Result<VoteResponse, ApiError>> + Send;
}

pub trait NotificationBackend: Send + Sync + 'static {
    fn unread_count(&self) -> impl Future<Output = Result<u64, ApiError>> + Send;

    fn mark_read(&self, notification_id: u64) -> impl Future<Output = Result<(), ApiError>> + Send;
}

pub trait SearchBackend: Send + Sync + 'static {
    fn search(&self, query: &str) -> impl Future<Output = Result<Vec<SearchResult>, ApiError>> + Send;
}

/// Everything a full page needs.
pub trait Backend: ToggleBackend + NotificationBackend + SearchBackend {}

impl<T: ToggleBackend + NotificationBackend + SearchBackend> Backend for T {}

impl ToggleBackend for ApiClient {
    fn toggle_like(&self, offer_id: u64) -> impl Future<Output = Result<LikeResponse, ApiError>> + Send {
        ApiClient::toggle_like(self, offer_id)
    }

    fn toggle_follow_business(
        &self,
        business_id: u64,
    ) -> impl Future<Output = Result<FollowResponse, ApiError>> + Send {
        ApiClient::toggle_follow_business(self, business_id)
    }

    fn toggle_follow_category(
        &self,
        category_id: u64,
    ) -> impl Future<Output = Result<FollowResponse, ApiError>> + Send {
        ApiClient::toggle_follow_category(self, category_id)
    }

    fn toggle_vote(
        &self,
        scope: VoteScope,
        id: u64,
        vote: Vote,
    ) -> impl Future<Output = Result<VoteResponse, ApiError>> + Send {
        ApiClient::toggle_vote(self, scope, id, vote)
    }
}

impl NotificationBackend for ApiClient {
    fn unread_count(&self) -> impl Future<Output = Result<u64, ApiError>> + Send {
        ApiClient::unread_count(self)
    }

    fn mark_read(&self, notification_id: u64) -> impl Future<Output = Result<(), ApiError>> + Send {
        ApiClient::mark_notification_read(self, notification_id)
    }
}

impl SearchBackend for ApiClient {
    fn search(&self, query: &str) -> impl Future<Output = Result<Vec<SearchResult>, ApiError>> + Send {
        ApiClient::search(self, query)
    }
}
