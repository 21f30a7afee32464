use std::time::Duration;

use reqwest::{Client, Method, Response, header, redirect};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use alloffers_types::api::{
    FollowResponse, LikeResponse, SearchResponse, SearchResult, UnreadCount, Vote, VoteResponse,
};
use alloffers_types::dom::VoteScope;

use crate::error::ApiError;
use crate::session::{CSRF_HEADER, Session};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Client for the directory's JSON API.
///
/// Paths are resolved against the site origin the same way the pages'
/// scripts resolve them. Redirects are never followed so that the server's
/// login redirect surfaces as [`ApiError::Unauthorized`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
    session: Session,
}

impl ApiClient {
    pub fn new(base_url: &str, session: Session) -> Result<Self, ApiError> {
        let base = Url::parse(base_url)?;
        let http = Client::builder()
            .redirect(redirect::Policy::none())
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        if session.csrf_token().is_none() {
            warn!("No CSRF token in session cookies; mutating calls will be rejected");
        }

        Ok(Self { http, base, session })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    // ── Toggles ─────────────────────────────────────────────────────────

    /// POST /api/offers/{id}/like/
    pub async fn toggle_like(&self, offer_id: u64) -> Result<LikeResponse, ApiError> {
        self.post_json(&format!("/api/offers/{}/like/", offer_id)).await
    }

    /// POST /api/business/{id}/follow/
    pub async fn toggle_follow_business(&self, business_id: u64) -> Result<FollowResponse, ApiError> {
        self.post_json(&format!("/api/business/{}/follow/", business_id)).await
    }

    /// POST /api/category/{id}/follow/
    pub async fn toggle_follow_category(&self, category_id: u64) -> Result<FollowResponse, ApiError> {
        self.post_json(&format!("/api/category/{}/follow/", category_id)).await
    }

    /// POST /api/reviews/{id}/like/ and siblings.
    pub async fn toggle_vote(&self, scope: VoteScope, id: u64, vote: Vote) -> Result<VoteResponse, ApiError> {
        let collection = match scope {
            VoteScope::Review => "reviews",
            VoteScope::Reply => "replies",
        };
        self.post_json(&format!("/api/{}/{}/{}/", collection, id, vote.path_segment())).await
    }

    // ── Notifications ───────────────────────────────────────────────────

    /// GET /api/notifications/unread-count/
    pub async fn unread_count(&self) -> Result<u64, ApiError> {
        let url = self.endpoint("/api/notifications/unread-count/")?;
        let resp = self.request(Method::GET, url).send().await?;
        let body: UnreadCount = decode(resp).await?;
        Ok(body.count)
    }

    /// POST /api/notifications/{id}/read/; the response body is ignored.
    pub async fn mark_notification_read(&self, notification_id: u64) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("/api/notifications/{}/read/", notification_id))?;
        let resp = self.mutating(url).send().await?;
        check_status(&resp)?;
        Ok(())
    }

    // ── Search ──────────────────────────────────────────────────────────

    /// GET /api/search/?q=
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>, ApiError> {
        let mut url = self.endpoint("/api/search/")?;
        url.query_pairs_mut().append_pair("q", query);
        let resp = self.request(Method::GET, url).send().await?;
        let body: SearchResponse = decode(resp).await?;
        Ok(body.results)
    }

    // ── Plumbing ────────────────────────────────────────────────────────

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base.join(path)?)
    }

    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        debug!(%method, %url, "api request");
        let builder = self.http.request(method, url);
        match self.session.cookie_header() {
            Some(cookies) => builder.header(header::COOKIE, cookies),
            None => builder,
        }
    }

    /// POST carrying the CSRF header. The action is fully encoded in the
    /// URL, so no body is sent.
    fn mutating(&self, url: Url) -> reqwest::RequestBuilder {
        let builder = self
            .request(Method::POST, url)
            .header(header::CONTENT_TYPE, "application/json");
        match self.session.csrf_token() {
            Some(token) => builder.header(CSRF_HEADER, token),
            None => builder,
        }
    }

    async fn post_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        let resp = self.mutating(url).send().await?;
        decode(resp).await
    }
}

fn check_status(resp: &Response) -> Result<(), ApiError> {
    match ApiError::from_status(resp.status()) {
        Some(err) => {
            warn!(status = %resp.status(), url = %resp.url(), "api call rejected");
            Err(err)
        }
        None => Ok(()),
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    check_status(&resp)?;
    let body = resp.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}
