use serde::{Deserialize, Serialize};

// -- Toggles --

/// Response of `POST /api/offers/{id}/like/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeResponse {
    pub liked: bool,
    pub likes_count: u64,
}

/// Response of the business and category follow endpoints.
///
/// Category follows also report `followers_count`, but pages never show it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowResponse {
    pub following: bool,
    #[serde(default)]
    pub followers_count: Option<u64>,
}

/// Which side of a review or reply vote was toggled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vote {
    Like,
    Dislike,
}

impl Vote {
    /// Trailing path segment of the vote endpoint.
    pub fn path_segment(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Dislike => "dislike",
        }
    }
}

/// Response of the review/reply like and dislike endpoints.
///
/// Only the flag matching the toggled side is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteResponse {
    #[serde(default)]
    pub liked: Option<bool>,
    #[serde(default)]
    pub disliked: Option<bool>,
    pub likes_count: u64,
    pub dislikes_count: u64,
    /// Reviews only.
    #[serde(default)]
    pub net_likes: Option<i64>,
}

impl VoteResponse {
    /// New state of the toggled side, if the server reported it.
    pub fn active(&self, vote: Vote) -> Option<bool> {
        match vote {
            Vote::Like => self.liked,
            Vote::Dislike => self.disliked,
        }
    }
}

// -- Notifications --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadCount {
    pub count: u64,
}

// -- Search --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Offer,
    Business,
}

impl ResultKind {
    /// Font Awesome icon name shown next to the entry.
    pub fn icon(self) -> &'static str {
        match self {
            Self::Offer => "tag",
            Self::Business => "store",
        }
    }
}

/// One entry of the live-search dropdown, in server rank order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(rename = "type")]
    pub kind: ResultKind,
    #[serde(default)]
    pub id: Option<u64>,
    pub title: String,
    pub url: String,
    /// Offers: owning business name.
    #[serde(default)]
    pub business: Option<String>,
    /// Businesses: truncated description.
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
}
