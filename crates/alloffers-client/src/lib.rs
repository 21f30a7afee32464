/// HTTP client for the AllOffers directory API.
///
/// Covers the JSON endpoints the interactive pages call: like and follow
/// toggles, review/reply votes, notification count and read receipts, and
/// live search. Mutating calls carry the session's CSRF token.

pub mod client;
pub mod error;
pub mod session;

pub use client::ApiClient;
pub use error::ApiError;
pub use session::Session;

pub use reqwest::StatusCode;
