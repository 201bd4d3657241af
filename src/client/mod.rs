pub mod oauth;
pub mod twitter;

pub use twitter::TwitterClient;

use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;

use crate::records::{TweetRecord, UserRecord};

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("missing credentials: {0} is not set (run `plumes config init` and fill it in)")]
    MissingCredentials(&'static str),

    #[error("failed to sign request: {0}")]
    Signing(String),

    #[error("rate limit still exceeded after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("Twitter API error {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The account operations the tool needs. Implementations own
/// authentication, pagination and rate-limit backoff.
///
/// The `fetch_*` streams are lazy and yield at most `limit` records; calling
/// the method again starts over from the first page.
#[async_trait]
pub trait AccountClient: Send + Sync {
    fn fetch_friends<'a>(&'a self, account: &'a str, limit: usize) -> BoxStream<'a, Result<UserRecord>>;

    fn fetch_followers<'a>(&'a self, account: &'a str, limit: usize) -> BoxStream<'a, Result<UserRecord>>;

    fn fetch_timeline<'a>(&'a self, account: &'a str, limit: usize) -> BoxStream<'a, Result<TweetRecord>>;

    async fn unfollow(&self, screen_name: &str) -> Result<()>;

    async fn follow(&self, screen_name: &str) -> Result<()>;

    async fn delete_tweet(&self, id: &str) -> Result<()>;

    async fn like_tweet(&self, id: &str) -> Result<()>;

    async fn get_current_account(&self) -> Result<UserRecord>;

    async fn get_account(&self, screen_name: &str) -> Result<UserRecord>;
}
