use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};
use urlencoding::encode;

use super::{oauth, AccountClient, ClientError, Result};
use crate::config::{Credentials, Settings};
use crate::records::{TweetRecord, UserRecord};

/// Largest page the v1.1 list and timeline endpoints hand out.
const PAGE_SIZE: usize = 200;

/// Twitter REST v1.1 client signing every request with the configured
/// OAuth 1.0a user credentials.
pub struct TwitterClient {
    credentials: Credentials,
    api_base: String,
    sleep_time: Duration,
    max_retries: u32,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct CursorPage {
    users: Vec<UserRecord>,
    next_cursor: i64,
}

impl TwitterClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let credentials = settings.credentials();
        credentials.check()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("plumes/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            credentials,
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            sleep_time: Duration::from_secs(settings.sleep_time),
            max_retries: settings.max_retries,
            client,
        })
    }

    /// Issue one signed request and decode the JSON reply. A 429 sleeps for
    /// the configured interval and retries the same request.
    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        params: &[(String, String)],
    ) -> Result<T> {
        let url = format!("{}/{}", self.api_base, endpoint);
        let query = params
            .iter()
            .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let full_url = if query.is_empty() {
            url.clone()
        } else {
            format!("{}?{}", url, query)
        };

        let mut retries = 0;
        loop {
            let auth =
                oauth::authorization_header(method.as_str(), &url, params, &self.credentials)?;
            debug!("{} {}", method, full_url);
            let response = self
                .client
                .request(method.clone(), &full_url)
                .header(AUTHORIZATION, auth)
                .send()
                .await?;

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                if retries >= self.max_retries {
                    return Err(ClientError::RateLimited { retries });
                }
                retries += 1;
                warn!(
                    "Rate limit exceeded; sleeping for {}s (retry {}/{})",
                    self.sleep_time.as_secs(),
                    retries,
                    self.max_retries
                );
                tokio::time::sleep(self.sleep_time).await;
                continue;
            }

            let body = response.text().await?;
            if !status.is_success() {
                return Err(ClientError::Api { status, body });
            }
            return Ok(serde_json::from_str(&body)?);
        }
    }

    /// Walk a cursored user list (`friends/list`, `followers/list`).
    fn cursored_users<'a>(
        &'a self,
        endpoint: &'static str,
        screen_name: &'a str,
        limit: usize,
    ) -> BoxStream<'a, Result<UserRecord>> {
        let count = PAGE_SIZE.min(limit.max(1));
        let pages = stream::try_unfold(Some(-1i64), move |cursor| async move {
            let Some(cursor) = cursor else {
                return Ok::<_, ClientError>(None);
            };
            let params = vec![
                ("screen_name".to_string(), screen_name.to_string()),
                ("count".to_string(), count.to_string()),
                ("cursor".to_string(), cursor.to_string()),
            ];
            let page: CursorPage = self.call(Method::GET, endpoint, &params).await?;
            debug!("{} returned {} users", endpoint, page.users.len());

            let next = (page.next_cursor != 0 && !page.users.is_empty()).then_some(page.next_cursor);
            Ok(Some((page.users, next)))
        });

        pages
            .map_ok(|users| stream::iter(users.into_iter().map(Ok)))
            .try_flatten()
            .take(limit)
            .boxed()
    }

    async fn post_unit(&self, endpoint: &str, params: Vec<(String, String)>) -> Result<()> {
        let _: serde_json::Value = self.call(Method::POST, endpoint, &params).await?;
        Ok(())
    }
}

#[async_trait]
impl AccountClient for TwitterClient {
    fn fetch_friends<'a>(&'a self, account: &'a str, limit: usize) -> BoxStream<'a, Result<UserRecord>> {
        self.cursored_users("friends/list.json", account, limit)
    }

    fn fetch_followers<'a>(&'a self, account: &'a str, limit: usize) -> BoxStream<'a, Result<UserRecord>> {
        self.cursored_users("followers/list.json", account, limit)
    }

    fn fetch_timeline<'a>(&'a self, account: &'a str, limit: usize) -> BoxStream<'a, Result<TweetRecord>> {
        let count = PAGE_SIZE.min(limit.max(1));
        // Outer `None` ends the walk; inner value is the next `max_id`.
        let pages = stream::try_unfold(Some(None::<u64>), move |state| async move {
            let Some(max_id) = state else {
                return Ok::<_, ClientError>(None);
            };
            let mut params = vec![
                ("screen_name".to_string(), account.to_string()),
                ("count".to_string(), count.to_string()),
                ("include_rts".to_string(), "true".to_string()),
            ];
            if let Some(max_id) = max_id {
                params.push(("max_id".to_string(), max_id.to_string()));
            }
            let tweets: Vec<TweetRecord> = self
                .call(Method::GET, "statuses/user_timeline.json", &params)
                .await?;
            debug!("user_timeline returned {} tweets", tweets.len());

            let next = tweets
                .last()
                .and_then(|t| t.id_str.parse::<u64>().ok())
                .and_then(|id| id.checked_sub(1))
                .map(Some);
            Ok(Some((tweets, next)))
        });

        pages
            .map_ok(|tweets| stream::iter(tweets.into_iter().map(Ok)))
            .try_flatten()
            .take(limit)
            .boxed()
    }

    async fn unfollow(&self, screen_name: &str) -> Result<()> {
        info!("Unfollowing {}", screen_name);
        self.post_unit(
            "friendships/destroy.json",
            vec![("screen_name".to_string(), screen_name.to_string())],
        )
        .await
    }

    async fn follow(&self, screen_name: &str) -> Result<()> {
        info!("Following {}", screen_name);
        self.post_unit(
            "friendships/create.json",
            vec![("screen_name".to_string(), screen_name.to_string())],
        )
        .await
    }

    async fn delete_tweet(&self, id: &str) -> Result<()> {
        info!("Deleting tweet {}", id);
        self.post_unit(&format!("statuses/destroy/{}.json", encode(id)), Vec::new())
            .await
    }

    async fn like_tweet(&self, id: &str) -> Result<()> {
        info!("Liking tweet {}", id);
        self.post_unit(
            "favorites/create.json",
            vec![("id".to_string(), id.to_string())],
        )
        .await
    }

    async fn get_current_account(&self) -> Result<UserRecord> {
        self.call(Method::GET, "account/verify_credentials.json", &[])
            .await
    }

    async fn get_account(&self, screen_name: &str) -> Result<UserRecord> {
        let params = vec![("screen_name".to_string(), screen_name.to_string())];
        self.call(Method::GET, "users/show.json", &params).await
    }
}
