#![allow(dead_code)]

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use plumes::client::{AccountClient, ClientError, Result};
use plumes::records::{TweetRecord, UserRecord};
use reqwest::StatusCode;
use std::path::PathBuf;
use std::sync::Mutex;

pub fn resource(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/resources")
        .join(name)
}

pub fn user(screen_name: &str, followers: u64, friends: u64) -> UserRecord {
    serde_json::from_value(serde_json::json!({
        "screen_name": screen_name,
        "followers_count": followers,
        "friends_count": friends,
        "statuses_count": 10,
        "favourites_count": 10
    }))
    .unwrap()
}

/// In-memory account that records every mutating call as `"<verb> <id>"`.
#[derive(Default)]
pub struct MockClient {
    pub me: Option<UserRecord>,
    pub others: Vec<UserRecord>,
    pub friends: Vec<UserRecord>,
    pub followers: Vec<UserRecord>,
    pub tweets: Vec<TweetRecord>,
    /// A call equal to this string fails with a 404.
    pub fail_on: Option<String>,
    pub calls: Mutex<Vec<String>>,
}

impl MockClient {
    pub fn calls(&self) -> Vec<String> {
        let mut calls = self.calls.lock().unwrap().clone();
        calls.sort();
        calls
    }

    fn record(&self, call: String) -> Result<()> {
        if self.fail_on.as_deref() == Some(call.as_str()) {
            return Err(ClientError::Api {
                status: StatusCode::NOT_FOUND,
                body: "{\"errors\":[{\"code\":34}]}".to_string(),
            });
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }

    fn not_found() -> ClientError {
        ClientError::Api {
            status: StatusCode::NOT_FOUND,
            body: "User not found.".to_string(),
        }
    }
}

#[async_trait]
impl AccountClient for MockClient {
    fn fetch_friends<'a>(&'a self, _account: &'a str, limit: usize) -> BoxStream<'a, Result<UserRecord>> {
        stream::iter(self.friends.clone().into_iter().map(Ok))
            .take(limit)
            .boxed()
    }

    fn fetch_followers<'a>(&'a self, _account: &'a str, limit: usize) -> BoxStream<'a, Result<UserRecord>> {
        stream::iter(self.followers.clone().into_iter().map(Ok))
            .take(limit)
            .boxed()
    }

    fn fetch_timeline<'a>(&'a self, _account: &'a str, limit: usize) -> BoxStream<'a, Result<TweetRecord>> {
        stream::iter(self.tweets.clone().into_iter().map(Ok))
            .take(limit)
            .boxed()
    }

    async fn unfollow(&self, screen_name: &str) -> Result<()> {
        self.record(format!("unfollow {}", screen_name))
    }

    async fn follow(&self, screen_name: &str) -> Result<()> {
        self.record(format!("follow {}", screen_name))
    }

    async fn delete_tweet(&self, id: &str) -> Result<()> {
        self.record(format!("delete {}", id))
    }

    async fn like_tweet(&self, id: &str) -> Result<()> {
        self.record(format!("like {}", id))
    }

    async fn get_current_account(&self) -> Result<UserRecord> {
        self.me.clone().ok_or_else(Self::not_found)
    }

    async fn get_account(&self, screen_name: &str) -> Result<UserRecord> {
        self.others
            .iter()
            .chain(self.me.iter())
            .find(|u| u.screen_name == screen_name)
            .cloned()
            .ok_or_else(Self::not_found)
    }
}
