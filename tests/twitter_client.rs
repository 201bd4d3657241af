use futures::TryStreamExt;
use mockito::{Matcher, Server};
use plumes::client::{AccountClient, ClientError, TwitterClient};
use plumes::config::Settings;
use plumes::records::{TweetRecord, UserRecord};

fn settings(api_base: String) -> Settings {
    Settings {
        consumer_key: "ck".to_string(),
        consumer_secret: "cs".to_string(),
        access_token: "at".to_string(),
        access_token_secret: "ats".to_string(),
        sleep_time: 0,
        max_retries: 1,
        api_base,
        ..Default::default()
    }
}

fn signed() -> Matcher {
    Matcher::Regex(r#"^OAuth oauth_consumer_key="ck", oauth_nonce=""#.to_string())
}

#[test]
fn test_missing_credentials_rejected() {
    match TwitterClient::new(&Settings::default()) {
        Err(ClientError::MissingCredentials(name)) => assert_eq!(name, "consumer_key"),
        Err(other) => panic!("unexpected error {}", other),
        Ok(_) => panic!("client built without credentials"),
    }
}

#[tokio::test]
async fn test_friends_follow_cursor() {
    let mut server = Server::new_async().await;
    let first = server
        .mock("GET", "/friends/list.json")
        .match_header("authorization", signed())
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("screen_name".into(), "jack".into()),
            Matcher::UrlEncoded("cursor".into(), "-1".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"users":[{"screen_name":"a"},{"screen_name":"b"}],"next_cursor":42}"#)
        .create_async()
        .await;
    let second = server
        .mock("GET", "/friends/list.json")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("screen_name".into(), "jack".into()),
            Matcher::UrlEncoded("cursor".into(), "42".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"users":[{"screen_name":"c"}],"next_cursor":0}"#)
        .create_async()
        .await;

    let client = TwitterClient::new(&settings(server.url())).unwrap();
    let users: Vec<UserRecord> = client.fetch_friends("jack", 10).try_collect().await.unwrap();

    let names: Vec<_> = users.iter().map(|u| u.screen_name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn test_limit_stops_paging() {
    let mut server = Server::new_async().await;
    let first = server
        .mock("GET", "/followers/list.json")
        .match_query(Matcher::UrlEncoded("cursor".into(), "-1".into()))
        .with_status(200)
        .with_body(r#"{"users":[{"screen_name":"a"},{"screen_name":"b"}],"next_cursor":7}"#)
        .create_async()
        .await;
    let second = server
        .mock("GET", "/followers/list.json")
        .match_query(Matcher::UrlEncoded("cursor".into(), "7".into()))
        .expect(0)
        .create_async()
        .await;

    let client = TwitterClient::new(&settings(server.url())).unwrap();
    let users: Vec<UserRecord> = client.fetch_followers("jack", 2).try_collect().await.unwrap();

    assert_eq!(users.len(), 2);
    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn test_timeline_walks_max_id() {
    let mut server = Server::new_async().await;
    let tweet = |id: &str| {
        format!(
            r#"{{"id_str":"{}","text":"t","favorite_count":0,"retweet_count":0,"favorited":false,"created_at":"Sat Jun 01 08:00:00 +0000 2024"}}"#,
            id
        )
    };
    let first = server
        .mock("GET", "/statuses/user_timeline.json")
        .match_query(Matcher::Regex("include_rts=true$".to_string()))
        .with_status(200)
        .with_body(format!("[{},{}]", tweet("101"), tweet("100")))
        .create_async()
        .await;
    let second = server
        .mock("GET", "/statuses/user_timeline.json")
        .match_query(Matcher::Regex("max_id=99$".to_string()))
        .with_status(200)
        .with_body(format!("[{}]", tweet("99")))
        .create_async()
        .await;
    let last = server
        .mock("GET", "/statuses/user_timeline.json")
        .match_query(Matcher::Regex("max_id=98$".to_string()))
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let client = TwitterClient::new(&settings(server.url())).unwrap();
    let tweets: Vec<TweetRecord> = client.fetch_timeline("jack", 10).try_collect().await.unwrap();

    let ids: Vec<_> = tweets.iter().map(|t| t.id_str.as_str()).collect();
    assert_eq!(ids, vec!["101", "100", "99"]);
    first.assert_async().await;
    second.assert_async().await;
    last.assert_async().await;
}

#[tokio::test]
async fn test_rate_limit_retries_then_gives_up() {
    let mut server = Server::new_async().await;
    let limited = server
        .mock("GET", "/users/show.json")
        .match_query(Matcher::UrlEncoded("screen_name".into(), "jack".into()))
        .with_status(429)
        .with_body(r#"{"errors":[{"code":88,"message":"Rate limit exceeded"}]}"#)
        .expect(2)
        .create_async()
        .await;

    let client = TwitterClient::new(&settings(server.url())).unwrap();
    match client.get_account("jack").await {
        Err(ClientError::RateLimited { retries }) => assert_eq!(retries, 1),
        other => panic!("unexpected {:?}", other.map(|u| u.screen_name)),
    }
    limited.assert_async().await;
}

#[tokio::test]
async fn test_unfollow_posts_screen_name() {
    let mut server = Server::new_async().await;
    let destroy = server
        .mock("POST", "/friendships/destroy.json")
        .match_header("authorization", signed())
        .match_query(Matcher::UrlEncoded("screen_name".into(), "spammy".into()))
        .with_status(200)
        .with_body(r#"{"screen_name":"spammy"}"#)
        .create_async()
        .await;

    let client = TwitterClient::new(&settings(server.url())).unwrap();
    client.unfollow("spammy").await.unwrap();
    destroy.assert_async().await;
}

#[tokio::test]
async fn test_delete_and_like_tweet() {
    let mut server = Server::new_async().await;
    let destroy = server
        .mock("POST", "/statuses/destroy/123.json")
        .with_status(200)
        .with_body(r#"{"id_str":"123"}"#)
        .create_async()
        .await;
    let like = server
        .mock("POST", "/favorites/create.json")
        .match_query(Matcher::UrlEncoded("id".into(), "456".into()))
        .with_status(200)
        .with_body(r#"{"id_str":"456"}"#)
        .create_async()
        .await;

    let client = TwitterClient::new(&settings(server.url())).unwrap();
    client.delete_tweet("123").await.unwrap();
    client.like_tweet("456").await.unwrap();
    destroy.assert_async().await;
    like.assert_async().await;
}

#[tokio::test]
async fn test_api_error_propagates() {
    let mut server = Server::new_async().await;
    let _unauthorized = server
        .mock("GET", "/account/verify_credentials.json")
        .with_status(401)
        .with_body(r#"{"errors":[{"code":89,"message":"Invalid or expired token."}]}"#)
        .create_async()
        .await;

    let client = TwitterClient::new(&settings(server.url())).unwrap();
    match client.get_current_account().await {
        Err(ClientError::Api { status, body }) => {
            assert_eq!(status.as_u16(), 401);
            assert!(body.contains("Invalid or expired token"));
        }
        other => panic!("unexpected {:?}", other.map(|u| u.screen_name)),
    }
}
