//! OAuth 1.0a request signing (HMAC-SHA1) for user-context API calls.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use urlencoding::encode;
use uuid::Uuid;

use crate::client::{ClientError, Result};
use crate::config::Credentials;

/// Build the `Authorization` header for a request to `url` (no query
/// string) carrying `params`, with a fresh nonce and the current time.
pub fn authorization_header(
    method: &str,
    url: &str,
    params: &[(String, String)],
    credentials: &Credentials,
) -> Result<String> {
    let nonce = Uuid::new_v4().simple().to_string();
    let timestamp = Utc::now().timestamp().to_string();
    signed_header(method, url, params, credentials, &nonce, &timestamp)
}

fn signed_header(
    method: &str,
    url: &str,
    params: &[(String, String)],
    credentials: &Credentials,
    nonce: &str,
    timestamp: &str,
) -> Result<String> {
    let mut oauth: Vec<(&str, String)> = vec![
        ("oauth_consumer_key", credentials.consumer_key.clone()),
        ("oauth_nonce", nonce.to_string()),
        ("oauth_signature_method", "HMAC-SHA1".to_string()),
        ("oauth_timestamp", timestamp.to_string()),
        ("oauth_token", credentials.access_token.clone()),
        ("oauth_version", "1.0".to_string()),
    ];

    let signature = signature(method, url, params, &oauth, credentials)?;
    oauth.push(("oauth_signature", signature));
    oauth.sort_by(|a, b| a.0.cmp(b.0));

    let fields: Vec<String> = oauth
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
        .collect();
    Ok(format!("OAuth {}", fields.join(", ")))
}

fn signature(
    method: &str,
    url: &str,
    params: &[(String, String)],
    oauth: &[(&str, String)],
    credentials: &Credentials,
) -> Result<String> {
    let mut pairs: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (encode(k).into_owned(), encode(v).into_owned()))
        .chain(
            oauth
                .iter()
                .map(|(k, v)| (encode(k).into_owned(), encode(v).into_owned())),
        )
        .collect();
    pairs.sort();

    let parameter_string = pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let base = format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        encode(url),
        encode(&parameter_string)
    );
    let key = format!(
        "{}&{}",
        encode(&credentials.consumer_secret),
        encode(&credentials.access_token_secret)
    );

    let mut mac = Hmac::<Sha1>::new_from_slice(key.as_bytes())
        .map_err(|e| ClientError::Signing(e.to_string()))?;
    mac.update(base.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}
