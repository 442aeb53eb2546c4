//! HTTP lookup client for Twitter's v1.1 `statuses/lookup` endpoint.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use tracing::debug;

use crate::config::FetchConfig;
use crate::error::{FetchError, FetchResult};
use crate::fetch::{LookupPage, TweetLookup};
use crate::oauth::OAuthSigner;
use crate::ratelimit::RateLimitStatus;

const LOOKUP_ENDPOINT: &str = "/1.1/statuses/lookup.json";

/// Resolves id batches against `GET statuses/lookup.json`.
///
/// Requests are made in extended tweet mode so 280-character tweets come
/// back whole (in `full_text`), and each returned tweet is re-emitted as
/// its own untouched JSON document.
#[derive(Debug)]
pub struct TwitterLookupClient {
    client: Client,
    base_url: String,
    signer: OAuthSigner,
}

impl TwitterLookupClient {
    /// Build a client from configuration.
    pub fn new(config: &FetchConfig) -> FetchResult<Self> {
        let mut builder = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("fetch-tweets/", env!("CARGO_PKG_VERSION")));

        if let Some(proxy) = &config.proxy {
            let mut p = reqwest::Proxy::all(format!("http://{}:{}", proxy.host, proxy.port))?;
            if let (Some(user), Some(pass)) = (&proxy.username, &proxy.password) {
                p = p.basic_auth(user, pass);
            }
            builder = builder.proxy(p);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            signer: OAuthSigner::new(config),
        })
    }

    async fn handle_response(&self, response: Response) -> FetchResult<LookupPage> {
        let status = response.status();
        let rate_limit = RateLimitStatus::from_headers(response.headers());

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = rate_limit.map_or(60, |r| r.seconds_until_reset);
            return Err(FetchError::RateLimited { retry_after });
        }

        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(FetchError::Api {
                status: status.as_u16(),
                message: api_error_message(&bytes),
                retry_after: rate_limit.map(|r| r.seconds_until_reset),
            });
        }

        let tweets: Vec<Value> = serde_json::from_slice(&bytes)?;
        debug!(count = tweets.len(), "Lookup returned tweets");

        Ok(LookupPage {
            tweets: tweets.iter().map(Value::to_string).collect(),
            rate_limit,
        })
    }
}

#[async_trait]
impl TweetLookup for TwitterLookupClient {
    async fn lookup(&self, ids: &[u64]) -> FetchResult<LookupPage> {
        let id_list = ids
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let params = vec![
            ("id".to_string(), id_list),
            ("tweet_mode".to_string(), "extended".to_string()),
        ];

        let url = format!("{}{LOOKUP_ENDPOINT}", self.base_url);
        let auth = self.signer.authorization_header("GET", &url, &params)?;

        let query = params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        let response = self
            .client
            .get(format!("{url}?{query}"))
            .header("Authorization", auth)
            .send()
            .await?;

        self.handle_response(response).await
    }
}

/// Pull a human-readable message out of a v1.1 error body.
fn api_error_message(bytes: &[u8]) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        #[serde(default)]
        errors: Vec<ApiError>,
    }

    #[derive(serde::Deserialize)]
    struct ApiError {
        message: String,
        #[serde(default)]
        code: Option<i32>,
    }

    serde_json::from_slice::<ErrorBody>(bytes)
        .ok()
        .and_then(|body| body.errors.into_iter().next())
        .map_or_else(
            || String::from_utf8_lossy(bytes).into_owned(),
            |e| match e.code {
                Some(code) => format!("{} (code {code})", e.message),
                None => e.message,
            },
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};
    use wiremock::matchers::{header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(server: &MockServer) -> FetchConfig {
        FetchConfig {
            consumer_key: "ck".into(),
            consumer_secret: "cs".into(),
            access_token: "at".into(),
            access_token_secret: "ats".into(),
            api_url: server.uri(),
            ..Default::default()
        }
    }

    fn epoch_in(secs: u64) -> String {
        (SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
            + secs)
            .to_string()
    }

    #[tokio::test]
    async fn lookup_returns_raw_documents_in_order() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(LOOKUP_ENDPOINT))
            .and(query_param("id", "11,22"))
            .and(query_param("tweet_mode", "extended"))
            .and(header_exists("Authorization"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 11, "full_text": "first"},
                {"id": 22, "full_text": "second"}
            ])))
            .mount(&server)
            .await;

        let client = TwitterLookupClient::new(&test_config(&server)).unwrap();
        let page = client.lookup(&[11, 22]).await.unwrap();

        assert_eq!(page.tweets.len(), 2);
        let first: Value = serde_json::from_str(&page.tweets[0]).unwrap();
        assert_eq!(first["id"], 11);
        let second: Value = serde_json::from_str(&page.tweets[1]).unwrap();
        assert_eq!(second["id"], 22);
    }

    #[tokio::test]
    async fn lookup_parses_rate_limit_headers() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(LOOKUP_ENDPOINT))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("x-rate-limit-remaining", "5")
                    .insert_header("x-rate-limit-reset", epoch_in(20).as_str())
                    .set_body_json(serde_json::json!([])),
            )
            .mount(&server)
            .await;

        let client = TwitterLookupClient::new(&test_config(&server)).unwrap();
        let page = client.lookup(&[1]).await.unwrap();

        let status = page.rate_limit.expect("rate limit headers present");
        assert_eq!(status.remaining_calls, 5);
        assert!(status.seconds_until_reset <= 20);
        assert!(status.doze_duration().is_some());
    }

    #[tokio::test]
    async fn too_many_requests_maps_to_rate_limited() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(LOOKUP_ENDPOINT))
            .respond_with(
                ResponseTemplate::new(429)
                    .insert_header("x-rate-limit-remaining", "0")
                    .insert_header("x-rate-limit-reset", epoch_in(90).as_str()),
            )
            .mount(&server)
            .await;

        let client = TwitterLookupClient::new(&test_config(&server)).unwrap();
        let err = client.lookup(&[1]).await.unwrap_err();

        assert!(matches!(err, FetchError::RateLimited { retry_after } if retry_after <= 90));
    }

    #[tokio::test]
    async fn api_error_body_is_surfaced() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(LOOKUP_ENDPOINT))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "errors": [{"code": 179, "message": "Sorry, you are not authorized to see this status."}]
            })))
            .mount(&server)
            .await;

        let client = TwitterLookupClient::new(&test_config(&server)).unwrap();
        let err = client.lookup(&[1]).await.unwrap_err();

        match err {
            FetchError::Api { status, message, .. } => {
                assert_eq!(status, 403);
                assert!(message.contains("not authorized"));
                assert!(message.contains("179"));
            }
            other => panic!("expected Api error, got {other}"),
        }
    }
}
