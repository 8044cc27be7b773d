//! Practicum API client
//!
//! One HTTP GET per poll cycle against the single homework-statuses endpoint.
//! Transport failures, non-2xx statuses and semantically erroneous 200s are
//! translated into typed errors; the loop forwards their display text to the
//! chat, so the messages stay in the user's language.

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// The single endpoint this bot ever talks to.
pub const ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";

/// Keys a well-formed response is allowed to contain. Anything else (`code`,
/// `error`, `message`, ...) is the server reporting a failure inside a JSON
/// body, regardless of the HTTP status.
const ALLOWED_KEYS: [&str; 2] = ["homeworks", "current_date"];

/// Request parameters kept for diagnostics. The auth header is deliberately
/// not captured here: error text ends up in chat messages.
#[derive(Debug, Clone)]
pub struct RequestSnapshot {
    /// Requested URL
    pub url: &'static str,
    /// Lower bound of the poll window
    pub from_date: i64,
}

impl fmt::Display for RequestSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}?from_date={}", self.url, self.from_date)
    }
}

/// Errors produced while querying the homework-statuses endpoint
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure: DNS, timeout, connection reset.
    #[error("Сбой при запросе к эндпоинту {request}: {source}")]
    Connection {
        /// Parameters of the failed request
        request: RequestSnapshot,
        /// Underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-2xx status.
    #[error("Эндпоинт {request} недоступен. Код ответа API: {}", .status.as_u16())]
    BadStatus {
        /// Parameters of the failed request
        request: RequestSnapshot,
        /// HTTP status code
        status: reqwest::StatusCode,
        /// Response body, when it was parseable JSON
        body: Option<Value>,
    },

    /// A JSON body carrying a key outside the documented response shape,
    /// e.g. `code` or `error`. Detected before the status check so that a
    /// malformed-but-200 response is still caught.
    #[error("API вернул ошибку: {key} = {value}")]
    ServerReported {
        /// The offending key
        key: String,
        /// Its value
        value: Value,
        /// The full response body
        body: Value,
    },

    /// A 2xx response whose body is not valid JSON.
    #[error("Не удалось разобрать ответ эндпоинта {request}: {source}")]
    Json {
        /// Parameters of the failed request
        request: RequestSnapshot,
        /// Underlying parse error
        #[source]
        source: serde_json::Error,
    },
}

/// The status API seam, so the polling loop can be driven by a scripted
/// implementation in tests.
#[async_trait]
pub trait HomeworkApi: Send + Sync {
    /// Fetch homework statuses updated since `from_date` (unix seconds).
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, a non-2xx status, an
    /// unparseable body, or a server-reported error payload.
    async fn fetch(&self, from_date: i64) -> Result<Value, ApiError>;
}

/// HTTP client for the homework-statuses endpoint
pub struct StatusClient {
    http: reqwest::Client,
    token: String,
}

impl StatusClient {
    /// Build a client authenticating as `token`. The observed source behavior
    /// has no client-side timeout, so one is applied only when configured.
    #[must_use]
    pub fn new(token: &str, timeout: Option<Duration>) -> Self {
        let builder = reqwest::Client::builder();
        let builder = match timeout {
            Some(t) => builder.timeout(t),
            None => builder,
        };
        let http = builder.build().unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            token: token.to_owned(),
        }
    }
}

#[async_trait]
impl HomeworkApi for StatusClient {
    async fn fetch(&self, from_date: i64) -> Result<Value, ApiError> {
        let request = RequestSnapshot {
            url: ENDPOINT,
            from_date,
        };

        let response = self
            .http
            .get(ENDPOINT)
            .header("Authorization", format!("OAuth {}", self.token))
            .query(&[("from_date", from_date)])
            .send()
            .await
            .map_err(|source| ApiError::Connection {
                request: request.clone(),
                source,
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|source| ApiError::Connection {
                request: request.clone(),
                source,
            })?;
        let body: Result<Value, serde_json::Error> = serde_json::from_str(&text);

        // Server-reported failures come first: an unauthenticated request
        // may arrive as a 200 with {"code": "not_authenticated", ...}.
        if let Ok(parsed) = &body {
            if let Some(map) = parsed.as_object() {
                if let Some((key, value)) =
                    map.iter().find(|(k, _)| !ALLOWED_KEYS.contains(&k.as_str()))
                {
                    return Err(ApiError::ServerReported {
                        key: key.clone(),
                        value: value.clone(),
                        body: parsed.clone(),
                    });
                }
            }
        }

        if !status.is_success() {
            return Err(ApiError::BadStatus {
                request,
                status,
                body: body.ok(),
            });
        }

        body.map_err(|source| ApiError::Json { request, source })
    }
}
