//! Response envelope: a decoded payload plus the transport metadata that
//! came with it (status, next-page cursor, rate-limit headers).

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, LINK, RETRY_AFTER};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::DecodeError;

/// Continuation token for the next page of a list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Cursor {
    /// Opaque token from the body; sent back as `?cursor=…` on the same path.
    Token(String),
    /// Full URL from a `Link: <…>; rel="next"` header; followed verbatim.
    Link(String),
}

/// Rate-limit state reported by the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimit {
    pub limit: Option<u64>,
    pub remaining: Option<u64>,
    pub retry_after_secs: Option<u64>,
}

impl RateLimit {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            limit: header_u64(headers, "x-ratelimit-limit"),
            remaining: header_u64(headers, "x-ratelimit-remaining"),
            retry_after_secs: header_u64(headers, RETRY_AFTER.as_str()),
        }
    }
}

/// A decoded response with its metadata. Produced by one engine call and
/// consumed by its caller; nothing retains it.
#[derive(Debug, Clone)]
pub struct Envelope<T> {
    pub status: StatusCode,
    pub data: T,
    pub next: Option<Cursor>,
    pub rate_limit: RateLimit,
}

impl<T> Envelope<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        Envelope {
            status: self.status,
            data: f(self.data),
            next: self.next,
            rate_limit: self.rate_limit,
        }
    }
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

/// Extract the `rel="next"` target from an RFC 8288 `Link` header.
pub(crate) fn next_link(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(LINK)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .find_map(|entry| {
            let mut parts = entry.split(';');
            let target = parts.next()?.trim();
            let is_next = parts.any(|param| {
                let param = param.trim();
                param
                    .strip_prefix("rel=")
                    .is_some_and(|rel| rel.trim_matches('"').split_whitespace().any(|r| r == "next"))
            });
            is_next.then(|| {
                target
                    .trim_start_matches('<')
                    .trim_end_matches('>')
                    .to_owned()
            })
        })
}

/// The continuation token carried in a response body, if any.
///
/// Reads `next_cursor`, falling back to `next`; empty strings and `null`
/// mean there is no further page.
pub(crate) fn body_cursor(body: &Value) -> Option<String> {
    let obj = body.as_object()?;
    ["next_cursor", "next"]
        .iter()
        .find_map(|key| obj.get(*key).and_then(Value::as_str))
        .filter(|cursor| !cursor.is_empty())
        .map(str::to_owned)
}

/// One page of a list response.
///
/// Looker returns bare arrays; cursor-paginated endpoints wrap them as
/// `{ "data": [...], "next_cursor": "…" }` (or `"next"`).
pub(crate) struct Page<T> {
    pub items: Vec<T>,
    pub cursor: Option<String>,
}

impl<T: DeserializeOwned> Page<T> {
    pub fn decode(body: &str) -> Result<Self, DecodeError> {
        let value: Value =
            serde_json::from_str(body).map_err(|e| DecodeError::malformed(&e, body))?;

        let (items, cursor) = match value {
            Value::Array(_) => (value, None),
            Value::Object(mut obj) => {
                let Some(items) = obj.remove("data") else {
                    return Err(DecodeError::MalformedBody {
                        message: "list response is neither an array nor a `data` envelope"
                            .into(),
                        body: body.to_owned(),
                    });
                };
                let cursor = body_cursor(&Value::Object(obj));
                (items, cursor)
            }
            _ => {
                return Err(DecodeError::MalformedBody {
                    message: "list response is neither an array nor a `data` envelope".into(),
                    body: body.to_owned(),
                });
            }
        };

        let items = serde_json::from_value(items).map_err(|e| DecodeError::malformed(&e, body))?;
        Ok(Self { items, cursor })
    }
}
