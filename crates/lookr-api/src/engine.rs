// Generic CRUD engine.
//
// One implementation of List/Get/Create/Update/Delete, parameterized over the
// result shape instead of the resource. Paths are relative to `{api-version}/`.
// Every call takes a cancellation token and performs at most one request at a
// time; multi-page lists walk the cursor chain strictly in order.

use std::collections::HashSet;

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::envelope::{Cursor, Envelope, Page, RateLimit, body_cursor, next_link};
use crate::error::{ApiError, DecodeError, Error, FieldError};
use crate::transport::{RawResponse, Request, Transport};

/// API version prefixed to every path unless overridden.
pub const DEFAULT_API_VERSION: &str = "4.0";

/// HTTP method used for updates. Fixed per resource family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMethod {
    Patch,
    Put,
}

impl UpdateMethod {
    fn as_method(self) -> Method {
        match self {
            Self::Patch => Method::PATCH,
            Self::Put => Method::PUT,
        }
    }
}

// ── Error response shape ─────────────────────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    errors: Vec<FieldError>,
    #[serde(default)]
    documentation_url: Option<String>,
}

// ── Listing ──────────────────────────────────────────────────────────

/// The concatenated result of a (possibly multi-page) list call.
#[derive(Debug)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub pages: usize,
    /// Rate-limit headers of the last page fetched.
    pub rate_limit: RateLimit,
    /// Set when the call was cancelled after at least one page arrived.
    /// `items` then holds every page fetched before the cancellation.
    pub interrupted: Option<Error>,
}

impl<T> Listing<T> {
    pub fn is_partial(&self) -> bool {
        self.interrupted.is_some()
    }

    /// Discard partial results: an interrupted listing becomes its error.
    pub fn into_complete(self) -> Result<Vec<T>, Error> {
        match self.interrupted {
            Some(err) => Err(err),
            None => Ok(self.items),
        }
    }
}

// ── Engine ───────────────────────────────────────────────────────────

/// Typed REST client over any [`Transport`].
///
/// Holds no per-call state, so one engine can serve concurrent callers as
/// long as its transport can.
pub struct CrudEngine<T> {
    transport: T,
    api_version: String,
}

impl<T: Transport> CrudEngine<T> {
    pub fn new(transport: T) -> Self {
        Self::with_api_version(transport, DEFAULT_API_VERSION)
    }

    pub fn with_api_version(transport: T, api_version: impl Into<String>) -> Self {
        Self {
            transport,
            api_version: api_version.into(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    // ── Path builders ────────────────────────────────────────────────

    fn collection(&self, path: &str) -> String {
        format!("{}/{}", self.api_version, path.trim_matches('/'))
    }

    fn member(&self, path: &str, id: &str) -> Result<String, Error> {
        if id.is_empty() || id.contains(['/', '?', '#']) {
            return Err(DecodeError::InvalidValue {
                field: "id".into(),
                message: format!("{id:?} is not a valid resource id"),
            }
            .into());
        }
        Ok(format!("{}/{id}", self.collection(path)))
    }

    // ── Exchange ─────────────────────────────────────────────────────

    /// Send one request, racing it against the caller's cancellation token.
    async fn round_trip(
        &self,
        request: Request,
        cancel: &CancellationToken,
    ) -> Result<RawResponse, Error> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(Error::Cancelled),
            result = self.transport.send(request) => result,
        }
    }

    /// Perform a request and decode the success body, keeping the metadata.
    ///
    /// `request.path` is used as given; prefix it with the API version.
    pub async fn exchange<R: DeserializeOwned>(
        &self,
        request: Request,
        cancel: &CancellationToken,
    ) -> Result<Envelope<R>, Error> {
        let raw = success(self.round_trip(request, cancel).await?)?;
        let value: serde_json::Value = serde_json::from_str(&raw.body)
            .map_err(|e| DecodeError::malformed(&e, &raw.body))?;
        let next = next_link(&raw.headers)
            .map(Cursor::Link)
            .or_else(|| body_cursor(&value).map(Cursor::Token));
        let data =
            serde_json::from_value(value).map_err(|e| DecodeError::malformed(&e, &raw.body))?;

        Ok(Envelope {
            status: raw.status,
            data,
            next,
            rate_limit: RateLimit::from_headers(&raw.headers),
        })
    }

    // ── CRUD ─────────────────────────────────────────────────────────

    /// `GET {path}`, following every continuation until the last page.
    ///
    /// A `Link: rel="next"` header wins over a body cursor. If the token
    /// fires after the first page, the pages already fetched are returned
    /// with `interrupted` set; before that, the call fails with `Cancelled`.
    pub async fn list<R: DeserializeOwned>(
        &self,
        path: &str,
        cancel: &CancellationToken,
    ) -> Result<Listing<R>, Error> {
        let mut listing = Listing {
            items: Vec::new(),
            pages: 0,
            rate_limit: RateLimit::default(),
            interrupted: None,
        };
        let mut request = Request::get(self.collection(path));
        let mut followed: HashSet<Cursor> = HashSet::new();

        loop {
            let raw = match self.round_trip(request, cancel).await {
                Ok(raw) => success(raw)?,
                Err(Error::Cancelled) if listing.pages > 0 => {
                    warn!(
                        path,
                        pages = listing.pages,
                        items = listing.items.len(),
                        "list cancelled, returning partial result"
                    );
                    listing.interrupted = Some(Error::Cancelled);
                    return Ok(listing);
                }
                Err(e) => return Err(e),
            };

            let page = Page::<R>::decode(&raw.body)?;
            listing.pages += 1;
            listing.rate_limit = RateLimit::from_headers(&raw.headers);
            listing.items.extend(page.items);

            let next = next_link(&raw.headers)
                .map(Cursor::Link)
                .or_else(|| page.cursor.map(Cursor::Token));
            let Some(next) = next else {
                break;
            };
            if followed.contains(&next) {
                return Err(DecodeError::MalformedBody {
                    message: format!("pagination cursor repeated: {next:?}"),
                    body: raw.body,
                }
                .into());
            }

            debug!(path, pages = listing.pages, cursor = ?next, "fetching next page");
            request = match &next {
                Cursor::Link(url) => Request::get(url.as_str()),
                Cursor::Token(token) => {
                    Request::get(self.collection(path)).query("cursor", token.as_str())
                }
            };
            followed.insert(next);
        }

        debug!(path, pages = listing.pages, items = listing.items.len(), "list complete");
        Ok(listing)
    }

    /// `GET {path}/{id}`.
    pub async fn get<R: DeserializeOwned>(
        &self,
        path: &str,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<R, Error> {
        let request = Request::get(self.member(path, id)?);
        Ok(self.exchange(request, cancel).await?.data)
    }

    /// `POST {path}`. Returns the server's representation, not the input.
    pub async fn create<R: DeserializeOwned, W: Serialize + Sync>(
        &self,
        path: &str,
        body: &W,
        cancel: &CancellationToken,
    ) -> Result<R, Error> {
        let request = Request::new(Method::POST, self.collection(path)).json(encode(body)?);
        Ok(self.exchange(request, cancel).await?.data)
    }

    /// `PATCH`/`PUT {path}/{id}`. Same response contract as `create`.
    pub async fn update<R: DeserializeOwned, W: Serialize + Sync>(
        &self,
        path: &str,
        id: &str,
        method: UpdateMethod,
        body: &W,
        cancel: &CancellationToken,
    ) -> Result<R, Error> {
        let request = Request::new(method.as_method(), self.member(path, id)?).json(encode(body)?);
        Ok(self.exchange(request, cancel).await?.data)
    }

    /// `DELETE {path}/{id}`. A 404 counts as success.
    pub async fn delete(
        &self,
        path: &str,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<(), Error> {
        let request = Request::new(Method::DELETE, self.member(path, id)?);
        match success(self.round_trip(request, cancel).await?) {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => {
                debug!(path, id, "delete target already gone");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

// ── Response handling ────────────────────────────────────────────────

fn encode<W: Serialize>(body: &W) -> Result<serde_json::Value, Error> {
    serde_json::to_value(body).map_err(|e| {
        DecodeError::InvalidValue {
            field: "request body".into(),
            message: e.to_string(),
        }
        .into()
    })
}

/// Pass 2xx responses through; turn everything else into a typed error.
fn success(raw: RawResponse) -> Result<RawResponse, Error> {
    if raw.status.is_success() {
        Ok(raw)
    } else {
        Err(parse_error(&raw).into())
    }
}

pub(crate) fn parse_error(raw: &RawResponse) -> ApiError {
    let status = raw.status.as_u16();
    let structured = serde_json::from_str::<ErrorBody>(&raw.body).ok();

    if let Some(url) = structured.as_ref().and_then(|b| b.documentation_url.as_deref()) {
        debug!(status, documentation_url = url, "API error");
    }

    let message = structured.as_ref().map_or_else(
        || {
            if raw.body.is_empty() {
                raw.status.to_string()
            } else {
                raw.body.clone()
            }
        },
        |b| b.message.clone(),
    );

    match status {
        404 => ApiError::NotFound { message },
        409 => ApiError::Conflict { message },
        400 | 422 => ApiError::Validation {
            status,
            message,
            errors: structured.map(|b| b.errors).unwrap_or_default(),
        },
        429 => ApiError::RateLimited {
            retry_after_secs: RateLimit::from_headers(&raw.headers).retry_after_secs,
        },
        _ if raw.status.is_server_error() => ApiError::ServerError { status, message },
        _ => match structured {
            Some(body) => ApiError::Status {
                status,
                message: body.message,
            },
            None => ApiError::Opaque {
                status,
                body: raw.body.clone(),
            },
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;
    use reqwest::StatusCode;
    use reqwest::header::{HeaderValue, LINK, RETRY_AFTER};
    use serde::Deserialize;
    use serde_json::{Value, json};

    use super::*;

    // ── Scripted transport ──────────────────────────────────────────

    /// Replays canned responses in order and records every request.
    #[derive(Default)]
    struct ScriptedTransport {
        responses: Mutex<VecDeque<RawResponse>>,
        requests: Mutex<Vec<Request>>,
        /// Fire the token once this many responses have been served.
        cancel_after: Option<(usize, CancellationToken)>,
    }

    impl ScriptedTransport {
        fn new(responses: impl IntoIterator<Item = RawResponse>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().collect()),
                ..Self::default()
            }
        }

        fn cancelling_after(mut self, served: usize, token: CancellationToken) -> Self {
            self.cancel_after = Some((served, token));
            self
        }

        fn requests(&self) -> Vec<Request> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl Transport for ScriptedTransport {
        async fn send(&self, request: Request) -> Result<RawResponse, Error> {
            let served = {
                let mut requests = self.requests.lock().unwrap();
                requests.push(request);
                requests.len()
            };
            let response = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected extra request");
            if let Some((after, token)) = &self.cancel_after {
                if served >= *after {
                    token.cancel();
                }
            }
            Ok(response)
        }
    }

    fn json_response(status: u16, body: &Value) -> RawResponse {
        RawResponse::new(StatusCode::from_u16(status).unwrap(), body.to_string())
    }

    fn with_link(mut raw: RawResponse, url: &str) -> RawResponse {
        raw.headers.insert(
            LINK,
            HeaderValue::from_str(&format!("<{url}>; rel=\"next\"")).unwrap(),
        );
        raw
    }

    fn cursor_page(items: &[u32], next: Option<&str>) -> RawResponse {
        json_response(200, &json!({ "data": items, "next_cursor": next }))
    }

    fn engine(responses: impl IntoIterator<Item = RawResponse>) -> CrudEngine<ScriptedTransport> {
        CrudEngine::new(ScriptedTransport::new(responses))
    }

    // ── List ─────────────────────────────────────────────────────────

    #[tokio::test]
    async fn list_walks_cursor_chain_in_order() {
        let engine = engine([
            cursor_page(&[1, 2], Some("B")),
            cursor_page(&[3], Some("C")),
            cursor_page(&[4, 5], None),
        ]);

        let listing: Listing<u32> = engine.list("themes", &CancellationToken::new()).await.unwrap();

        assert_eq!(listing.items, vec![1, 2, 3, 4, 5]);
        assert_eq!(listing.pages, 3);
        assert!(!listing.is_partial());

        let requests = engine.transport().requests();
        assert_eq!(requests.len(), 3);
        assert!(requests.iter().all(|r| r.path == "4.0/themes"));
        assert!(requests[0].query.is_empty());
        assert_eq!(requests[1].query, vec![("cursor".to_owned(), "B".to_owned())]);
        assert_eq!(requests[2].query, vec![("cursor".to_owned(), "C".to_owned())]);
    }

    #[tokio::test]
    async fn list_follows_link_headers_verbatim() {
        let engine = engine([
            with_link(
                json_response(200, &json!([1])),
                "https://corp.looker.com/api/4.0/alerts/search?offset=1",
            ),
            json_response(200, &json!([2])),
        ]);

        let listing: Listing<u32> = engine
            .list("alerts/search", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(listing.items, vec![1, 2]);
        let requests = engine.transport().requests();
        assert_eq!(
            requests[1].path,
            "https://corp.looker.com/api/4.0/alerts/search?offset=1"
        );
    }

    #[tokio::test]
    async fn link_header_takes_precedence_over_body_cursor() {
        let engine = engine([
            with_link(cursor_page(&[1], Some("ignored")), "4.0/themes?page=2"),
            json_response(200, &json!([2])),
        ]);

        let listing: Listing<u32> = engine.list("themes", &CancellationToken::new()).await.unwrap();

        assert_eq!(listing.items, vec![1, 2]);
        assert_eq!(engine.transport().requests()[1].path, "4.0/themes?page=2");
    }

    #[tokio::test]
    async fn exchange_exposes_body_cursor() {
        let engine = engine([
            cursor_page(&[1], Some("B")),
            with_link(cursor_page(&[2], Some("ignored")), "4.0/themes?page=3"),
        ]);
        let cancel = CancellationToken::new();

        let first: Envelope<Value> = engine
            .exchange(Request::get("4.0/themes"), &cancel)
            .await
            .unwrap();
        assert_eq!(first.next, Some(Cursor::Token("B".into())));
        assert_eq!(first.data["data"], json!([1]));

        let second: Envelope<Value> = engine
            .exchange(Request::get("4.0/themes"), &cancel)
            .await
            .unwrap();
        assert_eq!(second.next, Some(Cursor::Link("4.0/themes?page=3".into())));
    }

    #[tokio::test]
    async fn single_bare_page_is_one_request() {
        let engine = engine([json_response(200, &json!([7, 8]))]);

        let listing: Listing<u32> = engine.list("themes", &CancellationToken::new()).await.unwrap();

        assert_eq!(listing.items, vec![7, 8]);
        assert_eq!(engine.transport().requests().len(), 1);
    }

    #[tokio::test]
    async fn cancelled_list_keeps_fetched_pages() {
        let token = CancellationToken::new();
        let transport = ScriptedTransport::new([
            cursor_page(&[1, 2], Some("B")),
            cursor_page(&[3], Some("C")),
            cursor_page(&[4], None),
        ])
        .cancelling_after(2, token.clone());
        let engine = CrudEngine::new(transport);

        let listing: Listing<u32> = engine.list("themes", &token).await.unwrap();

        assert_eq!(listing.items, vec![1, 2, 3]);
        assert_eq!(listing.pages, 2);
        assert!(matches!(listing.interrupted, Some(Error::Cancelled)));
        assert_eq!(engine.transport().requests().len(), 2);
        assert!(matches!(listing.into_complete(), Err(Error::Cancelled)));
    }

    #[tokio::test]
    async fn list_cancelled_before_first_page_fails() {
        let token = CancellationToken::new();
        token.cancel();
        let engine = engine([]);

        let result: Result<Listing<u32>, _> = engine.list("themes", &token).await;

        assert!(matches!(result, Err(Error::Cancelled)));
        assert!(engine.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn repeated_cursor_is_rejected() {
        let engine = engine([cursor_page(&[1], Some("A")), cursor_page(&[2], Some("A"))]);

        let result: Result<Listing<u32>, _> = engine.list("themes", &CancellationToken::new()).await;

        assert!(matches!(
            result,
            Err(Error::Decode(DecodeError::MalformedBody { .. }))
        ));
    }

    #[tokio::test]
    async fn cursor_cycle_is_rejected() {
        let engine = engine([
            cursor_page(&[1], Some("A")),
            cursor_page(&[2], Some("B")),
            cursor_page(&[3], Some("A")),
            cursor_page(&[4], Some("B")),
            cursor_page(&[5], None),
        ]);

        let result: Result<Listing<u32>, _> = engine.list("themes", &CancellationToken::new()).await;

        assert!(matches!(
            result,
            Err(Error::Decode(DecodeError::MalformedBody { ref message, .. }))
                if message.contains("\"A\"")
        ));
        assert_eq!(engine.transport().requests().len(), 3);
    }

    #[tokio::test]
    async fn list_error_on_later_page_propagates() {
        let engine = engine([
            cursor_page(&[1], Some("B")),
            json_response(500, &json!({ "message": "boom" })),
        ]);

        let result: Result<Listing<u32>, _> = engine.list("themes", &CancellationToken::new()).await;

        assert!(matches!(
            result,
            Err(Error::Api(ApiError::ServerError { status: 500, .. }))
        ));
    }

    // ── Get / Create / Update ───────────────────────────────────────

    #[derive(Debug, Deserialize, PartialEq)]
    struct Named {
        id: String,
        name: String,
    }

    #[tokio::test]
    async fn get_404_is_not_found() {
        let engine = engine([json_response(404, &json!({ "message": "Not found" }))]);

        let result: Result<Named, _> = engine.get("themes", "9", &CancellationToken::new()).await;

        assert!(result.unwrap_err().is_not_found());
        assert_eq!(engine.transport().requests()[0].path, "4.0/themes/9");
    }

    #[tokio::test]
    async fn get_shape_mismatch_is_decode_error() {
        let engine = engine([json_response(200, &json!({ "id": 42 }))]);

        let result: Result<Named, _> = engine.get("themes", "42", &CancellationToken::new()).await;

        assert!(matches!(
            result,
            Err(Error::Decode(DecodeError::MalformedBody { .. }))
        ));
    }

    #[tokio::test]
    async fn get_rejects_ids_that_escape_the_path() {
        let engine = engine([]);

        let result: Result<Named, _> = engine.get("themes", "1/../2", &CancellationToken::new()).await;

        assert!(matches!(
            result,
            Err(Error::Decode(DecodeError::InvalidValue { .. }))
        ));
        assert!(engine.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn create_returns_server_representation() {
        let engine = engine([json_response(
            200,
            &json!({ "id": "42", "name": "corp", "extra": true }),
        )]);

        let created: Named = engine
            .create("themes", &json!({ "name": "corp" }), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            created,
            Named {
                id: "42".into(),
                name: "corp".into()
            }
        );
        let request = &engine.transport().requests()[0];
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.body, Some(json!({ "name": "corp" })));
    }

    #[tokio::test]
    async fn update_uses_the_resource_method() {
        let engine = engine([
            json_response(200, &json!({ "id": "1", "name": "a" })),
            json_response(200, &json!({ "id": "1", "name": "b" })),
        ]);
        let cancel = CancellationToken::new();

        let _: Named = engine
            .update("themes", "1", UpdateMethod::Patch, &json!({}), &cancel)
            .await
            .unwrap();
        let _: Named = engine
            .update("alerts", "1", UpdateMethod::Put, &json!({}), &cancel)
            .await
            .unwrap();

        let requests = engine.transport().requests();
        assert_eq!(requests[0].method, Method::PATCH);
        assert_eq!(requests[1].method, Method::PUT);
        assert_eq!(requests[1].path, "4.0/alerts/1");
    }

    // ── Delete ───────────────────────────────────────────────────────

    #[tokio::test]
    async fn delete_treats_404_as_success() {
        let engine = engine([RawResponse::new(StatusCode::NOT_FOUND, "")]);

        engine
            .delete("themes", "42", &CancellationToken::new())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn delete_accepts_empty_204() {
        let engine = engine([RawResponse::new(StatusCode::NO_CONTENT, "")]);

        engine
            .delete("themes", "42", &CancellationToken::new())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn delete_surfaces_other_failures() {
        let engine = engine([json_response(409, &json!({ "message": "in use" }))]);

        let result = engine.delete("themes", "42", &CancellationToken::new()).await;

        assert!(matches!(
            result,
            Err(Error::Api(ApiError::Conflict { ref message })) if message == "in use"
        ));
    }

    // ── Error decoding ──────────────────────────────────────────────

    #[test]
    fn validation_errors_keep_field_list() {
        let raw = json_response(
            422,
            &json!({
                "message": "Validation Failed",
                "errors": [{ "field": "name", "code": "invalid", "message": "must be alphanumeric" }],
                "documentation_url": "https://docs.looker.com/"
            }),
        );

        let ApiError::Validation { errors, .. } = parse_error(&raw) else {
            panic!("expected validation error");
        };
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "name");
    }

    #[test]
    fn unstructured_body_falls_back_to_opaque() {
        let raw = RawResponse::new(StatusCode::IM_A_TEAPOT, "<html>nope</html>");

        assert!(matches!(
            parse_error(&raw),
            ApiError::Opaque { status: 418, ref body } if body == "<html>nope</html>"
        ));
    }

    #[test]
    fn structured_body_on_unmapped_status() {
        let raw = json_response(418, &json!({ "message": "short and stout" }));

        assert!(matches!(
            parse_error(&raw),
            ApiError::Status { status: 418, ref message } if message == "short and stout"
        ));
    }

    #[test]
    fn rate_limited_reads_retry_after() {
        let mut raw = RawResponse::new(StatusCode::TOO_MANY_REQUESTS, "");
        raw.headers.insert(RETRY_AFTER, HeaderValue::from_static("5"));

        assert!(matches!(
            parse_error(&raw),
            ApiError::RateLimited {
                retry_after_secs: Some(5)
            }
        ));
    }

    #[test]
    fn server_error_without_body_uses_status_text() {
        let raw = RawResponse::new(StatusCode::BAD_GATEWAY, "");

        assert!(matches!(
            parse_error(&raw),
            ApiError::ServerError { status: 502, ref message } if message.contains("Bad Gateway")
        ));
    }
}
