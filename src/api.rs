//! API client for the events/auth backend
//!
//! Uses web-sys fetch for WASM, reqwest for native. Bodies are read as text
//! and decoded with serde_json so that both targets share one decoding path.
//! Non-2xx responses surface the server's `error` field when it sent one.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use hub_nav::{ApiConfig, FetchError};
use hub_types::{
    api_error_message, parse_event_list, AuthRequest, AuthResponse, EventDraft, EventId,
    EventSummary, MeResponse, SavedEvent,
};

use crate::tasks::{FetchResult, RequestScope};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Method {
    Get,
    Post,
    Put,
}

impl Method {
    fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
        }
    }
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    paths: ApiConfig,
    #[cfg(not(target_arch = "wasm32"))]
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str, paths: ApiConfig) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            paths,
            #[cfg(not(target_arch = "wasm32"))]
            http: reqwest::Client::new(),
        }
    }

    /// `GET /api/events`
    pub async fn list_events(&self, scope: &RequestScope) -> FetchResult<Vec<EventSummary>> {
        let body = self
            .send(scope, Method::Get, &self.paths.events_path, None, None)
            .await?;
        Ok(parse_event_list(body)?)
    }

    /// `POST /api/auth/login`
    pub async fn login(
        &self,
        scope: &RequestScope,
        request: &AuthRequest,
    ) -> FetchResult<AuthResponse> {
        self.post(scope, &self.paths.login_path, request).await
    }

    /// `POST /api/auth/register`
    pub async fn register(
        &self,
        scope: &RequestScope,
        request: &AuthRequest,
    ) -> FetchResult<AuthResponse> {
        self.post(scope, &self.paths.register_path, request).await
    }

    /// `GET /api/auth/me`
    pub async fn me(&self, scope: &RequestScope, token: &str) -> FetchResult<MeResponse> {
        let body = self
            .send(scope, Method::Get, &self.paths.me_path, Some(token), None)
            .await?;
        decode(body)
    }

    /// `GET /api/saved-events`
    pub async fn saved_events(
        &self,
        scope: &RequestScope,
        token: &str,
    ) -> FetchResult<Vec<SavedEvent>> {
        let body = self
            .send(
                scope,
                Method::Get,
                &self.paths.saved_events_path,
                Some(token),
                None,
            )
            .await?;
        match body {
            Value::Null => Ok(Vec::new()),
            other => decode(other),
        }
    }

    /// `POST /api/events`. The server echoes the stored event.
    pub async fn create_event(
        &self,
        scope: &RequestScope,
        token: &str,
        draft: &EventDraft,
    ) -> FetchResult<Value> {
        let body = encode(draft)?;
        self.send(scope, Method::Post, &self.paths.events_path, Some(token), Some(body))
            .await
    }

    /// `PUT /api/events/{id}`
    pub async fn update_event(
        &self,
        scope: &RequestScope,
        token: &str,
        event_id: EventId,
        draft: &EventDraft,
    ) -> FetchResult<Value> {
        let path = self.event_path(event_id);
        let body = encode(draft)?;
        self.send(scope, Method::Put, &path, Some(token), Some(body))
            .await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        scope: &RequestScope,
        path: &str,
        body: &B,
    ) -> FetchResult<T> {
        let response = self
            .send(scope, Method::Post, path, None, Some(encode(body)?))
            .await?;
        decode(response)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn event_path(&self, event_id: EventId) -> String {
        format!("{}/{}", self.paths.events_path.trim_end_matches('/'), event_id)
    }

    #[cfg(target_arch = "wasm32")]
    async fn send(
        &self,
        scope: &RequestScope,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<String>,
    ) -> FetchResult<Value> {
        use wasm_bindgen::{JsCast, JsValue};
        use wasm_bindgen_futures::JsFuture;
        use web_sys::{Headers, Request, RequestInit, RequestMode, Response};

        tracing::debug!("api: {} {}", method.as_str(), path);
        let js_err = |e: JsValue| FetchError::Transport(format!("{:?}", e));

        let headers = Headers::new().map_err(js_err)?;
        headers.set("Accept", "application/json").map_err(js_err)?;
        if let Some(token) = token {
            headers
                .set("Authorization", &format!("Bearer {token}"))
                .map_err(js_err)?;
        }

        let opts = RequestInit::new();
        opts.set_method(method.as_str());
        opts.set_mode(RequestMode::Cors);
        if let Some(body) = &body {
            headers.set("Content-Type", "application/json").map_err(js_err)?;
            opts.set_body(&JsValue::from_str(body));
        }
        opts.set_headers(&headers);
        opts.set_signal(scope.signal());

        let request = Request::new_with_str_and_init(&self.url(path), &opts).map_err(js_err)?;
        let window = web_sys::window().ok_or_else(|| FetchError::Transport("no window".into()))?;

        let resp_value = match JsFuture::from(window.fetch_with_request(&request)).await {
            Ok(value) => value,
            Err(_) if scope.is_aborted() => return Err(FetchError::Aborted),
            Err(e) => return Err(js_err(e)),
        };
        let resp: Response = resp_value
            .dyn_into()
            .map_err(|_| FetchError::Payload("response is not a Response".into()))?;

        let text = match JsFuture::from(resp.text().map_err(js_err)?).await {
            Ok(text) => text.as_string().unwrap_or_default(),
            Err(_) if scope.is_aborted() => return Err(FetchError::Aborted),
            Err(e) => return Err(js_err(e)),
        };

        interpret(resp.status(), &text)
    }

    #[cfg(not(target_arch = "wasm32"))]
    async fn send(
        &self,
        _scope: &RequestScope,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<String>,
    ) -> FetchResult<Value> {
        tracing::debug!("api: {} {}", method.as_str(), path);
        let method = match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
        };
        let mut request = self
            .http
            .request(method, self.url(path))
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        interpret(status, &text)
    }
}

/// Turn a status and body into JSON or a [`FetchError`].
fn interpret(status: u16, text: &str) -> FetchResult<Value> {
    let parsed = if text.trim().is_empty() {
        Ok(Value::Null)
    } else {
        serde_json::from_str::<Value>(text)
    };

    if !(200..300).contains(&status) {
        let message = parsed.ok().as_ref().and_then(api_error_message);
        tracing::warn!("api: HTTP {} ({:?})", status, message);
        return Err(FetchError::status(status, message));
    }
    parsed.map_err(|e| FetchError::Payload(e.to_string()))
}

fn encode<B: Serialize>(body: &B) -> FetchResult<String> {
    serde_json::to_string(body).map_err(|e| FetchError::Payload(e.to_string()))
}

fn decode<T: DeserializeOwned>(value: Value) -> FetchResult<T> {
    serde_json::from_value(value).map_err(|e| FetchError::Payload(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpret_success_and_empty_body() {
        assert_eq!(interpret(200, r#"[{"id":1}]"#).unwrap()[0]["id"], 1);
        assert_eq!(interpret(204, "").unwrap(), Value::Null);
    }

    #[test]
    fn interpret_surfaces_server_error_message() {
        let err = interpret(401, r#"{"error":"Invalid credentials"}"#).unwrap_err();
        assert_eq!(err, FetchError::status(401, Some("Invalid credentials".into())));
        assert_eq!(err.to_string(), "Invalid credentials");

        let err = interpret(500, "<html>oops</html>").unwrap_err();
        assert_eq!(err.to_string(), "HTTP 500");
    }

    #[test]
    fn interpret_rejects_malformed_success_body() {
        assert!(matches!(
            interpret(200, "not json"),
            Err(FetchError::Payload(_))
        ));
    }

    #[test]
    fn urls_join_base_and_path() {
        let client = ApiClient::new("http://localhost:3000/", ApiConfig::default());
        assert_eq!(client.url("/api/events"), "http://localhost:3000/api/events");

        let same_origin = ApiClient::new("", ApiConfig::default());
        assert_eq!(same_origin.url("/api/auth/me"), "/api/auth/me");
    }

    #[test]
    fn update_targets_the_event_path() {
        let client = ApiClient::new("http://localhost:3000", ApiConfig::default());
        assert_eq!(client.event_path(42), "/api/events/42");
        assert_eq!(
            client.url(&client.event_path(42)),
            "http://localhost:3000/api/events/42"
        );
        assert_eq!(Method::Put.as_str(), "PUT");
    }
}
