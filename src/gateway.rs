use crate::errors::ClientError;
use crate::navigation::Navigator;
use crate::notify::Notifications;
use crate::storage::Session;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client as HttpClient, Method, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, warn};

/// Paths below this prefix may be called without a credential.
pub const AUTH_PREFIX: &str = "/auth/";

pub fn is_auth_path(path: &str) -> bool {
    path.starts_with(AUTH_PREFIX)
}

/// One call to the remote API, relative to the configured API root.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub path: String,
    pub method: Method,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            body: None,
            headers: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Serializing plain data structs to a JSON value cannot fail; anything
    /// that does is sent without a body.
    pub fn json(mut self, body: &impl Serialize) -> Self {
        match serde_json::to_value(body) {
            Ok(value) => self.body = Some(value),
            Err(err) => error!(path = %self.path, "dropping unserializable body: {err}"),
        }
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Result of a gateway call. Failures have already been reported to the user
/// by the time a caller sees `Failed`.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Decoded(Value),
    Acknowledged,
    Failed,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed)
    }

    /// Typed view of a decoded body. `Acknowledged`, `Failed` and bodies of
    /// the wrong shape all give `None`.
    pub fn decode<T: DeserializeOwned>(self) -> Option<T> {
        match self {
            Self::Decoded(value) => match serde_json::from_value(value) {
                Ok(decoded) => Some(decoded),
                Err(err) => {
                    warn!("unexpected response shape: {err}");
                    None
                }
            },
            _ => None,
        }
    }
}

/// Single entry point to the remote API: attaches the stored credential,
/// classifies the response and turns every failure into its user-facing
/// side effect (notification or redirect to login).
#[derive(Clone)]
pub struct Gateway {
    api_root: String,
    http: HttpClient,
    session: Session,
    notifications: Notifications,
    navigator: Navigator,
}

impl Gateway {
    pub fn new(
        api_root: &str,
        session: Session,
        notifications: Notifications,
        navigator: Navigator,
    ) -> Self {
        Self {
            api_root: api_root.trim_end_matches('/').to_string(),
            http: HttpClient::new(),
            session,
            notifications,
            navigator,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub async fn call(&self, request: ApiRequest) -> Outcome {
        match self.dispatch(&request).await {
            Ok(outcome) => outcome,
            Err(err) => {
                self.report(&request, err).await;
                Outcome::Failed
            }
        }
    }

    /// Routes a failure to its side effect. Also used by coordinators for
    /// client-side failures such as a malformed import file.
    pub async fn report_error(&self, err: ClientError) {
        match err {
            ClientError::Unauthenticated => {
                if let Err(err) = self.session.clear_token().await {
                    error!("could not clear credential: {err}");
                }
                self.navigator.redirect_to_login().await;
            }
            other => {
                if let Some(text) = other.user_message() {
                    self.notifications.error(text).await;
                }
            }
        }
    }

    async fn report(&self, request: &ApiRequest, err: ClientError) {
        warn!(method = %request.method, path = %request.path, "api call failed: {err}");
        self.report_error(err).await;
    }

    async fn dispatch(&self, request: &ApiRequest) -> Result<Outcome, ClientError> {
        let token = self.session.token().await?;
        if token.is_none() && !is_auth_path(&request.path) {
            return Err(ClientError::Unauthenticated);
        }

        let headers = build_headers(token.as_deref(), &request.headers)?;
        let url = format!("{}{}", self.api_root, request.path);
        debug!(method = %request.method, %url, "dispatching api call");

        let mut builder = self
            .http
            .request(request.method.clone(), url)
            .headers(headers);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        classify(response).await
    }
}

/// Default JSON content type, then the bearer credential, then caller
/// overrides. Later entries replace earlier ones with the same name.
pub fn build_headers(
    token: Option<&str>,
    overrides: &[(String, String)],
) -> Result<HeaderMap, ClientError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    if let Some(token) = token {
        let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(ClientError::network)?;
        headers.insert(AUTHORIZATION, value);
    }

    for (name, value) in overrides {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(ClientError::network)?;
        let value = HeaderValue::from_str(value).map_err(ClientError::network)?;
        headers.insert(name, value);
    }

    Ok(headers)
}

async fn classify(response: Response) -> Result<Outcome, ClientError> {
    let status = response.status();

    if status == StatusCode::UNAUTHORIZED {
        return Err(ClientError::Unauthenticated);
    }

    if !status.is_success() {
        let message = if status == StatusCode::NO_CONTENT {
            None
        } else {
            error_message(response).await
        };
        return Err(ClientError::Server {
            status: status.as_u16(),
            message,
        });
    }

    if status == StatusCode::NO_CONTENT {
        return Ok(Outcome::Acknowledged);
    }

    if is_json(&response) {
        let value = response.json::<Value>().await?;
        return Ok(Outcome::Decoded(value));
    }

    Ok(Outcome::Acknowledged)
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("application/json"))
}

async fn error_message(response: Response) -> Option<String> {
    let body = response.text().await.ok()?;
    let value: Value = serde_json::from_str(&body).ok()?;
    message_from_body(&value)
}

/// Human readable message from an error body: a bare JSON string or a
/// `message` / `error` field.
pub fn message_from_body(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(text) => Some(text.as_str()),
        Value::Object(fields) => ["message", "error"]
            .iter()
            .find_map(|key| fields.get(*key).and_then(Value::as_str)),
        _ => None,
    }?;

    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
