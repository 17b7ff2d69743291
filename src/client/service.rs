//! Generic authenticated request dispatch.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;
use reqwest::Method;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};

use crate::identity::Identity;
use crate::{Error, Result};

/// Header carrying the bearer token on every authenticated call.
pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// The default decode result: a generic JSON object.
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

/// Per-call options shared by every verb.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    headers: Vec<(String, String)>,
    error_message: Option<String>,
    raise_on_error: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            headers: Vec::new(),
            error_message: None,
            raise_on_error: true,
        }
    }
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header. Caller headers win over the injected defaults on key
    /// conflict.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Message attached verbatim to the [`Error::Api`] raised on a >= 400
    /// status.
    pub fn error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    /// Do not raise on a >= 400 status. The JSON verbs then decode the error
    /// envelope like a success body; [`ServiceClient::send`] hands back the
    /// raw response for callers that need full control.
    pub fn allow_error_status(mut self) -> Self {
        self.raise_on_error = false;
        self
    }

    pub fn raises_on_error(&self) -> bool {
        self.raise_on_error
    }
}

/// Request body for verbs that carry one.
#[derive(Debug, Clone)]
pub enum Body {
    /// No body.
    None,
    /// Serialized to JSON before sending.
    Json(serde_json::Value),
    /// Sent unmodified with the given content type (object-storage uploads).
    Raw { bytes: Bytes, content_type: String },
}

impl Body {
    pub fn json(value: serde_json::Value) -> Self {
        Body::Json(value)
    }

    pub fn raw(bytes: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Body::Raw {
            bytes: bytes.into(),
            content_type: content_type.into(),
        }
    }
}

/// Dispatcher bound to one resolved service base URL.
///
/// All verbs share one implementation: inject `Accept` and the auth token,
/// merge caller headers, classify the status, decode JSON. Failure shape is
/// identical across verbs.
pub struct ServiceClient {
    identity: Arc<Identity>,
    http: reqwest::Client,
    base_url: String,
}

impl ServiceClient {
    pub(crate) fn new(identity: Arc<Identity>, http: reqwest::Client, base_url: String) -> Self {
        Self {
            identity,
            http,
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get(&self, path: &str, options: RequestOptions) -> Result<JsonObject> {
        self.request(Method::GET, path, options, Body::None).await
    }

    pub async fn post(
        &self,
        path: &str,
        body: Body,
        options: RequestOptions,
    ) -> Result<JsonObject> {
        self.request(Method::POST, path, options, body).await
    }

    pub async fn put(&self, path: &str, body: Body, options: RequestOptions) -> Result<JsonObject> {
        self.request(Method::PUT, path, options, body).await
    }

    pub async fn delete(&self, path: &str, options: RequestOptions) -> Result<JsonObject> {
        self.request(Method::DELETE, path, options, Body::None).await
    }

    /// Response headers as a map; the body is discarded.
    ///
    /// Object storage reports container/object metadata this way.
    pub async fn get_headers(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<HashMap<String, String>> {
        let response = self.send(Method::GET, path, options, Body::None).await?;
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        Ok(headers)
    }

    /// Stream a download, invoking `sink` for each chunk in arrival order.
    ///
    /// A sink error aborts the transfer and surfaces as [`Error::Stream`].
    pub async fn get_stream<F>(&self, path: &str, options: RequestOptions, mut sink: F) -> Result<()>
    where
        F: FnMut(Bytes) -> std::io::Result<()> + Send,
    {
        let response = self.send(Method::GET, path, options, Body::None).await?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(Error::Network)?;
            sink(chunk).map_err(|e| Error::Stream(format!("chunk handler aborted: {e}")))?;
        }
        Ok(())
    }

    /// Dispatch and hand back the raw response.
    ///
    /// With `options.allow_error_status()` a >= 400 status is not an error
    /// here; the caller interprets the response. Transport failures still
    /// surface as [`Error::Network`].
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
        body: Body,
    ) -> Result<reqwest::Response> {
        if !path.starts_with('/') {
            return Err(Error::validation(format!(
                "request path `{path}` must begin with `/`"
            )));
        }

        let token = self.identity.ensure_token().await?;
        let url = format!("{}{}", self.base_url, path);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTH_TOKEN_HEADER,
            HeaderValue::from_str(&token)
                .map_err(|_| Error::validation("token is not a valid header value"))?,
        );
        if let Body::Raw { content_type, .. } = &body {
            headers.insert(
                CONTENT_TYPE,
                HeaderValue::from_str(content_type)
                    .map_err(|_| Error::validation(format!("invalid content type `{content_type}`")))?,
            );
        }
        for (name, value) in &options.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| Error::validation(format!("invalid header name `{name}`")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| Error::validation(format!("invalid header value for `{name:?}`")))?;
            headers.insert(name, value);
        }

        let request = self.http.request(method.clone(), &url).headers(headers);
        let request = match body {
            Body::None => request,
            Body::Json(value) => request.json(&value),
            Body::Raw { bytes, .. } => request.body(bytes),
        };

        tracing::debug!(%method, %url, "dispatching request");
        let response = request.send().await?;

        let status = response.status().as_u16();
        if status >= 400 && options.raise_on_error {
            let message = options
                .error_message
                .clone()
                .unwrap_or_else(|| format!("{method} {path} failed"));
            tracing::debug!(status, %url, "request failed");
            return Err(Error::api(message, Some(status)));
        }

        Ok(response)
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
        body: Body,
    ) -> Result<JsonObject> {
        let response = self.send(method, path, options, body).await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            // DELETE and some PUT paths answer 204 with no body.
            return Ok(JsonObject::new());
        }
        match serde_json::from_slice::<serde_json::Value>(&bytes)? {
            serde_json::Value::Object(map) => Ok(map),
            _ => Err(Error::api(
                "response body is not a JSON object",
                Some(status),
            )),
        }
    }
}

impl std::fmt::Debug for ServiceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
