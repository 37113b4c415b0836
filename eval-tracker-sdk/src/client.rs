//! HTTP client implementation
//!
//! Every call is sent once. Failures, including 429 and 5xx responses,
//! come straight back as [`SdkError`].

use crate::config::{AuthConfig, SdkConfig, API_KEY_HEADER};
use crate::error::{SdkError, SdkResult};
use reqwest::{header, Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::{debug, error};
use url::Url;

/// Header carrying the server-side request id
const REQUEST_ID_HEADER: &str = "x-request-id";

/// The HTTP client for making API requests
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base: Url,
    config: Arc<SdkConfig>,
}

/// Raw request body with its content type
#[derive(Debug, Clone)]
pub struct BinaryBody {
    /// Payload
    pub bytes: Vec<u8>,
    /// Value of the `Content-Type` header
    pub content_type: &'static str,
    /// Extra headers sent with this request only
    pub headers: Vec<(&'static str, String)>,
}

impl HttpClient {
    /// Create a new HTTP client with the given configuration
    pub fn new(config: SdkConfig) -> SdkResult<Self> {
        config.validate()?;
        let base = config.base()?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        for (name, value) in &config.custom_headers {
            let name = header::HeaderName::try_from(name.as_str()).map_err(|e| {
                SdkError::ConfigurationError(format!("Invalid header name {}: {}", name, e))
            })?;
            let value = header::HeaderValue::try_from(value.as_str()).map_err(|e| {
                SdkError::ConfigurationError(format!(
                    "Invalid value for header {}: {}",
                    name.as_str(),
                    e
                ))
            })?;
            headers.insert(name, value);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(SdkError::NetworkError)?;

        Ok(Self {
            client,
            base,
            config: Arc::new(config),
        })
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &SdkConfig {
        &self.config
    }

    /// Endpoint URL for `segments` below the base URL. Each segment is
    /// percent-encoded, so names holding `/` or spaces stay one segment.
    pub fn url(&self, segments: &[&str]) -> SdkResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| {
                SdkError::ConfigurationError(format!(
                    "{} cannot carry resource paths",
                    self.base
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> SdkResult<T> {
        let url = self.url(segments)?;
        let request = self.client.get(url.clone());
        self.execute(Method::GET, &url, request, None).await
    }

    /// Make a POST request with a JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        segments: &[&str],
        body: B,
    ) -> SdkResult<T> {
        self.send_json(Method::POST, segments, &body).await
    }

    /// Make a PUT request with a JSON body
    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        segments: &[&str],
        body: B,
    ) -> SdkResult<T> {
        self.send_json(Method::PUT, segments, &body).await
    }

    /// POST a binary body with query parameters
    pub async fn post_bytes<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        query: &Q,
        body: BinaryBody,
    ) -> SdkResult<T> {
        let url = self.url(segments)?;
        let size = body.bytes.len();
        let content_type = body.content_type;
        let mut request = self
            .client
            .post(url.clone())
            .query(query)
            .header(header::CONTENT_TYPE, body.content_type);
        for (name, value) in body.headers {
            request = request.header(name, value);
        }
        let request = request.body(body.bytes);

        if self.config.enable_logging {
            debug!("Request body: {} bytes of {}", size, content_type);
        }
        self.execute(Method::POST, &url, request, None).await
    }

    async fn send_json<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> SdkResult<T> {
        let url = self.url(segments)?;
        let body = serde_json::to_string(body)?;
        let request = self
            .client
            .request(method.clone(), url.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.clone());
        self.execute(method, &url, request, Some(body)).await
    }

    /// Send `request` once and decode a JSON response
    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &Url,
        request: RequestBuilder,
        body: Option<String>,
    ) -> SdkResult<T> {
        let path = url.path();
        if self.config.enable_logging {
            debug!("Request: {} {}", method, url);
            if let Some(ref body) = body {
                debug!("Request body: {}", body);
            }
        }

        let response = self.add_auth(request).send().await.map_err(|e| {
            error!("Request {} {} failed: {}", method, path, e);
            if e.is_timeout() {
                SdkError::Timeout(self.config.timeout.as_secs())
            } else {
                SdkError::NetworkError(e)
            }
        })?;

        self.decode(path, response).await
    }

    async fn decode<T: DeserializeOwned>(&self, path: &str, response: Response) -> SdkResult<T> {
        let status = response.status();
        let request_id = response
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let retry_after = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        let text = response.text().await.map_err(SdkError::NetworkError)?;

        if self.config.enable_logging {
            debug!("Response {}: {}", status, text);
        }

        if status.is_success() {
            serde_json::from_str(&text).map_err(SdkError::SerializationError)
        } else {
            Err(self.handle_error_response(path, status, &text, request_id, retry_after))
        }
    }

    /// Add authentication to a request
    fn add_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.auth {
            AuthConfig::None => request,
            AuthConfig::ApiKey(key) => request.header(API_KEY_HEADER, key.as_str()),
            AuthConfig::BearerToken(token) => request.bearer_auth(token),
            AuthConfig::Basic { username, password } => request.basic_auth(username, Some(password)),
        }
    }

    /// Handle an error response
    fn handle_error_response(
        &self,
        path: &str,
        status: StatusCode,
        body: &str,
        request_id: Option<String>,
        retry_after: Option<u64>,
    ) -> SdkError {
        match status {
            StatusCode::UNAUTHORIZED if body.is_empty() => {
                SdkError::AuthenticationError("Invalid or missing authentication".to_string())
            }
            StatusCode::FORBIDDEN if body.is_empty() => {
                SdkError::AuthorizationError("Access denied".to_string())
            }
            StatusCode::NOT_FOUND if body.is_empty() => SdkError::NotFound(path.to_string()),
            StatusCode::TOO_MANY_REQUESTS => SdkError::RateLimited { retry_after },
            _ => SdkError::from_response(status.as_u16(), body, request_id),
        }
    }
}
