use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::auth::{AuthInterceptor, RequestInterceptor};
use super::error::{translate, ApiError, RawFailure};
use crate::{ApiConfig, PersonaError, PersonaResult};

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Authenticated JSON client for the Personas API.
///
/// Every call resolves its URL through [`ApiConfig`], sends the configured headers, runs the
/// interceptor chain, and bounds each attempt with the configured timeout. Failed attempts are
/// re-issued unchanged up to `retries` more times, back to back. Whatever failure remains is
/// translated into an [`ApiError`].
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: Arc<ApiConfig>,
    interceptors: Vec<Arc<dyn RequestInterceptor>>,
}

impl ApiClient {
    /// Build a client with the bearer-token interceptor installed.
    pub fn new(config: Arc<ApiConfig>) -> PersonaResult<Self> {
        config.warn_if_incomplete();

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| PersonaError::Configuration(format!("HTTP client: {}", e)))?;

        let auth: Arc<dyn RequestInterceptor> = Arc::new(AuthInterceptor::new(&config));
        Ok(Self {
            http,
            config,
            interceptors: vec![auth],
        })
    }

    /// Append an interceptor; it runs after the ones already installed.
    pub fn with_interceptor(mut self, interceptor: impl RequestInterceptor + 'static) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> ApiResult<T> {
        self.send(Method::GET, endpoint, query, None).await
    }

    pub async fn post<B, T>(&self, endpoint: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = self.encode(&Method::POST, endpoint, body)?;
        self.send(Method::POST, endpoint, &[], Some(body)).await
    }

    pub async fn put<B, T>(&self, endpoint: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = self.encode(&Method::PUT, endpoint, body)?;
        self.send(Method::PUT, endpoint, &[], Some(body)).await
    }

    /// An empty response body decodes as JSON `null`, so `T = ()` suits most deletes.
    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<T> {
        self.send(Method::DELETE, endpoint, &[], None).await
    }

    /// Probe the API's `health-check` endpoint.
    pub async fn test_connection(&self) -> ApiResult<Value> {
        self.get("health-check", &[]).await.map_err(|err| {
            warn!(error = %err, "API connection check failed");
            err
        })
    }

    fn encode<B: Serialize + ?Sized>(
        &self,
        method: &Method,
        endpoint: &str,
        body: &B,
    ) -> ApiResult<Vec<u8>> {
        serde_json::to_vec(body).map_err(|e| {
            translate(&RawFailure::Decode {
                method: method.to_string(),
                url: self.config.api_url(endpoint),
                detail: format!("request body: {}", e),
            })
        })
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, &str)],
        body: Option<Vec<u8>>,
    ) -> ApiResult<T> {
        let url = self.config.api_url(endpoint);
        let attempts = self.config.retries() + 1;
        let mut attempt = 1;

        loop {
            let outcome = self
                .attempt(&method, &url, query, body.as_deref())
                .await
                .and_then(|bytes| decode(&method, &url, &bytes));

            match outcome {
                Ok(value) => return Ok(value),
                Err(failure) if failure.is_retryable() && attempt < attempts => {
                    warn!(attempt, attempts, "{}; retrying", failure);
                    attempt += 1;
                }
                Err(failure) => return Err(translate(&failure)),
            }
        }
    }

    async fn attempt(
        &self,
        method: &Method,
        url: &str,
        query: &[(&str, &str)],
        body: Option<&[u8]>,
    ) -> Result<Vec<u8>, RawFailure> {
        let connectivity = |detail: String| RawFailure::Connectivity {
            method: method.to_string(),
            url: url.to_string(),
            detail,
        };

        let mut builder = self
            .http
            .request(method.clone(), url)
            .headers(self.config.auth_headers());
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.body(body.to_vec());
        }

        let request = builder.build().map_err(|e| connectivity(e.to_string()))?;
        let request = self
            .interceptors
            .iter()
            .fold(request, |request, interceptor| interceptor.intercept(request));

        debug!(method = %method, url = %request.url(), "sending API request");

        let exchange = async {
            let response = self.http.execute(request).await?;
            let status = response.status();
            let bytes = response.bytes().await?;
            Ok::<(StatusCode, Vec<u8>), reqwest::Error>((status, bytes.to_vec()))
        };

        let (status, bytes) = match tokio::time::timeout(self.config.timeout(), exchange).await {
            Err(_) => {
                return Err(RawFailure::Timeout {
                    method: method.to_string(),
                    url: url.to_string(),
                    after: self.config.timeout(),
                })
            }
            Ok(Err(e)) => return Err(connectivity(e.to_string())),
            Ok(Ok(exchange)) => exchange,
        };

        if !status.is_success() {
            return Err(RawFailure::Status {
                method: method.to_string(),
                url: url.to_string(),
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        Ok(bytes)
    }
}

fn decode<T: DeserializeOwned>(method: &Method, url: &str, bytes: &[u8]) -> Result<T, RawFailure> {
    let payload = if bytes.iter().all(u8::is_ascii_whitespace) {
        b"null".as_slice()
    } else {
        bytes
    };

    serde_json::from_slice(payload).map_err(|e| RawFailure::Decode {
        method: method.to_string(),
        url: url.to_string(),
        detail: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Ping {
        ok: bool,
    }

    #[test]
    fn empty_body_decodes_as_null() {
        decode::<()>(&Method::DELETE, "u", b"").unwrap();
        let nothing: Option<Ping> = decode(&Method::DELETE, "u", b"  \n").unwrap();
        assert!(nothing.is_none());
    }

    #[test]
    fn malformed_body_is_a_decode_failure() {
        let err = decode::<Ping>(&Method::GET, "u", b"{\"ok\":").unwrap_err();
        assert!(matches!(err, RawFailure::Decode { .. }));
        assert!(!err.is_retryable());
    }

    #[test]
    fn decodes_json_payload() {
        let ping: Ping = decode(&Method::GET, "u", br#"{"ok":true}"#).unwrap();
        assert_eq!(ping, Ping { ok: true });
    }
}
