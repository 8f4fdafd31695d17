use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Request, Url};
use tracing::trace;
use url::Origin;

use crate::ApiConfig;

/// Hook run on every outbound request just before it is sent.
///
/// Interceptors own the request they receive, so the caller's value can never be observed
/// changing underneath it. They must not retry or keep state between calls.
pub trait RequestInterceptor: Send + Sync {
    fn intercept(&self, request: Request) -> Request;
}

/// Injects the bearer token into requests addressed to the configured API origin.
pub struct AuthInterceptor {
    origin: Option<Origin>,
    authorization: Option<HeaderValue>,
}

impl AuthInterceptor {
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            origin: config.base().map(|base| base.origin()),
            authorization: config.authorization_value(),
        }
    }

    /// Whether `url` shares scheme, host and port with the API base URL.
    pub fn applies_to(&self, url: &Url) -> bool {
        match &self.origin {
            Some(origin) => origin.is_tuple() && *origin == url.origin(),
            None => false,
        }
    }
}

impl RequestInterceptor for AuthInterceptor {
    /// Sets the auth and JSON headers on the owned request and hands it back. Method, URL, body,
    /// timeout and any other headers are carried over unchanged.
    fn intercept(&self, mut request: Request) -> Request {
        if !self.applies_to(request.url()) {
            return request;
        }

        trace!(url = %request.url(), "attaching API credentials");
        let headers = request.headers_mut();
        if let Some(authorization) = &self.authorization {
            headers.insert(AUTHORIZATION, authorization.clone());
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Method;
    use std::time::Duration;

    fn interceptor() -> AuthInterceptor {
        AuthInterceptor::new(&ApiConfig::new("https://localhost:7163/api", "s3cr3t-token"))
    }

    fn request(url: &str) -> Request {
        Request::new(Method::GET, Url::parse(url).unwrap())
    }

    #[test]
    fn authenticates_requests_to_api_origin() {
        let request = interceptor().intercept(request("https://localhost:7163/api/Personas"));

        assert_eq!(request.headers()[AUTHORIZATION], "Bearer s3cr3t-token");
        assert_eq!(request.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(request.headers()[ACCEPT], "application/json");
    }

    #[test]
    fn other_origins_pass_through_untouched() {
        let interceptor = interceptor();
        for url in [
            "https://example.com/api/Personas",
            "http://localhost:7163/api/Personas",
            "https://localhost:8080/api/Personas",
        ] {
            let request = interceptor.intercept(request(url));
            assert!(request.headers().is_empty(), "{} should not be touched", url);
        }
    }

    #[test]
    fn keeps_method_url_and_existing_headers() {
        let mut original = Request::new(
            Method::PUT,
            Url::parse("https://localhost:7163/api/Personas/3").unwrap(),
        );
        original
            .headers_mut()
            .insert("x-request-id", HeaderValue::from_static("abc"));
        *original.timeout_mut() = Some(Duration::from_secs(5));
        *original.body_mut() = Some(r#"{"nombre":"Ana"}"#.into());

        let request = interceptor().intercept(original);

        assert_eq!(*request.method(), Method::PUT);
        assert_eq!(request.url().path(), "/api/Personas/3");
        assert_eq!(request.headers()["x-request-id"], "abc");
        assert_eq!(request.timeout(), Some(&Duration::from_secs(5)));
        assert_eq!(
            request.body().and_then(|body| body.as_bytes()),
            Some(br#"{"nombre":"Ana"}"#.as_slice())
        );
        assert!(request.headers().contains_key(AUTHORIZATION));
    }

    #[test]
    fn unconfigured_base_url_authenticates_nothing() {
        let interceptor = AuthInterceptor::new(&ApiConfig::new("", "token"));
        assert!(!interceptor.applies_to(&Url::parse("https://localhost:7163/api").unwrap()));
    }
}
