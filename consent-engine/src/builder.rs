use std::marker::PhantomData;
use std::time::Duration;

use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue};
use url::Url;

use crate::client::ConsentClient;
use crate::error::ConsentError;

/// Marker types to track whether the consent service URL has been provided.
pub struct Missing;
pub struct Present;

/// A builder for configuring a [`ConsentClient`].
/// The builder is generic over one type parameter:
/// - UrlSet: whether the consent service base URL has been supplied.
pub struct ConsentClientBuilder<UrlSet> {
    pub(crate) base_url: Option<Url>,
    pub(crate) accept_language: String,
    pub(crate) timeout: Option<Duration>,
    pub(crate) connect_timeout: Duration,
    pub(crate) default_headers: HeaderMap,
    _url: PhantomData<UrlSet>,
}

impl ConsentClientBuilder<Missing> {
    /// Creates a new builder with no base URL and English as the request language.
    pub fn new() -> Self {
        Self {
            base_url: None,
            accept_language: "en".to_string(),
            timeout: None,
            connect_timeout: Duration::from_secs(5),
            default_headers: HeaderMap::new(),
            _url: PhantomData,
        }
    }

    /// Sets the base URL of the consent service. A trailing slash is added when
    /// missing so the endpoint paths resolve below it.
    pub fn with_base_url(self, base_url: &str) -> Result<ConsentClientBuilder<Present>, ConsentError> {
        let mut url = Url::parse(base_url)?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(ConsentClientBuilder {
            base_url: Some(url),
            accept_language: self.accept_language,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            default_headers: self.default_headers,
            _url: PhantomData,
        })
    }
}

impl Default for ConsentClientBuilder<Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<UrlSet> ConsentClientBuilder<UrlSet> {
    /// Sets the `Accept-Language` sent with every call, used by the service to localize `msg`.
    pub fn with_accept_language(mut self, language: impl Into<String>) -> Self {
        self.accept_language = language.into();
        self
    }

    /// Sets a total per-request timeout. Without one, calls wait until the
    /// service answers or the connection fails.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Headers sent on every call, e.g. a service credential.
    pub fn with_default_headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers = headers;
        self
    }
}

impl ConsentClientBuilder<Present> {
    /// Builds the HTTP client.
    pub fn build(self) -> Result<ConsentClient, ConsentError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ConsentError::InvalidRequest("Consent service URL not provided".to_string()))?;
        let accept_language = HeaderValue::from_str(&self.accept_language).map_err(|e| {
            ConsentError::InvalidRequest(format!("Invalid Accept-Language value: {}", e))
        })?;

        let mut builder = Client::builder()
            .connect_timeout(self.connect_timeout)
            .default_headers(self.default_headers);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(ConsentClient {
            client: builder.build()?,
            base_url,
            accept_language,
            forwarded_headers: HeaderMap::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client = ConsentClientBuilder::new()
            .with_base_url("http://localhost:8000/casdoor")
            .expect("url should parse")
            .build()
            .expect("client should build");
        assert_eq!(client.base_url().as_str(), "http://localhost:8000/casdoor/");
        assert_eq!(
            client
                .base_url()
                .join(crate::client::GRANT_CONSENT_ENDPOINT)
                .expect("join should work")
                .as_str(),
            "http://localhost:8000/casdoor/api/grant-consent"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let result = ConsentClientBuilder::new().with_base_url("not a url");
        assert!(matches!(result, Err(ConsentError::UrlParse(_))));
    }

    #[test]
    fn test_invalid_accept_language() {
        let result = ConsentClientBuilder::new()
            .with_accept_language("en\nX-Injected: 1")
            .with_base_url("http://localhost:8000/")
            .expect("url should parse")
            .build();
        assert!(matches!(result, Err(ConsentError::InvalidRequest(_))));
    }
}
