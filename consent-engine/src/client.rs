//! HTTP client for the external consent service

use crate::error::ConsentError;
use crate::models::{ConsentRecord, GrantRequest, ServiceResponse};
use async_trait::async_trait;
use log::{debug, error};
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder};
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;
use url::Url;

pub const GRANT_CONSENT_ENDPOINT: &str = "api/grant-consent";
pub const REVOKE_CONSENT_ENDPOINT: &str = "api/revoke-consent";

/// The two state-changing operations of the consent service
#[async_trait]
pub trait ConsentService: Send + Sync {
    /// Records the grant and returns the authorization code in `data`
    async fn grant_consent(
        &self,
        request: &GrantRequest,
    ) -> Result<ServiceResponse<String>, ConsentError>;

    /// Removes `record.granted_scopes` from the stored consent of `record.application`
    async fn revoke_consent(&self, record: &ConsentRecord)
    -> Result<ServiceResponse, ConsentError>;
}

#[async_trait]
impl<T: ConsentService + ?Sized> ConsentService for Arc<T> {
    async fn grant_consent(
        &self,
        request: &GrantRequest,
    ) -> Result<ServiceResponse<String>, ConsentError> {
        (**self).grant_consent(request).await
    }

    async fn revoke_consent(
        &self,
        record: &ConsentRecord,
    ) -> Result<ServiceResponse, ConsentError> {
        (**self).revoke_consent(record).await
    }
}

/// `ConsentClient` talks to the consent service over HTTP.
/// Build one with [`crate::builder::ConsentClientBuilder`].
#[derive(Clone)]
pub struct ConsentClient {
    pub(crate) client: Client,
    pub(crate) base_url: Url,
    pub(crate) accept_language: HeaderValue,
    pub(crate) forwarded_headers: HeaderMap,
}

impl std::fmt::Debug for ConsentClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsentClient")
            .field("base_url", &self.base_url)
            .field("accept_language", &self.accept_language)
            // Forwarded headers carry the user's session cookie
            .finish_non_exhaustive()
    }
}

impl ConsentClient {
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns a client that sends `headers` on every call in addition to its defaults.
    ///
    /// The consent service identifies the user from the session cookie, so a server
    /// acting on behalf of a browser forwards the browser's `Cookie` header here.
    /// An `Accept-Language` header in `headers` overrides the configured one.
    pub fn forwarding(&self, mut headers: HeaderMap) -> ConsentClient {
        let mut client = self.clone();
        if let Some(language) = headers.remove(ACCEPT_LANGUAGE) {
            client.accept_language = language;
        }
        client.forwarded_headers = headers;
        client
    }

    fn post<T>(&self, endpoint: &str, payload: &T) -> Result<RequestBuilder, ConsentError>
    where
        T: Serialize + ?Sized,
    {
        let url = self.base_url.join(endpoint)?;
        Ok(self
            .client
            .post(url)
            .headers(self.forwarded_headers.clone())
            .header(ACCEPT_LANGUAGE, self.accept_language.clone())
            .json(payload))
    }

    async fn send<R>(&self, request: RequestBuilder) -> Result<R, ConsentError>
    where
        R: DeserializeOwned,
    {
        let response = request.send().await.map_err(|e| {
            error!("Consent service request failed: {}", e);
            ConsentError::RequestFailed(e.to_string())
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("Consent service error {}: {}", status, error_text);
            return Err(ConsentError::ResponseError(
                status.as_u16(),
                format!("Request failed with status: {}", status),
            ));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| ConsentError::DeserializationError(e.to_string()))
    }
}

#[async_trait]
impl ConsentService for ConsentClient {
    async fn grant_consent(
        &self,
        request: &GrantRequest,
    ) -> Result<ServiceResponse<String>, ConsentError> {
        debug!(
            "Granting scopes {:?} to application '{}'",
            request.granted_scopes, request.application
        );
        let builder = self.post(GRANT_CONSENT_ENDPOINT, request)?;
        self.send(builder).await
    }

    async fn revoke_consent(
        &self,
        record: &ConsentRecord,
    ) -> Result<ServiceResponse, ConsentError> {
        debug!(
            "Revoking scopes {:?} from application '{}'",
            record.granted_scopes, record.application
        );
        let builder = self.post(REVOKE_CONSENT_ENDPOINT, record)?;
        self.send(builder).await
    }
}
