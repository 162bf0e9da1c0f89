//! Extraction of the authorization request parameters a consent interaction runs on.

use serde::{Deserialize, Serialize};
use url::Url;

/// Response type used when the request does not name one.
pub const DEFAULT_RESPONSE_TYPE: &str = "code";

/// OAuth 2.0 authorization request parameters, as carried on the consent page's query string.
///
/// Values are passed through unvalidated; the authorization endpoint already checked them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthRequestParams {
    pub client_id: String,
    pub redirect_uri: String,
    /// Raw space-delimited scope string
    pub scope: String,
    pub state: String,
    #[serde(default)]
    pub nonce: String,
    #[serde(default)]
    pub code_challenge: String,
    #[serde(default = "default_response_type")]
    pub response_type: String,
}

fn default_response_type() -> String {
    DEFAULT_RESPONSE_TYPE.to_string()
}

impl Default for OAuthRequestParams {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            redirect_uri: String::new(),
            scope: String::new(),
            state: String::new(),
            nonce: String::new(),
            code_challenge: String::new(),
            response_type: default_response_type(),
        }
    }
}

impl OAuthRequestParams {
    /// Parses a query string (with or without the leading `?`).
    ///
    /// Missing parameters become empty strings and a missing or empty
    /// `response_type` becomes `"code"`. The first occurrence of a repeated key wins.
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut params = OAuthRequestParams {
            response_type: String::new(),
            ..Default::default()
        };
        let mut seen: Vec<String> = Vec::new();

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            if seen.iter().any(|k| k == key.as_ref()) {
                continue;
            }
            let slot = match key.as_ref() {
                "client_id" => &mut params.client_id,
                "redirect_uri" => &mut params.redirect_uri,
                "scope" => &mut params.scope,
                "state" => &mut params.state,
                "nonce" => &mut params.nonce,
                "code_challenge" => &mut params.code_challenge,
                "response_type" => &mut params.response_type,
                _ => continue,
            };
            *slot = value.into_owned();
            seen.push(key.into_owned());
        }

        if params.response_type.is_empty() {
            params.response_type = default_response_type();
        }
        params
    }

    /// Parses the query component of a full consent page URL.
    pub fn from_url(url: &Url) -> Self {
        Self::from_query(url.query().unwrap_or_default())
    }
}
