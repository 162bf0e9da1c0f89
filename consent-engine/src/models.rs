//! Consent data models and the request/response payloads of the consent service

use crate::params::OAuthRequestParams;
use serde::{Deserialize, Serialize};

/// A scope declared in an application's custom scope catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomScopeDefinition {
    /// Scope identifier, unique within the application
    pub scope: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
}

/// Application metadata as resolved by the caller. Read-only to this crate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub owner: String,
    pub name: String,
    #[serde(default)]
    pub custom_scopes: Vec<CustomScopeDefinition>,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub logo: String,
    #[serde(default)]
    pub homepage_url: String,
}

impl Application {
    /// Identifier in `owner/name` form, as used by consent records
    pub fn id(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// A requested scope paired with the text shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedScopeEntry {
    pub scope: String,
    pub display_name: String,
    pub description: String,
}

/// The user's approval of a scope set for one application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentDecision {
    pub owner: String,
    /// `owner/name`
    pub application: String,
    pub granted_scopes: Vec<String>,
}

impl ConsentDecision {
    /// Grants exactly the scopes of `resolved`, in order.
    pub fn new(application: &Application, resolved: &[ResolvedScopeEntry]) -> Self {
        Self {
            owner: application.owner.clone(),
            application: application.id(),
            granted_scopes: resolved.iter().map(|entry| entry.scope.clone()).collect(),
        }
    }
}

/// A persisted consent: the scopes a user has granted to one application
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentRecord {
    /// `owner/name`
    pub application: String,
    #[serde(default)]
    pub granted_scopes: Vec<String>,
}

/// Body of the grant call: the decision merged with the authorization request parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantRequest {
    pub owner: String,
    pub application: String,
    pub granted_scopes: Vec<String>,
    pub client_id: String,
    /// Reserved, always empty
    pub provider: String,
    /// Reserved, always empty
    pub signin_method: String,
    pub response_type: String,
    pub redirect_uri: String,
    pub scope: String,
    pub state: String,
    pub nonce: String,
    /// PKCE code challenge
    pub challenge: String,
    /// Reserved, always empty
    pub resource: String,
}

impl GrantRequest {
    pub fn new(decision: &ConsentDecision, params: &OAuthRequestParams) -> Self {
        let response_type = if params.response_type.is_empty() {
            crate::params::DEFAULT_RESPONSE_TYPE.to_string()
        } else {
            params.response_type.clone()
        };
        Self {
            owner: decision.owner.clone(),
            application: decision.application.clone(),
            granted_scopes: decision.granted_scopes.clone(),
            client_id: params.client_id.clone(),
            provider: String::new(),
            signin_method: String::new(),
            response_type,
            redirect_uri: params.redirect_uri.clone(),
            scope: params.scope.clone(),
            state: params.state.clone(),
            nonce: params.nonce.clone(),
            challenge: params.code_challenge.clone(),
            resource: String::new(),
        }
    }
}

/// Envelope returned by every consent service call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceResponse<T = serde_json::Value> {
    /// "ok" or "error"
    pub status: String,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub data: Option<T>,
}

impl<T> ServiceResponse<T> {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_application() -> Application {
        Application {
            owner: "admin".to_string(),
            name: "app-built-in".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_application_id() {
        assert_eq!(test_application().id(), "admin/app-built-in");
    }

    #[test]
    fn test_decision_grants_resolved_scopes_in_order() {
        let resolved = vec![
            ResolvedScopeEntry {
                scope: "profile".to_string(),
                display_name: "Profile".to_string(),
                description: "d1".to_string(),
            },
            ResolvedScopeEntry {
                scope: "email".to_string(),
                display_name: "email".to_string(),
                description: "d2".to_string(),
            },
        ];
        let decision = ConsentDecision::new(&test_application(), &resolved);
        assert_eq!(decision.owner, "admin");
        assert_eq!(decision.application, "admin/app-built-in");
        assert_eq!(decision.granted_scopes, vec!["profile", "email"]);
    }

    #[test]
    fn test_grant_request_wire_shape() {
        let decision = ConsentDecision {
            owner: "admin".to_string(),
            application: "admin/app".to_string(),
            granted_scopes: vec!["profile".to_string()],
        };
        let params = OAuthRequestParams {
            client_id: "cid".to_string(),
            redirect_uri: "https://a.com/cb".to_string(),
            scope: "profile".to_string(),
            state: "st".to_string(),
            code_challenge: "pkce".to_string(),
            ..Default::default()
        };
        let body = serde_json::to_value(GrantRequest::new(&decision, &params))
            .expect("should serialize");
        assert_eq!(
            body,
            json!({
                "owner": "admin",
                "application": "admin/app",
                "grantedScopes": ["profile"],
                "clientId": "cid",
                "provider": "",
                "signinMethod": "",
                "responseType": "code",
                "redirectUri": "https://a.com/cb",
                "scope": "profile",
                "state": "st",
                "nonce": "",
                "challenge": "pkce",
                "resource": ""
            })
        );
    }

    #[test]
    fn test_service_response_without_data() {
        let response: ServiceResponse<String> =
            serde_json::from_value(json!({"status": "error", "msg": "Please login first"}))
                .expect("should deserialize");
        assert!(!response.is_ok());
        assert_eq!(response.msg, "Please login first");
        assert!(response.data.is_none());
    }

    #[test]
    fn test_application_catalog_defaults() {
        let app: Application = serde_json::from_value(json!({
            "owner": "admin",
            "name": "app",
            "customScopes": [{"scope": "read"}]
        }))
        .expect("should deserialize");
        assert_eq!(app.custom_scopes.len(), 1);
        assert_eq!(app.custom_scopes[0].display_name, "");
        assert_eq!(app.homepage_url, "");
    }
}
