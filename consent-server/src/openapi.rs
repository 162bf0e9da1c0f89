use utoipa::OpenApi;

pub(crate) const HEALTH_TAG: &str = "Health API";
pub(crate) const CONSENT_TAG: &str = "Consent API";

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::health::health_check,
        crate::api::consent::scopes_handler,
        crate::api::consent::grant_handler,
        crate::api::consent::deny_handler,
        crate::api::consent::revoke_handler,
    ),
    tags(
        (name = HEALTH_TAG, description = "Health check endpoints"),
        (name = CONSENT_TAG, description = "OAuth consent grant, deny and revoke endpoints"),
    ),
    info(
        title = "Consent API",
        description = "OAuth2/OIDC consent microservice",
        version = "0.1.0"
    )
)]
pub(crate) struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_consent_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/consent/scopes",
            "/consent/grant",
            "/consent/deny",
            "/consent/revoke",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
