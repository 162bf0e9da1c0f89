//! Consent endpoints called by the consent page and the consent management table

use crate::errors::ApiError;
use crate::openapi::CONSENT_TAG;
use crate::state::AppState;
use axum::{
    extract::{Json, State},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use consent_engine::{
    consent_required, resolve, Application, ConsentError, ConsentInteraction, ConsentRecord,
    ConsentRecordManager, OAuthRequestParams, ResolvedScopeEntry,
};
use http::header::{ACCEPT_LANGUAGE, COOKIE};
use http::{HeaderMap, StatusCode};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A consent page context: the application being authorized and the page's query string
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConsentPageRequest {
    /// Resolved application, absent when it could not be loaded
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    application: Option<Application>,
    /// Raw authorization request query string
    query: String,
    /// The user's existing consent records, used to tell whether consent is still needed
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    records: Vec<ConsentRecord>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScopesResponse {
    #[schema(value_type = Vec<Object>)]
    scopes: Vec<ResolvedScopeEntry>,
    consent_required: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RedirectResponse {
    /// URL the browser navigates to
    redirect: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct RevokeRequest {
    #[schema(value_type = Object)]
    record: ConsentRecord,
    /// Single scope to revoke; the whole record when absent
    #[serde(default)]
    scope: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RevokeResponse {
    status: String,
}

/// Headers passed through to the consent service on the user's behalf
fn forwarded_headers(headers: &HeaderMap) -> HeaderMap {
    let mut forwarded = HeaderMap::new();
    for name in [COOKIE, ACCEPT_LANGUAGE] {
        if let Some(value) = headers.get(&name) {
            forwarded.insert(name, value.clone());
        }
    }
    forwarded
}

#[utoipa::path(
    post,
    path = "/consent/scopes",
    tag = CONSENT_TAG,
    request_body = ConsentPageRequest,
    responses(
        (status = 200, description = "Scopes the user is asked to approve", body = ScopesResponse),
        (status = 422, description = "Invalid application")
    )
)]
pub(crate) async fn scopes_handler(Json(request): Json<ConsentPageRequest>) -> Response {
    let Some(application) = request.application else {
        return ApiError::from(ConsentError::InvalidApplication).into_response();
    };
    let params = OAuthRequestParams::from_query(&request.query);
    let scopes = resolve(&params.scope, Some(&application));
    let consent_required = consent_required(&application, &request.records, &params.scope);

    (
        StatusCode::OK,
        Json(ScopesResponse {
            scopes,
            consent_required,
        }),
    )
        .into_response()
}

#[utoipa::path(
    post,
    path = "/consent/grant",
    tag = CONSENT_TAG,
    request_body = ConsentPageRequest,
    responses(
        (status = 200, description = "Consent granted", body = RedirectResponse),
        (status = 400, description = "Nothing to consent to"),
        (status = 409, description = "The same grant is already in progress"),
        (status = 422, description = "Invalid application"),
        (status = 502, description = "Consent service rejected the grant or could not be reached")
    )
)]
pub(crate) async fn grant_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ConsentPageRequest>,
) -> Response {
    let params = OAuthRequestParams::from_query(&request.query);
    let Some(application) = request.application else {
        return ApiError::from(ConsentError::InvalidApplication).into_response();
    };

    let key = format!("{}|{}|{}", application.id(), params.client_id, params.state);
    let Some(_guard) = state.begin_grant(key) else {
        warn!(
            "Duplicate grant for application '{}' rejected",
            application.id()
        );
        return ApiError::from(ConsentError::GrantInProgress).into_response();
    };

    let client = state.consent_client.forwarding(forwarded_headers(&headers));
    let interaction = ConsentInteraction::new(client, params, Some(application));
    match interaction.grant().await {
        Ok(redirect) => (StatusCode::OK, Json(RedirectResponse { redirect })).into_response(),
        Err(err) => ApiError::from(err).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/consent/deny",
    tag = CONSENT_TAG,
    request_body = ConsentPageRequest,
    responses(
        (status = 200, description = "Consent denied", body = RedirectResponse),
        (status = 400, description = "Nothing to consent to"),
        (status = 422, description = "Invalid application")
    )
)]
pub(crate) async fn deny_handler(
    State(state): State<AppState>,
    Json(request): Json<ConsentPageRequest>,
) -> Response {
    let params = OAuthRequestParams::from_query(&request.query);
    let interaction =
        ConsentInteraction::new(state.consent_client.clone(), params, request.application);
    match interaction.deny() {
        Ok(redirect) => (StatusCode::OK, Json(RedirectResponse { redirect })).into_response(),
        Err(err) => ApiError::from(err).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/consent/revoke",
    tag = CONSENT_TAG,
    request_body = RevokeRequest,
    responses(
        (status = 200, description = "Consent revoked; reload the consent records", body = RevokeResponse),
        (status = 400, description = "Invalid revoke request"),
        (status = 502, description = "Consent service rejected the revoke or could not be reached")
    )
)]
pub(crate) async fn revoke_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<RevokeRequest>,
) -> Response {
    let client = state.consent_client.forwarding(forwarded_headers(&headers));
    let manager = ConsentRecordManager::new(client);
    match manager
        .revoke(&request.record, request.scope.as_deref())
        .await
    {
        Ok(()) => {
            info!("Consent revoked for '{}'", request.record.application);
            (
                StatusCode::OK,
                Json(RevokeResponse {
                    status: "ok".to_string(),
                }),
            )
                .into_response()
        }
        Err(err) => ApiError::from(err).into_response(),
    }
}

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/consent/scopes", post(scopes_handler))
        .route("/consent/grant", post(grant_handler))
        .route("/consent/deny", post(deny_handler))
        .route("/consent/revoke", post(revoke_handler))
}
