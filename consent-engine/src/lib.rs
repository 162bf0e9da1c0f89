//! # consent-engine
//!
//! Consent resolution and grant/revoke handling for an OAuth 2.0 / OpenID Connect
//! authorization flow.
//!
//! ## Components
//!
//! - **Params:** Extracts the authorization request parameters from the consent page query.
//! - **Scope:** Resolves requested scopes against an application's custom scope catalog.
//! - **Interaction:** Grants or denies consent and builds the redirect back to the client.
//! - **Records:** Revokes previously granted consent.
//! - **Client:** HTTP client for the external consent service that stores the grants.

pub mod builder;
pub mod client;
pub mod error;
pub mod interaction;
pub mod mock;
pub mod models;
pub mod params;
pub mod records;
pub mod scope;

pub use builder::ConsentClientBuilder;
pub use client::{ConsentClient, ConsentService};
pub use error::ConsentError;
pub use interaction::{ConsentInteraction, InteractionState, deny_redirect, grant_redirect};
pub use mock::{MockConsentService, MockReply};
pub use models::{
    Application, ConsentDecision, ConsentRecord, CustomScopeDefinition, GrantRequest,
    ResolvedScopeEntry, ServiceResponse,
};
pub use params::OAuthRequestParams;
pub use records::ConsentRecordManager;
pub use scope::{consent_required, resolve, validate_custom_scopes};
