//! Grant and deny handling for one consent interaction.
//!
//! An interaction moves `Idle -> Granting -> Redirecting`, or back to `Idle` when a
//! grant fails. `Redirecting` is terminal: the caller navigates to the returned URL.

use crate::client::ConsentService;
use crate::error::ConsentError;
use crate::models::{Application, ConsentDecision, GrantRequest, ResolvedScopeEntry};
use crate::params::OAuthRequestParams;
use crate::scope;
use log::{info, warn};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionState {
    Idle,
    Granting,
    Redirecting,
}

/// Separator for appending to a redirect URI that may already carry a query.
fn query_separator(redirect_uri: &str) -> char {
    if redirect_uri.contains('?') { '&' } else { '?' }
}

/// Redirect target after a successful grant.
pub fn grant_redirect(redirect_uri: &str, code: &str, state: &str) -> String {
    format!(
        "{}{}code={}&state={}",
        redirect_uri,
        query_separator(redirect_uri),
        code,
        state
    )
}

/// Redirect target after the user denied consent.
pub fn deny_redirect(redirect_uri: &str, state: &str) -> String {
    format!(
        "{}{}error=access_denied&error_description=User denied consent&state={}",
        redirect_uri,
        query_separator(redirect_uri),
        state
    )
}

struct Inner {
    application: Option<Application>,
    resolved: Vec<ResolvedScopeEntry>,
    state: InteractionState,
}

impl Inner {
    fn check_actionable(&self) -> Result<&Application, ConsentError> {
        let application = self
            .application
            .as_ref()
            .ok_or(ConsentError::InvalidApplication)?;
        match self.state {
            InteractionState::Redirecting => Err(ConsentError::InteractionClosed),
            InteractionState::Granting => Err(ConsentError::GrantInProgress),
            InteractionState::Idle if self.resolved.is_empty() => {
                Err(ConsentError::NothingToConsent)
            }
            InteractionState::Idle => Ok(application),
        }
    }
}

fn lock_inner(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Puts the interaction back to `Idle` unless disarmed, so a grant whose future is
/// dropped mid-flight (caller timeout, `select!`, aborted task) stays retryable.
struct GrantingGuard<'a> {
    inner: &'a Mutex<Inner>,
    armed: bool,
}

impl GrantingGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for GrantingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            lock_inner(self.inner).state = InteractionState::Idle;
        }
    }
}

/// One user's consent interaction for one application.
///
/// Safe to share between tasks; a grant started while another is in flight is
/// rejected without reaching the consent service.
pub struct ConsentInteraction<S> {
    service: S,
    params: OAuthRequestParams,
    inner: Mutex<Inner>,
}

impl<S: ConsentService> ConsentInteraction<S> {
    pub fn new(service: S, params: OAuthRequestParams, application: Option<Application>) -> Self {
        let resolved = scope::resolve(&params.scope, application.as_ref());
        Self {
            service,
            params,
            inner: Mutex::new(Inner {
                application,
                resolved,
                state: InteractionState::Idle,
            }),
        }
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        lock_inner(&self.inner)
    }

    pub fn params(&self) -> &OAuthRequestParams {
        &self.params
    }

    pub fn state(&self) -> InteractionState {
        self.inner().state
    }

    pub fn application(&self) -> Option<Application> {
        self.inner().application.clone()
    }

    /// The scopes the user is asked to approve
    pub fn resolved_scopes(&self) -> Vec<ResolvedScopeEntry> {
        self.inner().resolved.clone()
    }

    /// Replaces the application (e.g. once its metadata finished loading) and re-resolves scopes.
    pub fn update_application(&self, application: Option<Application>) {
        let mut inner = self.inner();
        inner.resolved = scope::resolve(&self.params.scope, application.as_ref());
        inner.application = application;
    }

    /// Whether grant may be invoked right now
    pub fn can_grant(&self) -> bool {
        self.inner().check_actionable().is_ok()
    }

    /// Whether deny may be invoked right now
    pub fn can_deny(&self) -> bool {
        self.can_grant()
    }

    /// Grants every resolved scope and returns the redirect target carrying the authorization code.
    ///
    /// On failure, or when the returned future is dropped before completing, the
    /// interaction returns to `Idle` so the grant can be retried.
    pub async fn grant(&self) -> Result<String, ConsentError> {
        let request = {
            let mut inner = self.inner();
            let application = inner.check_actionable()?;
            let decision = ConsentDecision::new(application, &inner.resolved);
            inner.state = InteractionState::Granting;
            GrantRequest::new(&decision, &self.params)
        };
        let guard = GrantingGuard {
            inner: &self.inner,
            armed: true,
        };
        info!(
            "Granting {} scopes to application '{}'",
            request.granted_scopes.len(),
            request.application
        );

        let result = match self.service.grant_consent(&request).await {
            Ok(response) if response.is_ok() => match response.data {
                Some(code) => Ok(code),
                None => Err(ConsentError::DeserializationError(
                    "missing authorization code in grant response".to_string(),
                )),
            },
            Ok(response) => Err(ConsentError::Rejected(response.msg)),
            Err(e) => Err(e),
        };

        match result {
            Ok(code) => {
                self.inner().state = InteractionState::Redirecting;
                guard.disarm();
                info!(
                    "Consent granted for application '{}', code length {}",
                    request.application,
                    code.len()
                );
                Ok(grant_redirect(&self.params.redirect_uri, &code, &self.params.state))
            }
            Err(e) => {
                drop(guard);
                warn!(
                    "Grant for application '{}' failed: {}",
                    request.application, e
                );
                Err(e)
            }
        }
    }

    /// Denies consent. Local only: no call reaches the consent service.
    pub fn deny(&self) -> Result<String, ConsentError> {
        let mut inner = self.inner();
        inner.check_actionable()?;
        inner.state = InteractionState::Redirecting;
        info!("Consent denied for client '{}'", self.params.client_id);
        Ok(deny_redirect(&self.params.redirect_uri, &self.params.state))
    }
}
