use crate::config::Settings;
use consent_engine::{ConsentClient, ConsentClientBuilder, ConsentError};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub consent_client: ConsentClient,
    in_flight_grants: Arc<Mutex<HashSet<String>>>,
}

impl AppState {
    fn create_consent_client(settings: &Settings) -> Result<ConsentClient, ConsentError> {
        let mut builder = ConsentClientBuilder::new()
            .with_accept_language(settings.accept_language.clone())
            .with_connect_timeout(Duration::from_secs(settings.connect_timeout));
        if let Some(timeout) = settings.request_timeout() {
            builder = builder.with_timeout(timeout);
        }
        builder.with_base_url(&settings.backend_url)?.build()
    }

    pub fn new(settings: Settings) -> Result<Self, ConsentError> {
        Ok(Self {
            consent_client: Self::create_consent_client(&settings)?,
            settings: Arc::new(settings),
            in_flight_grants: Arc::new(Mutex::new(HashSet::new())),
        })
    }

    /// Marks a grant as in flight. Returns `None` when the same grant is already running.
    pub fn begin_grant(&self, key: String) -> Option<GrantGuard> {
        let inserted = self
            .in_flight_grants
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone());
        inserted.then(|| GrantGuard {
            key,
            in_flight: Arc::clone(&self.in_flight_grants),
        })
    }
}

/// Clears the in-flight mark when the grant finishes, whatever its outcome
pub struct GrantGuard {
    key: String,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl Drop for GrantGuard {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}
