use crate::client::ConsentService;
use crate::error::ConsentError;
use crate::models::{ConsentRecord, GrantRequest, ServiceResponse};

use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Semaphore;

/// How the mock answers a call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockReply {
    /// `status: "ok"`; for grants the string is the authorization code
    Ok(String),
    /// `status: "error"` with this message
    Error(String),
    /// The call fails before any response arrives
    Unreachable,
}

/// An in-process consent service that records every call it receives.
///
/// Grants can be held back with [`MockConsentService::hold_grants`] until
/// [`MockConsentService::release_grants`] is called, to observe an interaction
/// while its grant is in flight.
#[derive(Debug)]
pub struct MockConsentService {
    grant_reply: Mutex<MockReply>,
    revoke_reply: Mutex<MockReply>,
    grant_calls: Mutex<Vec<GrantRequest>>,
    revoke_calls: Mutex<Vec<ConsentRecord>>,
    gate: Option<Semaphore>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockConsentService {
    pub fn new() -> Self {
        Self {
            grant_reply: Mutex::new(MockReply::Ok("mock-code".to_string())),
            revoke_reply: Mutex::new(MockReply::Ok(String::new())),
            grant_calls: Mutex::new(Vec::new()),
            revoke_calls: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Holds every grant until released.
    pub fn hold_grants(mut self) -> Self {
        self.gate = Some(Semaphore::new(0));
        self
    }

    /// Lets `count` held grants complete.
    pub fn release_grants(&self, count: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(count);
        }
    }

    pub fn set_grant_reply(&self, reply: MockReply) {
        *lock(&self.grant_reply) = reply;
    }

    pub fn set_revoke_reply(&self, reply: MockReply) {
        *lock(&self.revoke_reply) = reply;
    }

    pub fn grant_calls(&self) -> Vec<GrantRequest> {
        lock(&self.grant_calls).clone()
    }

    pub fn revoke_calls(&self) -> Vec<ConsentRecord> {
        lock(&self.revoke_calls).clone()
    }
}

impl Default for MockConsentService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConsentService for MockConsentService {
    async fn grant_consent(
        &self,
        request: &GrantRequest,
    ) -> Result<ServiceResponse<String>, ConsentError> {
        lock(&self.grant_calls).push(request.clone());
        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| ConsentError::RequestFailed(e.to_string()))?
                .forget();
        }

        let reply = lock(&self.grant_reply).clone();
        match reply {
            MockReply::Ok(code) => Ok(ServiceResponse {
                status: "ok".to_string(),
                msg: String::new(),
                data: Some(code),
            }),
            MockReply::Error(msg) => Ok(ServiceResponse {
                status: "error".to_string(),
                msg,
                data: None,
            }),
            MockReply::Unreachable => Err(ConsentError::RequestFailed(
                "connection refused".to_string(),
            )),
        }
    }

    async fn revoke_consent(
        &self,
        record: &ConsentRecord,
    ) -> Result<ServiceResponse, ConsentError> {
        lock(&self.revoke_calls).push(record.clone());

        let reply = lock(&self.revoke_reply).clone();
        match reply {
            MockReply::Ok(_) => Ok(ServiceResponse {
                status: "ok".to_string(),
                msg: String::new(),
                data: Some(serde_json::Value::Bool(true)),
            }),
            MockReply::Error(msg) => Ok(ServiceResponse {
                status: "error".to_string(),
                msg,
                data: None,
            }),
            MockReply::Unreachable => Err(ConsentError::RequestFailed(
                "connection refused".to_string(),
            )),
        }
    }
}
