//! Revocation of previously granted consent.
//!
//! The consent service owns the records. After a successful revoke the caller
//! reloads its table from the service; nothing here patches records locally.

use crate::client::ConsentService;
use crate::error::ConsentError;
use crate::models::ConsentRecord;
use log::{info, warn};

/// Builds the revoke request for `record`: only `scope` when given, otherwise every granted scope.
///
/// A blank `scope` counts as not given.
pub fn revoke_request(record: &ConsentRecord, scope: Option<&str>) -> ConsentRecord {
    let granted_scopes = match scope.filter(|scope| !scope.trim().is_empty()) {
        Some(scope) => vec![scope.to_string()],
        None => record.granted_scopes.clone(),
    };
    ConsentRecord {
        application: record.application.clone(),
        granted_scopes,
    }
}

pub struct ConsentRecordManager<S> {
    service: S,
}

impl<S: ConsentService> ConsentRecordManager<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    /// Revokes one scope, or the whole record when `scope` is `None`.
    ///
    /// `Ok(())` means the table must be reloaded. On error the table is left as it
    /// was and the error's message is what the user sees.
    pub async fn revoke(
        &self,
        record: &ConsentRecord,
        scope: Option<&str>,
    ) -> Result<(), ConsentError> {
        let request = revoke_request(record, scope);
        if request.application.is_empty() {
            return Err(ConsentError::InvalidRequest(
                "Application cannot be empty".to_string(),
            ));
        }
        if request.granted_scopes.is_empty() {
            return Err(ConsentError::InvalidRequest(
                "Granted scopes cannot be empty".to_string(),
            ));
        }

        let response = self.service.revoke_consent(&request).await?;
        if !response.is_ok() {
            warn!(
                "Revoke for application '{}' rejected: {}",
                request.application, response.msg
            );
            return Err(ConsentError::Rejected(response.msg));
        }

        info!(
            "Revoked {:?} from application '{}'",
            request.granted_scopes, request.application
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockConsentService, MockReply};
    use std::sync::Arc;

    fn record() -> ConsentRecord {
        ConsentRecord {
            application: "admin/app".to_string(),
            granted_scopes: vec!["a".to_string(), "b".to_string()],
        }
    }

    #[tokio::test]
    async fn test_revoke_single_scope() {
        let service = Arc::new(MockConsentService::new());
        let manager = ConsentRecordManager::new(service.clone());
        manager
            .revoke(&record(), Some("a"))
            .await
            .expect("revoke should succeed");
        assert_eq!(
            service.revoke_calls(),
            vec![ConsentRecord {
                application: "admin/app".to_string(),
                granted_scopes: vec!["a".to_string()],
            }]
        );
    }

    #[tokio::test]
    async fn test_revoke_whole_record() {
        let service = Arc::new(MockConsentService::new());
        let manager = ConsentRecordManager::new(service.clone());
        manager
            .revoke(&record(), None)
            .await
            .expect("revoke should succeed");
        assert_eq!(service.revoke_calls(), vec![record()]);
    }

    #[test]
    fn test_revoke_request_blank_scope_targets_whole_record() {
        assert_eq!(revoke_request(&record(), Some("")), record());
        assert_eq!(revoke_request(&record(), Some(" \t")), record());
        assert_eq!(
            revoke_request(&record(), Some("b")).granted_scopes,
            vec!["b".to_string()]
        );
    }

    #[tokio::test]
    async fn test_revoke_empty_scope_never_sends_blank_scope() {
        let service = Arc::new(MockConsentService::new());
        let manager = ConsentRecordManager::new(service.clone());
        manager
            .revoke(&record(), Some(""))
            .await
            .expect("revoke should succeed");
        assert_eq!(service.revoke_calls(), vec![record()]);
    }

    #[tokio::test]
    async fn test_revoke_rejected_surfaces_message() {
        let service = Arc::new(MockConsentService::new());
        service.set_revoke_reply(MockReply::Error("Please login first".to_string()));
        let manager = ConsentRecordManager::new(service.clone());
        let err = manager
            .revoke(&record(), None)
            .await
            .expect_err("revoke should fail");
        assert_eq!(err.to_string(), "Please login first");
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_revoke_connection_failure() {
        let service = Arc::new(MockConsentService::new());
        service.set_revoke_reply(MockReply::Unreachable);
        let manager = ConsentRecordManager::new(service);
        let err = manager
            .revoke(&record(), Some("b"))
            .await
            .expect_err("revoke should fail");
        assert!(matches!(err, ConsentError::RequestFailed(_)));
    }

    #[tokio::test]
    async fn test_revoke_validates_locally() {
        let service = Arc::new(MockConsentService::new());
        let manager = ConsentRecordManager::new(service.clone());

        let empty_scopes = ConsentRecord {
            application: "admin/app".to_string(),
            granted_scopes: vec![],
        };
        assert!(matches!(
            manager.revoke(&empty_scopes, None).await,
            Err(ConsentError::InvalidRequest(_))
        ));

        let no_application = ConsentRecord {
            application: String::new(),
            granted_scopes: vec!["a".to_string()],
        };
        assert!(matches!(
            manager.revoke(&no_application, Some("a")).await,
            Err(ConsentError::InvalidRequest(_))
        ));
        assert!(service.revoke_calls().is_empty());
    }
}
