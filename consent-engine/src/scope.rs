//! Scope resolution against an application's custom scope catalog

use crate::error::ConsentError;
use crate::models::{Application, ConsentRecord, CustomScopeDefinition, ResolvedScopeEntry};
use log::debug;
use std::collections::{HashMap, HashSet};

/// Description shown for a requested scope the application never declared
pub const UNDEFINED_SCOPE_DESCRIPTION: &str = "This scope is not defined in the application";

/// Splits a space-delimited scope string into its non-empty tokens, in order.
pub fn parse_scopes(scope: &str) -> Vec<String> {
    scope.split_whitespace().map(str::to_string).collect()
}

/// Catalog lookup keyed by exact scope identifier. Entries with an empty key are skipped.
fn catalog_index(catalog: &[CustomScopeDefinition]) -> HashMap<&str, &CustomScopeDefinition> {
    catalog
        .iter()
        .filter(|definition| !definition.scope.is_empty())
        .map(|definition| (definition.scope.as_str(), definition))
        .collect()
}

/// Resolves the requested scope string into the entries the user is asked to approve.
///
/// One entry per requested token, in request order, duplicates included. Tokens are
/// trimmed but catalog keys are matched as-is. An absent application or a request
/// with no tokens yields an empty list.
pub fn resolve(requested_scope: &str, application: Option<&Application>) -> Vec<ResolvedScopeEntry> {
    let Some(application) = application else {
        return Vec::new();
    };
    let tokens = parse_scopes(requested_scope);
    if tokens.is_empty() {
        return Vec::new();
    }

    let index = catalog_index(&application.custom_scopes);
    let resolved: Vec<ResolvedScopeEntry> = tokens
        .into_iter()
        .map(|token| match index.get(token.as_str()) {
            Some(definition) => ResolvedScopeEntry {
                display_name: if definition.display_name.is_empty() {
                    token.clone()
                } else {
                    definition.display_name.clone()
                },
                description: definition.description.clone(),
                scope: token,
            },
            None => ResolvedScopeEntry {
                display_name: token.clone(),
                description: UNDEFINED_SCOPE_DESCRIPTION.to_string(),
                scope: token,
            },
        })
        .collect();

    debug!(
        "Resolved {} scopes for application '{}'",
        resolved.len(),
        application.id()
    );
    resolved
}

/// Checks that every catalog entry names a scope. Run before a catalog is saved.
pub fn validate_custom_scopes(catalog: &[CustomScopeDefinition]) -> Result<(), ConsentError> {
    if catalog.iter().any(|definition| definition.scope.trim().is_empty()) {
        return Err(ConsentError::InvalidCatalog(
            "Missing parameter: custom scope name".to_string(),
        ));
    }
    Ok(())
}

/// Whether the user must be asked for consent before the authorization flow continues.
///
/// Only requested scopes declared in the catalog count. Consent is not required when
/// there are none, or when an existing record for the application already grants all of them.
pub fn consent_required(
    application: &Application,
    records: &[ConsentRecord],
    requested_scope: &str,
) -> bool {
    if application.custom_scopes.is_empty() {
        return false;
    }

    let index = catalog_index(&application.custom_scopes);
    let declared: Vec<String> = parse_scopes(requested_scope)
        .into_iter()
        .filter(|scope| index.contains_key(scope.as_str()))
        .collect();
    if declared.is_empty() {
        return false;
    }

    let app_id = application.id();
    let already_granted = records
        .iter()
        .filter(|record| record.application == app_id)
        .any(|record| {
            let granted: HashSet<&str> = record.granted_scopes.iter().map(String::as_str).collect();
            declared.iter().all(|scope| granted.contains(scope.as_str()))
        });

    !already_granted
}
