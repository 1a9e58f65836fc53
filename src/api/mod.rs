//! Typed Lightdash REST endpoints.
//!
//! Each submodule holds the wire types for one entity and the [`ApiClient`]
//! methods that reach its endpoints. Wire types mirror the JSON bodies the
//! server speaks (camelCase); optional fields are `Option` and omitted when
//! unset. Update bodies use `Option<Option<T>>` for fields that can be
//! cleared, so a removed value goes out as an explicit `null`.
//!
//! [`ApiClient`]: crate::client::ApiClient

pub mod ai_agents;
pub mod group_accesses;
pub mod groups;
pub mod organization;
pub mod personal_access_tokens;
pub mod projects;
pub mod spaces;

use crate::error::ProviderError;

/// Fail with [`ProviderError::MissingIdentifier`] when a 2xx body lacks a UUID.
pub(crate) fn require_identifier(
    entity: &'static str,
    path: &str,
    uuid: &str,
) -> Result<(), ProviderError> {
    if uuid.trim().is_empty() {
        return Err(ProviderError::MissingIdentifier {
            entity,
            path: path.to_string(),
        });
    }
    Ok(())
}

/// Value of a clearable field in an update body.
///
/// The planned value when set, `Some(None)` (sent as `null`) when the prior
/// state held a value the plan removes, and `None` (omitted) otherwise.
pub(crate) fn clearable<T: Clone>(prior: &Option<T>, planned: &Option<T>) -> Option<Option<T>> {
    match (prior, planned) {
        (_, Some(value)) => Some(Some(value.clone())),
        (Some(_), None) => Some(None),
        (None, None) => None,
    }
}
