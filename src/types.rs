//! Plan, import and metadata types exchanged with the orchestrator.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::Diagnostic;

/// Placeholder shown instead of sensitive values in plan output.
pub const SENSITIVE_PLACEHOLDER: &str = "(sensitive value)";

/// A change to a single attribute during a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeChange {
    /// Dotted path to the attribute that changed.
    pub path: String,
    /// The value before the change (`None` when creating).
    pub before: Option<Value>,
    /// The value after the change (`None` when deleting).
    pub after: Option<Value>,
    /// Whether the change forces replacement of the resource.
    #[serde(default)]
    pub requires_replace: bool,
}

impl AttributeChange {
    /// Create a new attribute change.
    pub fn new(path: impl Into<String>, before: Option<Value>, after: Option<Value>) -> Self {
        Self {
            path: path.into(),
            before,
            after,
            requires_replace: false,
        }
    }

    /// A change for a new attribute.
    pub fn added(path: impl Into<String>, value: Value) -> Self {
        Self::new(path, None, Some(value))
    }

    /// A change for a removed attribute.
    pub fn removed(path: impl Into<String>, value: Value) -> Self {
        Self::new(path, Some(value), None)
    }

    /// A change for a modified attribute.
    pub fn modified(path: impl Into<String>, before: Value, after: Value) -> Self {
        Self::new(path, Some(before), Some(after))
    }

    /// Mark this change as forcing replacement.
    pub fn forcing_replacement(mut self) -> Self {
        self.requires_replace = true;
        self
    }

    /// Hide both sides of the change behind [`SENSITIVE_PLACEHOLDER`].
    pub fn masked(mut self) -> Self {
        let mask = |v: Option<Value>| v.map(|_| Value::String(SENSITIVE_PLACEHOLDER.to_string()));
        self.before = mask(self.before);
        self.after = mask(self.after);
        self
    }
}

/// The result of a plan operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResult {
    /// The planned state after the operation.
    pub planned_state: Value,
    /// The list of attribute changes.
    pub changes: Vec<AttributeChange>,
    /// Whether the resource requires replacement.
    pub requires_replace: bool,
}

impl PlanResult {
    /// A plan with no changes.
    pub fn no_change(state: Value) -> Self {
        Self {
            planned_state: state,
            changes: Vec::new(),
            requires_replace: false,
        }
    }

    /// A plan with changes; replacement is required if any change forces it.
    pub fn with_changes(planned_state: Value, changes: Vec<AttributeChange>) -> Self {
        let requires_replace = changes.iter().any(|c| c.requires_replace);
        Self {
            planned_state,
            changes,
            requires_replace,
        }
    }

    /// Paths of the changes that force replacement.
    pub fn replace_paths(&self) -> Vec<&str> {
        self.changes
            .iter()
            .filter(|c| c.requires_replace)
            .map(|c| c.path.as_str())
            .collect()
    }
}

/// A resource brought under management by import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedResource {
    /// The resource type.
    pub resource_type: String,
    /// The reconstructed state.
    pub state: Value,
    /// Warnings about attributes the API could not return.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl ImportedResource {
    /// Create a new imported resource.
    pub fn new(resource_type: impl Into<String>, state: Value) -> Self {
        Self {
            resource_type: resource_type.into(),
            state,
            diagnostics: Vec::new(),
        }
    }

    /// Attach diagnostics to the import.
    pub fn with_diagnostics(mut self, diagnostics: Vec<Diagnostic>) -> Self {
        self.diagnostics = diagnostics;
        self
    }
}

/// Provider metadata: the type names it serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProviderMetadata {
    /// Resource type names.
    pub resources: Vec<String>,
    /// Data source type names.
    pub data_sources: Vec<String>,
}
