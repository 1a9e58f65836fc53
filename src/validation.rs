//! Configuration validation against a [`Schema`].
//!
//! Runs before planning and reports every problem at once: missing required
//! attributes, type mismatches, values outside an allowed set, and mutually
//! exclusive attributes set together.
//!
//! # Example
//!
//! ```
//! use lightdash_provider::schema::{Attribute, Schema};
//! use lightdash_provider::validation::validate;
//! use serde_json::json;
//!
//! let schema = Schema::v0()
//!     .with_attribute("name", Attribute::required_string())
//!     .with_attribute("retries", Attribute::optional_int64());
//!
//! assert!(validate(&schema, &json!({"name": "analytics", "retries": 3})).is_empty());
//!
//! let diagnostics = validate(&schema, &json!({"name": "analytics", "retries": "three"}));
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].attribute, Some("retries".to_string()));
//! ```

use serde_json::{Map, Value};
use std::collections::BTreeSet;

use crate::schema::{Attribute, AttributeType, Block, BlockNestingMode, Diagnostic, NestedBlock, Schema};

/// Validate a configuration value against a schema.
///
/// An empty result means the value is valid. Computed-only attributes and
/// computed blocks are skipped since the provider fills them.
pub fn validate(schema: &Schema, value: &Value) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    validate_block(&schema.block, value, "", &mut diagnostics);
    diagnostics
}

/// Like [`validate`], returning `Err` with the diagnostics when invalid.
pub fn validate_result(schema: &Schema, value: &Value) -> Result<(), Vec<Diagnostic>> {
    let diagnostics = validate(schema, value);
    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(diagnostics)
    }
}

/// Whether a value is valid against a schema.
pub fn is_valid(schema: &Schema, value: &Value) -> bool {
    validate(schema, value).is_empty()
}

fn validate_block(block: &Block, value: &Value, path: &str, diagnostics: &mut Vec<Diagnostic>) {
    let obj = match value {
        Value::Object(map) => map,
        Value::Null => return,
        other => {
            let mut diag =
                Diagnostic::error("Expected object").with_detail(format!("Got {}", type_name(other)));
            if !path.is_empty() {
                diag = diag.with_attribute(path);
            }
            diagnostics.push(diag);
            return;
        }
    };

    for (name, attr) in &block.attributes {
        let attr_path = join_path(path, name);
        validate_attribute(attr, obj.get(name), &attr_path, diagnostics);
    }

    for (name, nested) in &block.blocks {
        if nested.computed {
            continue;
        }
        let block_path = join_path(path, name);
        validate_nested_block(nested, obj.get(name), &block_path, diagnostics);
    }

    check_conflicts(block, obj, path, diagnostics);
}

fn validate_attribute(
    attr: &Attribute,
    value: Option<&Value>,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if attr.flags.is_computed_only() {
        return;
    }

    match value {
        None | Some(Value::Null) => {
            if attr.flags.required {
                diagnostics.push(
                    Diagnostic::error(format!("Missing required attribute '{}'", path))
                        .with_detail("This attribute is required and must be provided")
                        .with_attribute(path),
                );
            }
        }
        Some(v) => {
            if validate_type(&attr.attr_type, v, path, diagnostics) {
                check_allowed_value(attr, v, path, diagnostics);
            }
        }
    }
}

/// Returns `true` when the value matched the expected type.
fn validate_type(
    attr_type: &AttributeType,
    value: &Value,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> bool {
    let ok = match attr_type {
        AttributeType::String => value.is_string(),
        AttributeType::Int64 => value.is_i64() || value.is_u64(),
        AttributeType::Bool => value.is_boolean(),
        AttributeType::List(element_type) => match value.as_array() {
            Some(items) => {
                let before = diagnostics.len();
                for (i, item) in items.iter().enumerate() {
                    validate_type(element_type, item, &format!("{}.{}", path, i), diagnostics);
                }
                return diagnostics.len() == before;
            }
            None => false,
        },
    };

    if !ok {
        diagnostics.push(
            Diagnostic::error(format!("Invalid type for attribute '{}'", path))
                .with_detail(format!(
                    "Expected {}, got {}",
                    expected_name(attr_type),
                    type_name(value)
                ))
                .with_attribute(path),
        );
    }
    ok
}

fn check_allowed_value(attr: &Attribute, value: &Value, path: &str, diagnostics: &mut Vec<Diagnostic>) {
    if attr.allowed_values.is_empty() {
        return;
    }
    let Some(s) = value.as_str() else {
        return;
    };
    if !attr.allowed_values.iter().any(|allowed| allowed == s) {
        diagnostics.push(
            Diagnostic::error(format!("Invalid value for attribute '{}'", path))
                .with_detail(format!(
                    "Got '{}', expected one of: {}",
                    s,
                    attr.allowed_values.join(", ")
                ))
                .with_attribute(path),
        );
    }
}

fn check_conflicts(block: &Block, obj: &Map<String, Value>, path: &str, diagnostics: &mut Vec<Diagnostic>) {
    let declared = block
        .attributes
        .iter()
        .map(|(name, attr)| (name, &attr.conflicts_with))
        .chain(block.blocks.iter().map(|(name, nested)| (name, &nested.conflicts_with)));

    let mut pairs = BTreeSet::new();
    for (name, siblings) in declared {
        for sibling in siblings {
            if is_set(obj.get(name.as_str())) && is_set(obj.get(sibling)) {
                let pair = if name.as_str() < sibling.as_str() {
                    (name.as_str(), sibling.as_str())
                } else {
                    (sibling.as_str(), name.as_str())
                };
                pairs.insert(pair);
            }
        }
    }

    for (first, second) in pairs {
        diagnostics.push(
            Diagnostic::error("Conflicting configuration")
                .with_detail(format!(
                    "'{}' and '{}' are mutually exclusive; set only one of them",
                    join_path(path, first),
                    join_path(path, second)
                ))
                .with_attribute(join_path(path, first)),
        );
    }
}

fn validate_nested_block(
    nested: &NestedBlock,
    value: Option<&Value>,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match (nested.nesting_mode, value) {
        (_, None | Some(Value::Null)) => {
            if nested.min_items > 0 {
                diagnostics.push(
                    Diagnostic::error(format!("Missing required block '{}'", path))
                        .with_detail(format!(
                            "At least {} block(s) required",
                            nested.min_items
                        ))
                        .with_attribute(path),
                );
            }
        }
        (BlockNestingMode::Single, Some(v)) => validate_block(&nested.block, v, path, diagnostics),
        (BlockNestingMode::List, Some(Value::Array(items))) => {
            let len = items.len() as u32;
            if len < nested.min_items {
                diagnostics.push(
                    Diagnostic::error(format!(
                        "Block '{}' requires at least {} item(s), got {}",
                        path, nested.min_items, len
                    ))
                    .with_attribute(path),
                );
            }
            if nested.max_items > 0 && len > nested.max_items {
                diagnostics.push(
                    Diagnostic::error(format!(
                        "Block '{}' allows at most {} item(s), got {}",
                        path, nested.max_items, len
                    ))
                    .with_attribute(path),
                );
            }
            for (i, item) in items.iter().enumerate() {
                validate_block(&nested.block, item, &format!("{}.{}", path, i), diagnostics);
            }
        }
        (BlockNestingMode::List, Some(other)) => {
            diagnostics.push(
                Diagnostic::error(format!("Expected list for block '{}'", path))
                    .with_detail(format!("Got {}", type_name(other)))
                    .with_attribute(path),
            );
        }
    }
}

fn is_set(value: Option<&Value>) -> bool {
    !matches!(value, None | Some(Value::Null))
}

fn join_path(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", base, name)
    }
}

fn expected_name(attr_type: &AttributeType) -> &'static str {
    match attr_type {
        AttributeType::String => "string",
        AttributeType::Int64 => "int64",
        AttributeType::Bool => "bool",
        AttributeType::List(_) => "list",
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::NestedBlock;
    use serde_json::json;

    fn project_like_schema() -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::computed_string())
            .with_attribute("name", Attribute::required_string())
            .with_attribute(
                "type",
                Attribute::required_string().with_allowed_values(["DEFAULT", "PREVIEW"]),
            )
            .with_attribute(
                "organization_warehouse_credentials_uuid",
                Attribute::optional_string().with_conflicts_with("warehouse_connection"),
            )
            .with_block(
                "dbt_connection",
                NestedBlock::required_single(
                    Block::new()
                        .with_attribute("repository", Attribute::required_string())
                        .with_attribute("target", Attribute::optional_string()),
                ),
            )
            .with_block(
                "warehouse_connection",
                NestedBlock::single(
                    Block::new()
                        .with_attribute("project", Attribute::required_string())
                        .with_attribute("retries", Attribute::optional_int64()),
                )
                .with_conflicts_with("organization_warehouse_credentials_uuid"),
            )
    }

    fn valid_config() -> Value {
        json!({
            "name": "analytics",
            "type": "DEFAULT",
            "dbt_connection": {"repository": "acme/dbt"}
        })
    }

    #[test]
    fn test_valid_config() {
        let schema = project_like_schema();
        assert!(is_valid(&schema, &valid_config()));
        assert!(validate_result(&schema, &valid_config()).is_ok());
    }

    #[test]
    fn test_missing_required_attribute() {
        let schema = project_like_schema();
        let mut config = valid_config();
        config.as_object_mut().unwrap().remove("name");

        let diagnostics = validate(&schema, &config);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("Missing required attribute 'name'"));
    }

    #[test]
    fn test_missing_required_block() {
        let schema = project_like_schema();
        let diagnostics = validate(&schema, &json!({"name": "a", "type": "DEFAULT"}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute.as_deref(), Some("dbt_connection"));
    }

    #[test]
    fn test_nested_type_error_path() {
        let schema = project_like_schema();
        let mut config = valid_config();
        config["warehouse_connection"] = json!({"project": "gcp", "retries": "many"});

        let diagnostics = validate(&schema, &config);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].attribute.as_deref(),
            Some("warehouse_connection.retries")
        );
    }

    #[test]
    fn test_allowed_values() {
        let schema = project_like_schema();
        let mut config = valid_config();
        config["type"] = json!("STAGING");

        let diagnostics = validate(&schema, &config);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0]
            .detail
            .as_deref()
            .unwrap()
            .contains("expected one of: DEFAULT, PREVIEW"));
    }

    #[test]
    fn test_conflicting_attributes_reported_once() {
        let schema = project_like_schema();
        let mut config = valid_config();
        config["organization_warehouse_credentials_uuid"] = json!("creds-1");
        config["warehouse_connection"] = json!({"project": "gcp"});

        let diagnostics = validate(&schema, &config);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].summary, "Conflicting configuration");
        assert!(diagnostics[0]
            .detail
            .as_deref()
            .unwrap()
            .contains("mutually exclusive"));
    }

    #[test]
    fn test_conflict_ignores_null_sibling() {
        let schema = project_like_schema();
        let mut config = valid_config();
        config["organization_warehouse_credentials_uuid"] = json!("creds-1");
        config["warehouse_connection"] = Value::Null;

        assert!(is_valid(&schema, &config));
    }

    #[test]
    fn test_list_element_types() {
        let schema = Schema::v0().with_attribute("tags", Attribute::optional_string_list());
        assert!(is_valid(&schema, &json!({"tags": ["a", "b"]})));

        let diagnostics = validate(&schema, &json!({"tags": ["a", 2]}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute.as_deref(), Some("tags.1"));
    }

    #[test]
    fn test_computed_attributes_skipped() {
        let schema = project_like_schema();
        let mut config = valid_config();
        config["id"] = json!(42);
        assert!(is_valid(&schema, &config));
    }

    #[test]
    fn test_non_object_root() {
        let diagnostics = validate(&project_like_schema(), &json!("nope"));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].summary, "Expected object");
        assert!(diagnostics[0].attribute.is_none());
    }
}
