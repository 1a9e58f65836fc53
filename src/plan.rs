//! Plan computation: diff prior state against proposed state.
//!
//! The diff walks the schema rather than the JSON, so only declared attributes
//! are compared. A missing key and an explicit `null` are the same thing.
//! Single nested blocks are diffed attribute by attribute with dotted paths
//! (`dbt_connection.branch`); list blocks are compared as a whole.

use serde_json::{Map, Value};

use crate::schema::{Block, BlockNestingMode, Schema};
use crate::types::{AttributeChange, PlanResult};

/// Compute the plan for one resource instance.
///
/// `proposed` of `null` plans a destroy; `prior` of `None` plans a create.
pub fn plan(schema: &Schema, prior: Option<&Value>, proposed: &Value) -> PlanResult {
    match (prior, proposed) {
        (None, Value::Null) => PlanResult::no_change(Value::Null),
        (Some(prior), Value::Null) => {
            let changes = diff_block(&schema.block, "", prior, &Value::Null);
            PlanResult {
                planned_state: Value::Null,
                changes,
                requires_replace: false,
            }
        }
        (None, proposed) => {
            let changes = diff_block(&schema.block, "", &Value::Null, proposed);
            let changes = changes
                .into_iter()
                .map(|mut c| {
                    c.requires_replace = false;
                    c
                })
                .collect();
            PlanResult::with_changes(proposed.clone(), changes)
        }
        (Some(prior), proposed) => {
            let planned = carry_known_state(&schema.block, prior, proposed);
            let changes = diff_block(&schema.block, "", prior, &planned);
            if changes.is_empty() {
                PlanResult::no_change(planned)
            } else {
                PlanResult::with_changes(planned, changes)
            }
        }
    }
}

/// Paths whose change between `prior` and `planned` forces replacement.
pub fn replacement_paths(schema: &Schema, prior: &Value, planned: &Value) -> Vec<String> {
    let planned = carry_known_state(&schema.block, prior, planned);
    diff_block(&schema.block, "", prior, &planned)
        .into_iter()
        .filter(|c| c.requires_replace)
        .map(|c| c.path)
        .collect()
}

/// Fill computed attributes the configuration left unset from prior state.
///
/// Attributes flagged `use_state_for_unknown` keep their prior value; other
/// computed-only attributes do too, since nothing in configuration can set them.
fn carry_known_state(block: &Block, prior: &Value, proposed: &Value) -> Value {
    let (Some(prior_obj), Some(proposed_obj)) = (prior.as_object(), proposed.as_object()) else {
        return proposed.clone();
    };

    let mut planned: Map<String, Value> = proposed_obj.clone();
    for (name, attr) in &block.attributes {
        let unset = planned.get(name).map_or(true, Value::is_null);
        let carry = attr.use_state_for_unknown || attr.flags.is_computed_only();
        if unset && carry {
            if let Some(value) = prior_obj.get(name).filter(|v| !v.is_null()) {
                planned.insert(name.clone(), value.clone());
            }
        }
    }
    for (name, nested) in &block.blocks {
        if nested.nesting_mode != BlockNestingMode::Single {
            continue;
        }
        if let (Some(prior_child), Some(proposed_child)) = (prior_obj.get(name), planned.get(name)) {
            let merged = carry_known_state(&nested.block, prior_child, proposed_child);
            planned.insert(name.clone(), merged);
        }
    }
    Value::Object(planned)
}

fn field<'a>(value: &'a Value, name: &str) -> &'a Value {
    value.get(name).unwrap_or(&Value::Null)
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

fn diff_block(block: &Block, prefix: &str, before: &Value, after: &Value) -> Vec<AttributeChange> {
    let mut changes = Vec::new();

    for (name, attr) in &block.attributes {
        let old = field(before, name);
        let new = field(after, name);
        if old == new {
            continue;
        }
        let mut change = match (old.is_null(), new.is_null()) {
            (true, _) => AttributeChange::added(join(prefix, name), new.clone()),
            (false, true) => AttributeChange::removed(join(prefix, name), old.clone()),
            (false, false) => AttributeChange::modified(join(prefix, name), old.clone(), new.clone()),
        };
        if attr.requires_replace {
            change = change.forcing_replacement();
        }
        if attr.flags.sensitive {
            change = change.masked();
        }
        changes.push(change);
    }

    for (name, nested) in &block.blocks {
        let old = field(before, name);
        let new = field(after, name);
        if old == new {
            continue;
        }
        let path = join(prefix, name);
        let mut nested_changes = match nested.nesting_mode {
            BlockNestingMode::Single if !old.is_null() && !new.is_null() => {
                diff_block(&nested.block, &path, old, new)
            }
            _ => {
                let change = match (old.is_null(), new.is_null()) {
                    (true, _) => AttributeChange::added(path, new.clone()),
                    (false, true) => AttributeChange::removed(path, old.clone()),
                    (false, false) => AttributeChange::modified(path, old.clone(), new.clone()),
                };
                if nested.block.contains_sensitive() {
                    vec![change.masked()]
                } else {
                    vec![change]
                }
            }
        };
        if nested.requires_replace {
            nested_changes = nested_changes
                .into_iter()
                .map(AttributeChange::forcing_replacement)
                .collect();
        }
        changes.extend(nested_changes);
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Attribute, NestedBlock};
    use crate::types::SENSITIVE_PLACEHOLDER;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::v0()
            .with_attribute(
                "id",
                Attribute::computed_string().with_use_state_for_unknown(),
            )
            .with_attribute("name", Attribute::required_string())
            .with_attribute(
                "type",
                Attribute::required_string().with_requires_replace(),
            )
            .with_attribute("token", Attribute::computed_string().sensitive())
            .with_block(
                "dbt_connection",
                NestedBlock::required_single(
                    Block::new()
                        .with_attribute("branch", Attribute::required_string())
                        .with_attribute(
                            "personal_access_token",
                            Attribute::optional_string().sensitive(),
                        ),
                ),
            )
    }

    #[test]
    fn test_plan_create_lists_set_attributes() {
        let plan = plan(
            &schema(),
            None,
            &json!({"name": "a", "type": "DEFAULT", "dbt_connection": {"branch": "main"}}),
        );
        assert!(!plan.requires_replace);
        let paths: Vec<_> = plan.changes.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, vec!["name", "type", "dbt_connection"]);
    }

    #[test]
    fn test_plan_update_in_place() {
        let prior = json!({"id": "x", "name": "a", "type": "DEFAULT", "dbt_connection": {"branch": "main"}});
        let proposed = json!({"name": "b", "type": "DEFAULT", "dbt_connection": {"branch": "dev"}});
        let plan = plan(&schema(), Some(&prior), &proposed);

        assert!(!plan.requires_replace);
        assert_eq!(plan.planned_state["id"], "x");
        let paths: Vec<_> = plan.changes.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, vec!["name", "dbt_connection.branch"]);
    }

    #[test]
    fn test_plan_replace_on_immutable_change() {
        let prior = json!({"id": "x", "name": "a", "type": "DEFAULT"});
        let proposed = json!({"name": "a", "type": "PREVIEW"});
        let plan = plan(&schema(), Some(&prior), &proposed);
        assert!(plan.requires_replace);
        assert_eq!(plan.replace_paths(), vec!["type"]);
        assert_eq!(
            replacement_paths(&schema(), &prior, &proposed),
            vec!["type".to_string()]
        );
    }

    #[test]
    fn test_plan_no_change_keeps_computed_values() {
        let prior = json!({"id": "x", "name": "a", "type": "DEFAULT", "token": "secret"});
        let proposed = json!({"name": "a", "type": "DEFAULT"});
        let plan = plan(&schema(), Some(&prior), &proposed);
        assert!(plan.changes.is_empty());
        assert_eq!(plan.planned_state["token"], "secret");
    }

    #[test]
    fn test_sensitive_values_masked() {
        let prior = json!({"name": "a", "type": "DEFAULT", "dbt_connection": {"branch": "main", "personal_access_token": "old"}});
        let proposed = json!({"name": "a", "type": "DEFAULT", "dbt_connection": {"branch": "main", "personal_access_token": "new"}});
        let plan = plan(&schema(), Some(&prior), &proposed);
        assert_eq!(plan.changes.len(), 1);
        assert_eq!(plan.changes[0].path, "dbt_connection.personal_access_token");
        assert_eq!(plan.changes[0].before, Some(json!(SENSITIVE_PLACEHOLDER)));
        assert_eq!(plan.changes[0].after, Some(json!(SENSITIVE_PLACEHOLDER)));
    }

    #[test]
    fn test_missing_and_null_are_equal() {
        let prior = json!({"name": "a", "type": "DEFAULT", "dbt_connection": null});
        let proposed = json!({"name": "a", "type": "DEFAULT"});
        assert!(plan(&schema(), Some(&prior), &proposed).changes.is_empty());
    }

    #[test]
    fn test_plan_destroy() {
        let prior = json!({"id": "x", "name": "a", "type": "DEFAULT"});
        let plan = plan(&schema(), Some(&prior), &Value::Null);
        assert!(plan.planned_state.is_null());
        assert!(!plan.requires_replace);
        assert_eq!(plan.changes.len(), 3);
        assert!(plan.changes.iter().all(|c| c.after.is_none()));
    }
}
