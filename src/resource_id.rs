//! Composite resource identifiers.
//!
//! Every managed entity is tracked under a slash-separated path such as
//! `organizations/<organization_uuid>/projects/<project_uuid>`. The same
//! string is accepted as the import argument, so parsing is strict: literal
//! segments must match exactly and every placeholder must be non-empty.

use crate::error::ProviderError;

/// A fixed composite ID grammar, written as a template with `{name}` placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdPattern {
    template: &'static str,
}

impl IdPattern {
    /// Create a pattern from a template like `organizations/{org}/projects/{project}`.
    pub const fn new(template: &'static str) -> Self {
        Self { template }
    }

    /// Human-readable shape used in error messages.
    pub fn expected(&self) -> String {
        self.template.replace('{', "<").replace('}', ">")
    }

    /// Number of placeholders in the template.
    pub fn arity(&self) -> usize {
        self.template.split('/').filter(|s| is_placeholder(s)).count()
    }

    /// Render an ID by substituting `values` for the placeholders, in order.
    pub fn format(&self, values: &[&str]) -> String {
        let mut values = values.iter();
        self.template
            .split('/')
            .map(|segment| {
                if is_placeholder(segment) {
                    values.next().copied().unwrap_or_default()
                } else {
                    segment
                }
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Extract the placeholder values from `id`, in template order.
    pub fn parse<const N: usize>(&self, id: &str) -> Result<[String; N], ProviderError> {
        let invalid = || ProviderError::InvalidImportId {
            id: id.to_string(),
            expected: self.expected(),
        };

        let template: Vec<&str> = self.template.split('/').collect();
        let segments: Vec<&str> = id.split('/').collect();
        if template.len() != segments.len() {
            return Err(invalid());
        }

        let mut values = Vec::with_capacity(N);
        for (expected, actual) in template.iter().zip(&segments) {
            if is_placeholder(expected) {
                if actual.trim().is_empty() {
                    return Err(invalid());
                }
                values.push(actual.to_string());
            } else if expected != actual {
                return Err(invalid());
            }
        }

        values.try_into().map_err(|_| invalid())
    }
}

fn is_placeholder(segment: &str) -> bool {
    segment.len() > 2 && segment.starts_with('{') && segment.ends_with('}')
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROJECT: IdPattern = IdPattern::new("organizations/{organization_uuid}/projects/{project_uuid}");
    const TOKEN: IdPattern = IdPattern::new("personal-access-tokens/{token_uuid}");

    #[test]
    fn test_parse_project_id() {
        let [org, project] = PROJECT.parse("organizations/org-1/projects/proj-2").unwrap();
        assert_eq!(org, "org-1");
        assert_eq!(project, "proj-2");
    }

    #[test]
    fn test_format_matches_parse() {
        let id = PROJECT.format(&["org-1", "proj-2"]);
        assert_eq!(id, "organizations/org-1/projects/proj-2");
        let [token] = TOKEN.parse(&TOKEN.format(&["tok-1"])).unwrap();
        assert_eq!(token, "tok-1");
    }

    #[test]
    fn test_expected_shape() {
        assert_eq!(
            PROJECT.expected(),
            "organizations/<organization_uuid>/projects/<project_uuid>"
        );
        assert_eq!(PROJECT.arity(), 2);
        assert_eq!(TOKEN.arity(), 1);
    }

    #[test]
    fn test_rejects_malformed_ids() {
        for id in [
            "not-a-valid-id",
            "",
            "organizations/org-1",
            "organizations//projects/proj-2",
            "orgs/org-1/projects/proj-2",
            "organizations/org-1/projects/proj-2/extra",
            "organizations/org-1/spaces/proj-2",
        ] {
            let err = PROJECT.parse::<2>(id).unwrap_err();
            match err {
                ProviderError::InvalidImportId { id: got, expected } => {
                    assert_eq!(got, id);
                    assert_eq!(
                        expected,
                        "organizations/<organization_uuid>/projects/<project_uuid>"
                    );
                }
                other => panic!("unexpected error for {id:?}: {other:?}"),
            }
        }
    }
}
