use log::debug;
use serde_json::Value;

use crate::logic::error::{ServiceError, ServiceResult};
use crate::logic::resolve::ExistenceResolver;
use crate::model::{EntityKind, Id, PatchDocument, ReferenceField};

/// A reference that was checked and found to exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedReference {
    pub field: &'static str,
    pub target: EntityKind,
    pub key: Id,
}

/// Check every present, non-null reference in `candidate` against the store.
///
/// Fields are visited in `schema` order and the first missing target fails the whole
/// call, so the same input always reports the same field. Fields absent from
/// `candidate` are not looked at: a patch only pays for the references it touches.
pub async fn validate_references<R>(
    resolver: &R,
    schema: &[ReferenceField],
    candidate: &PatchDocument,
) -> ServiceResult<Vec<ResolvedReference>>
where
    R: ExistenceResolver + ?Sized,
{
    let mut resolved = Vec::new();

    for field in schema {
        let Some(value) = candidate.get(field.name) else {
            continue;
        };

        let key = match value {
            Value::Null if field.required => {
                return Err(ServiceError::InvalidDocument(format!(
                    "{} is required and cannot be null",
                    field.name
                )))
            }
            Value::Null => continue,
            Value::String(key) => key,
            other => {
                return Err(ServiceError::InvalidDocument(format!(
                    "{} must be a string reference, got {}",
                    field.name, other
                )))
            }
        };

        if !resolver.exists(field.target, key).await? {
            debug!(
                "Reference check failed: {} -> {} '{}'",
                field.name, field.target, key
            );
            return Err(ServiceError::reference_not_found(field.name, field.target, key.as_str()));
        }

        resolved.push(ResolvedReference {
            field: field.name,
            target: field.target,
            key: key.clone(),
        });
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use parking_lot::Mutex;
    use serde_json::json;
    use std::collections::HashSet;

    /// Resolver over a fixed set of (kind, key) pairs that records every lookup.
    struct FixedResolver {
        known: HashSet<(EntityKind, String)>,
        lookups: Mutex<Vec<String>>,
        fail: bool,
    }

    impl FixedResolver {
        fn new(known: &[(EntityKind, &str)]) -> Self {
            Self {
                known: known.iter().map(|(k, v)| (*k, v.to_string())).collect(),
                lookups: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new(&[])
            }
        }
    }

    #[async_trait::async_trait]
    impl ExistenceResolver for FixedResolver {
        async fn exists(&self, kind: EntityKind, key: &str) -> Result<bool> {
            self.lookups.lock().push(key.to_string());
            if self.fail {
                return Err(anyhow!("store unreachable"));
            }
            Ok(self.known.contains(&(kind, key.to_string())))
        }
    }

    const SCHEMA: &[ReferenceField] = &[
        ReferenceField::required("project", EntityKind::Project),
        ReferenceField::required("creator", EntityKind::User),
        ReferenceField::optional("assignedSecondary", EntityKind::User),
    ];

    fn doc(value: serde_json::Value) -> PatchDocument {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_all_references_resolve() {
        let resolver = FixedResolver::new(&[(EntityKind::Project, "apollo"), (EntityKind::User, "u1")]);
        let candidate = doc(json!({ "project": "apollo", "creator": "u1", "title": "x" }));

        let resolved = validate_references(&resolver, SCHEMA, &candidate).await.unwrap();
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].field, "project");
        assert_eq!(resolved[1].key, "u1");
    }

    #[tokio::test]
    async fn test_short_circuits_on_first_missing_in_declaration_order() {
        let resolver = FixedResolver::new(&[(EntityKind::User, "u1")]);
        // Both project and assignedSecondary are missing; project is declared first.
        let candidate = doc(json!({
            "assignedSecondary": "ghost",
            "creator": "u1",
            "project": "nowhere"
        }));

        let err = validate_references(&resolver, SCHEMA, &candidate).await.unwrap_err();
        match err {
            ServiceError::ReferenceNotFound { field, target, key } => {
                assert_eq!(field, "project");
                assert_eq!(target, EntityKind::Project);
                assert_eq!(key, "nowhere");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(*resolver.lookups.lock(), vec!["nowhere".to_string()]);
    }

    #[tokio::test]
    async fn test_absent_and_null_optional_fields_are_skipped() {
        let resolver = FixedResolver::new(&[]);
        let candidate = doc(json!({ "assignedSecondary": null, "title": "only a title" }));

        let resolved = validate_references(&resolver, SCHEMA, &candidate).await.unwrap();
        assert!(resolved.is_empty());
        assert!(resolver.lookups.lock().is_empty());
    }

    #[tokio::test]
    async fn test_null_required_reference_is_invalid() {
        let resolver = FixedResolver::new(&[]);
        let candidate = doc(json!({ "creator": null }));

        let err = validate_references(&resolver, SCHEMA, &candidate).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidDocument(_)));
    }

    #[tokio::test]
    async fn test_non_string_reference_is_invalid() {
        let resolver = FixedResolver::new(&[]);
        let candidate = doc(json!({ "creator": 42 }));

        let err = validate_references(&resolver, SCHEMA, &candidate).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidDocument(_)));
    }

    #[tokio::test]
    async fn test_store_failure_is_propagated_not_masked() {
        let resolver = FixedResolver::failing();
        let candidate = doc(json!({ "project": "apollo" }));

        let err = validate_references(&resolver, SCHEMA, &candidate).await.unwrap_err();
        assert!(matches!(err, ServiceError::Storage(_)));
    }
}
