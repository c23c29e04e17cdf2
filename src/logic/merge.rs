use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::logic::error::{ServiceError, ServiceResult};
use crate::model::PatchDocument;

/// Shallow merge: every key present in `patch` (explicit `null` included) replaces the
/// key in `base`; keys absent from `patch` keep their `base` value.
pub fn merge(base: &PatchDocument, patch: &PatchDocument) -> PatchDocument {
    let mut merged = base.clone();
    for (key, value) in patch {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Serialize any document into a key/value map.
pub fn to_document<T: Serialize>(value: &T) -> ServiceResult<PatchDocument> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(ServiceError::InvalidDocument(format!(
            "expected an object, got {other}"
        ))),
    }
}

/// Drop keys the caller is never allowed to write.
pub fn without_keys(patch: &PatchDocument, read_only: &[&str]) -> PatchDocument {
    patch
        .iter()
        .filter(|(key, _)| !read_only.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Apply `patch` to a typed value and read the result back as the same type.
pub fn merge_into<T>(base: &T, patch: &PatchDocument) -> ServiceResult<T>
where
    T: Serialize + DeserializeOwned,
{
    let merged = merge(&to_document(base)?, patch);
    Ok(serde_json::from_value(Value::Object(merged))?)
}
