use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;

use crate::model::{EntityKind, Id, ReferenceField, ReferenceKey};

/// A stored entity together with the schema the core needs to write it:
/// which of its serialized fields name other entities, and how others name it.
pub trait Entity: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Caller-supplied document for create and full replace.
    type Draft: Serialize + DeserializeOwned + Debug + Send + Sync;

    const KIND: EntityKind;

    /// Foreign-key-shaped fields, in declaration order. Validation visits them in this order.
    const REFERENCES: &'static [ReferenceField] = &[];

    const REFERENCE_KEY: ReferenceKey = ReferenceKey::Primary;

    /// Serialized keys that are system-assigned and never taken from a caller document.
    const READ_ONLY: &'static [&'static str] = &["id"];

    fn id(&self) -> &Id;

    /// The value other entities store when they reference this one.
    fn reference_value(&self) -> &str {
        self.id()
    }

    fn from_draft(id: Id, draft: Self::Draft, now: DateTime<Utc>) -> Self;

    /// Full replacement of every mutable field; system-assigned fields are kept.
    fn replaced_by(&self, draft: Self::Draft) -> Self;
}
