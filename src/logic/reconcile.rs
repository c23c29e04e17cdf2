use itertools::Itertools;
use log::info;
use std::collections::BTreeSet;

use crate::logic::error::{ServiceError, ServiceResult};
use crate::logic::resolve::ExistenceResolver;
use crate::model::{Association, Id};
use crate::store::traits::{MembershipStore, Store};

/// A member set whose every key was found to exist. Only `prepare_members` builds one,
/// so nothing reaches `commit_members` unchecked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedMembers {
    association: Association,
    members: BTreeSet<Id>,
}

impl PreparedMembers {
    pub fn into_members(self) -> BTreeSet<Id> {
        self.members
    }
}

/// Check every desired member before anything is written. Duplicates collapse; the
/// first missing key (in caller order) fails the whole set.
pub async fn prepare_members<R>(
    resolver: &R,
    association: Association,
    desired: &[Id],
) -> ServiceResult<PreparedMembers>
where
    R: ExistenceResolver + ?Sized,
{
    let mut members = BTreeSet::new();
    for key in desired.iter().unique() {
        if !resolver.exists(association.target, key).await? {
            return Err(ServiceError::reference_not_found(
                association.name,
                association.target,
                key.as_str(),
            ));
        }
        members.insert(key.clone());
    }

    Ok(PreparedMembers {
        association,
        members,
    })
}

/// Swap the owner's whole association set for the prepared one in a single write.
pub async fn commit_members<S>(
    store: &S,
    owner_id: &str,
    prepared: PreparedMembers,
) -> ServiceResult<BTreeSet<Id>>
where
    S: MembershipStore + ?Sized,
{
    store
        .replace_members(prepared.association.name, owner_id, &prepared.members)
        .await?;
    info!(
        "Replaced {} of {} '{}' ({} members)",
        prepared.association.name,
        prepared.association.owner,
        owner_id,
        prepared.members.len()
    );
    Ok(prepared.into_members())
}

/// Validate then replace: all-or-nothing. An empty `desired` clears the association.
pub async fn reconcile<S: Store>(
    store: &S,
    owner_id: &str,
    association: Association,
    desired: &[Id],
) -> ServiceResult<BTreeSet<Id>> {
    let prepared = prepare_members(store, association, desired).await?;
    commit_members(store, owner_id, prepared).await
}
