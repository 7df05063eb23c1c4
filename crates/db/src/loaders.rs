//! Batched lookups.
//!
//! A batch loader receives a key list, fetches every matching row in one
//! statement, and must answer with one group per requested key in request
//! order. Keys without rows get an empty group (or `None`), never an error.
//! An empty key list answers without touching the database.

use std::collections::HashMap;
use std::hash::Hash;

use flock_core::error::CoreError;
use flock_core::types::DbId;

use crate::gateway::Gateway;
use crate::models::ministry_delegation::{MinistryDelegation, MinistryDelegationFilter};
use crate::models::person::{Person, PersonFilter};
use crate::repositories::{MinistryDelegationRepo, PersonRepo};

/// 1:1 grouping: the item for each key, in key order.
pub fn group_one<K, T, F>(keys: &[K], items: Vec<T>, key_of: F) -> Vec<Option<T>>
where
    K: Eq + Hash,
    T: Clone,
    F: Fn(&T) -> K,
{
    let by_key: HashMap<K, T> = items.into_iter().map(|item| (key_of(&item), item)).collect();
    keys.iter().map(|k| by_key.get(k).cloned()).collect()
}

/// 1:N grouping: every item for each key, in key order. Item order within a
/// group follows the input order.
pub fn group_many<K, T, F>(keys: &[K], items: Vec<T>, key_of: F) -> Vec<Vec<T>>
where
    K: Eq + Hash,
    T: Clone,
    F: Fn(&T) -> K,
{
    let mut by_key: HashMap<K, Vec<T>> = HashMap::new();
    for item in items {
        by_key.entry(key_of(&item)).or_default().push(item);
    }
    keys.iter()
        .map(|k| by_key.get(k).cloned().unwrap_or_default())
        .collect()
}

/// People by id.
pub async fn load_people(
    gw: &dyn Gateway,
    ids: &[DbId],
) -> Result<Vec<Option<Person>>, CoreError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let filter = PersonFilter {
        ids: Some(ids.to_vec()),
        ..PersonFilter::default()
    };
    let rows = PersonRepo::get_people(gw, &filter).await?;
    Ok(group_one(ids, rows, |p| p.record.id))
}

/// Members of each household.
pub async fn load_people_by_household(
    gw: &dyn Gateway,
    household_ids: &[DbId],
) -> Result<Vec<Vec<Person>>, CoreError> {
    if household_ids.is_empty() {
        return Ok(Vec::new());
    }
    let filter = PersonFilter {
        household_ids: Some(household_ids.to_vec()),
        ..PersonFilter::default()
    };
    let rows = PersonRepo::get_people(gw, &filter).await?;
    Ok(group_many(household_ids, rows, |p| p.household.id))
}

/// Delegations of each ministry.
pub async fn load_delegations_by_ministry(
    gw: &dyn Gateway,
    ministry_ids: &[DbId],
) -> Result<Vec<Vec<MinistryDelegation>>, CoreError> {
    if ministry_ids.is_empty() {
        return Ok(Vec::new());
    }
    let filter = MinistryDelegationFilter {
        ministry_ids: Some(ministry_ids.to_vec()),
        ..MinistryDelegationFilter::default()
    };
    let rows = MinistryDelegationRepo::get_delegations(gw, &filter).await?;
    Ok(group_many(ministry_ids, rows, |d| d.ministry.id))
}
