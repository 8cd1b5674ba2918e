//! Named host permissions and the outcome of requesting them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const WRITE_EXTERNAL_STORAGE: &str = "android.permission.WRITE_EXTERNAL_STORAGE";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(String);

impl Permission {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn write_external_storage() -> Self {
        Self::new(WRITE_EXTERNAL_STORAGE)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Permissions requested together as one unit. Keeps request order and
/// drops duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PermissionSet {
    permissions: Vec<Permission>,
}

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The set the gate asks for when scoped storage is not granted.
    pub fn storage() -> Self {
        std::iter::once(Permission::write_external_storage()).collect()
    }

    pub fn insert(&mut self, permission: Permission) -> bool {
        if self.permissions.contains(&permission) {
            return false;
        }
        self.permissions.push(permission);
        true
    }

    pub fn contains(&self, permission: &Permission) -> bool {
        self.permissions.contains(permission)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.permissions.iter()
    }

    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        let mut set = Self::new();
        for permission in iter {
            set.insert(permission);
        }
        set
    }
}

/// Grant or deny result for each permission in a request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PermissionOutcome {
    results: BTreeMap<Permission, bool>,
}

impl PermissionOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    /// Outcome where every permission in `set` received the same answer.
    pub fn uniform(set: &PermissionSet, granted: bool) -> Self {
        set.iter().cloned().map(|p| (p, granted)).collect()
    }

    pub fn with(mut self, permission: Permission, granted: bool) -> Self {
        self.record(permission, granted);
        self
    }

    pub fn record(&mut self, permission: Permission, granted: bool) {
        self.results.insert(permission, granted);
    }

    pub fn get(&self, permission: &Permission) -> Option<bool> {
        self.results.get(permission).copied()
    }

    /// Permissions from `requested` that were denied or never answered.
    pub fn denied<'a>(&self, requested: &'a PermissionSet) -> Vec<&'a Permission> {
        requested
            .iter()
            .filter(|p| self.get(p) != Some(true))
            .collect()
    }

    pub fn all_granted(&self, requested: &PermissionSet) -> bool {
        self.denied(requested).is_empty()
    }
}

impl FromIterator<(Permission, bool)> for PermissionOutcome {
    fn from_iter<I: IntoIterator<Item = (Permission, bool)>>(iter: I) -> Self {
        Self {
            results: iter.into_iter().collect(),
        }
    }
}

/// Host permission system.
///
/// `request` only starts the request; the host answers later, exactly once,
/// by handing a [`PermissionOutcome`] back to the gating controller on the
/// same execution context.
pub trait PermissionBroker {
    fn is_granted(&self, permission: &Permission) -> bool;

    fn request(&mut self, permissions: &PermissionSet);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_set_keeps_order_and_drops_duplicates() {
        let set: PermissionSet = ["b", "a", "b"].into_iter().map(Permission::new).collect();

        let names: Vec<&str> = set.iter().map(Permission::as_str).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_storage_set_contains_write_permission() {
        let set = PermissionSet::storage();

        assert_eq!(set.len(), 1);
        assert!(set.contains(&Permission::write_external_storage()));
    }

    #[test]
    fn test_missing_answer_counts_as_denied() {
        let requested: PermissionSet = ["a", "b"].into_iter().map(Permission::new).collect();
        let outcome = PermissionOutcome::new().with(Permission::new("a"), true);

        assert!(!outcome.all_granted(&requested));
        assert_eq!(outcome.denied(&requested), vec![&Permission::new("b")]);
    }

    #[test]
    fn test_extra_answers_are_ignored() {
        let requested = PermissionSet::storage();
        let outcome = PermissionOutcome::uniform(&requested, true)
            .with(Permission::new("android.permission.CAMERA"), false);

        assert!(outcome.all_granted(&requested));
    }

    #[test]
    fn test_later_answer_replaces_earlier_one() {
        let mut outcome = PermissionOutcome::new();
        outcome.record(Permission::new("a"), false);
        outcome.record(Permission::new("a"), true);

        assert_eq!(outcome.get(&Permission::new("a")), Some(true));
    }
}
