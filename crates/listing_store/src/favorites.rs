//! Per-identity favorite sets.

use entities::ListingId;
use serde::{Deserialize, Serialize};

/// Prefix of the per-identity favorites storage keys.
pub const STORAGE_KEY_FAVORITES_PREFIX: &str = "favorites_storage_key";

/// Identity used for favorites when nobody is signed in.
pub const ANONYMOUS_IDENTITY: &str = "anonymous";

/// Returns the storage key holding the favorites of `identity`.
pub fn favorites_key(identity: Option<&str>) -> String {
    format!(
        "{}_{}",
        STORAGE_KEY_FAVORITES_PREFIX,
        identity.unwrap_or(ANONYMOUS_IDENTITY)
    )
}

/// Listing identifiers marked as favorite by one identity.
///
/// Insertion order is kept; membership is idempotent. Stored as a JSON array,
/// with duplicates dropped on read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ListingId>", into = "Vec<ListingId>")]
pub struct FavoriteSet(Vec<ListingId>);

impl FavoriteSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `id` is in the set.
    pub fn contains(&self, id: &ListingId) -> bool {
        self.0.contains(id)
    }

    /// Adds `id`. Returns false if it was already present.
    pub fn insert(&mut self, id: ListingId) -> bool {
        if self.contains(&id) {
            return false;
        }
        self.0.push(id);
        true
    }

    /// Removes `id`. Returns false if it was absent.
    pub fn remove(&mut self, id: &ListingId) -> bool {
        let before = self.0.len();
        self.0.retain(|fav| fav != id);
        self.0.len() != before
    }

    /// Flips membership of `id`. Returns the new membership.
    pub fn toggle(&mut self, id: ListingId) -> bool {
        if self.remove(&id) {
            false
        } else {
            self.insert(id)
        }
    }

    /// Returns the identifiers in insertion order.
    pub fn ids(&self) -> &[ListingId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<ListingId> for FavoriteSet {
    fn from_iter<I: IntoIterator<Item = ListingId>>(iter: I) -> Self {
        let mut set = Self::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

impl From<Vec<ListingId>> for FavoriteSet {
    fn from(ids: Vec<ListingId>) -> Self {
        ids.into_iter().collect()
    }
}

impl From<FavoriteSet> for Vec<ListingId> {
    fn from(set: FavoriteSet) -> Self {
        set.0
    }
}
