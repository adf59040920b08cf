//! Listing store
//!
//! Holds the global listing collection and the favorite set of the active
//! identity. Every mutation updates memory first and then writes the affected
//! record; a failed write is logged and returned without rolling memory back.

use std::sync::Arc;

use entities::{Listing, ListingDraft, ListingId, ListingUpdate, User};
use kv_store::{load_json, save_json, KeyValueStore};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::{default_catalog, favorites_key, FavoriteSet, ListingStoreError, ListingStoreResult};

/// Storage key of the listing collection.
pub const STORAGE_KEY_LISTINGS: &str = "properties_storage_key";

#[derive(Debug, Default)]
struct ListingState {
    listings: Vec<Listing>,
    identity: Option<String>,
    favorites: FavoriteSet,
}

/// Owns the listing collection and the active identity's favorites.
pub struct ListingStore {
    storage: Arc<dyn KeyValueStore>,
    state: RwLock<ListingState>,
    seed_catalog: bool,
}

impl ListingStore {
    /// Creates an empty store. Call [`ListingStore::load`] to mount it.
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            state: RwLock::new(ListingState::default()),
            seed_catalog: true,
        }
    }

    /// Sets whether the default catalog is written on first run.
    pub fn with_seed_catalog(mut self, seed_catalog: bool) -> Self {
        self.seed_catalog = seed_catalog;
        self
    }

    /// Reloads the listing collection and the favorites of `identity`.
    ///
    /// A missing collection is seeded with the default catalog. A missing
    /// favorite set starts empty and is not written until first mutation.
    /// Unreadable records fall back to the same defaults.
    pub async fn load(&self, identity: Option<String>) {
        let listings = self.load_listings().await;
        let favorites = self.load_favorites(identity.as_deref()).await;

        tracing::debug!(
            identity = identity.as_deref(),
            listings = listings.len(),
            favorites = favorites.len(),
            "Loaded listing state"
        );

        let mut state = self.state.write().await;
        state.listings = listings;
        state.identity = identity;
        state.favorites = favorites;
    }

    /// Reloads for `identity` if it differs from the current one.
    ///
    /// Returns true if a reload happened.
    pub async fn switch_identity(&self, identity: Option<String>) -> bool {
        if self.state.read().await.identity == identity {
            return false;
        }
        tracing::info!(identity = identity.as_deref(), "Switching favorites identity");
        self.load(identity).await;
        true
    }

    /// Adds a listing in front of the collection.
    ///
    /// Returns false, without writing, if a listing with the same identifier
    /// already exists.
    pub async fn add_listing(&self, listing: Listing) -> ListingStoreResult<bool> {
        let id = listing.id.clone();
        let listings = {
            let mut state = self.state.write().await;
            if state.listings.iter().any(|l| l.id == id) {
                tracing::warn!(listing_id = %id, "Listing rejected, identifier in use");
                return Ok(false);
            }
            state.listings.insert(0, listing);
            state.listings.clone()
        };

        tracing::info!(listing_id = %id, "Added listing");
        self.persist(STORAGE_KEY_LISTINGS, &listings).await?;
        Ok(true)
    }

    /// Publishes `draft` as a listing owned by `owner`.
    ///
    /// The new identifier is a timestamp greater than every numeric identifier
    /// already in the collection.
    pub async fn publish_listing(
        &self,
        draft: ListingDraft,
        owner: &User,
    ) -> ListingStoreResult<Listing> {
        let (listing, listings) = {
            let mut state = self.state.write().await;
            let id = ListingId::next_after(state.listings.iter().map(|l| &l.id));
            let listing = draft.publish_as(id, owner);
            state.listings.insert(0, listing.clone());
            (listing, state.listings.clone())
        };

        tracing::info!(listing_id = %listing.id, user_id = %owner.id, "Published listing");
        self.persist(STORAGE_KEY_LISTINGS, &listings).await?;
        Ok(listing)
    }

    /// Deletes a listing and drops it from the active identity's favorites.
    ///
    /// Other identities' favorite sets are left untouched. Returns false if no
    /// listing had this identifier.
    pub async fn delete_listing(&self, id: &ListingId) -> ListingStoreResult<bool> {
        let (removed, listings, favorites) = {
            let mut state = self.state.write().await;
            let before = state.listings.len();
            state.listings.retain(|l| &l.id != id);
            let removed = state.listings.len() != before;

            let favorites = if state.favorites.remove(id) {
                Some((favorites_key(state.identity.as_deref()), state.favorites.clone()))
            } else {
                None
            };
            (removed, state.listings.clone(), favorites)
        };

        tracing::info!(listing_id = %id, removed, "Deleted listing");

        let saved_listings = self.persist(STORAGE_KEY_LISTINGS, &listings).await;
        let saved_favorites = match favorites {
            Some((key, favorites)) => self.persist(&key, &favorites).await,
            None => Ok(()),
        };
        saved_listings.and(saved_favorites)?;
        Ok(removed)
    }

    /// Merges `update` onto the listing with the same identifier.
    ///
    /// Returns false if no listing matched.
    pub async fn modify_listing(&self, update: ListingUpdate) -> ListingStoreResult<bool> {
        let (found, listings) = {
            let mut state = self.state.write().await;
            let found = match state.listings.iter_mut().find(|l| l.id == update.id) {
                Some(listing) => {
                    listing.apply(&update);
                    true
                }
                None => false,
            };
            (found, state.listings.clone())
        };

        if found {
            tracing::info!(listing_id = %update.id, "Modified listing");
        } else {
            tracing::warn!(listing_id = %update.id, "Modify requested for unknown listing");
        }

        self.persist(STORAGE_KEY_LISTINGS, &listings).await?;
        Ok(found)
    }

    /// Marks `id` as favorite. Returns false if it already was.
    pub async fn add_favorite(&self, id: ListingId) -> ListingStoreResult<bool> {
        self.update_favorites(|favorites| favorites.insert(id)).await
    }

    /// Unmarks `id` as favorite. Returns false if it was not marked.
    pub async fn remove_favorite(&self, id: &ListingId) -> ListingStoreResult<bool> {
        self.update_favorites(|favorites| favorites.remove(id)).await
    }

    /// Flips the favorite mark of `id`. Returns the new membership.
    pub async fn toggle_favorite(&self, id: ListingId) -> ListingStoreResult<bool> {
        let mut is_favorite = false;
        self.update_favorites(|favorites| {
            is_favorite = favorites.toggle(id);
            true
        })
        .await?;
        Ok(is_favorite)
    }

    /// Returns every listing, newest first.
    pub async fn listings(&self) -> Vec<Listing> {
        self.state.read().await.listings.clone()
    }

    /// Returns the listing with identifier `id`.
    pub async fn listing(&self, id: &ListingId) -> Option<Listing> {
        let state = self.state.read().await;
        state.listings.iter().find(|l| &l.id == id).cloned()
    }

    /// Returns the listings whose title or location contains `query`,
    /// ignoring case. A blank query matches everything.
    pub async fn search(&self, query: &str) -> Vec<Listing> {
        let query = query.trim();
        let state = self.state.read().await;
        state
            .listings
            .iter()
            .filter(|l| query.is_empty() || l.matches(query))
            .cloned()
            .collect()
    }

    /// Returns the listings published by `user_id`.
    pub async fn listings_owned_by(&self, user_id: &str) -> Vec<Listing> {
        let state = self.state.read().await;
        state
            .listings
            .iter()
            .filter(|l| l.is_owned_by(user_id))
            .cloned()
            .collect()
    }

    /// Returns the active identity's favorite identifiers.
    pub async fn favorites(&self) -> FavoriteSet {
        self.state.read().await.favorites.clone()
    }

    /// Returns true if `id` is a favorite of the active identity.
    pub async fn is_favorite(&self, id: &ListingId) -> bool {
        self.state.read().await.favorites.contains(id)
    }

    /// Returns the favorite listings, in collection order.
    ///
    /// Favorites pointing at deleted listings are skipped.
    pub async fn favorite_listings(&self) -> Vec<Listing> {
        let state = self.state.read().await;
        state
            .listings
            .iter()
            .filter(|l| state.favorites.contains(&l.id))
            .cloned()
            .collect()
    }

    /// Returns the identity whose favorites are loaded.
    pub async fn identity(&self) -> Option<String> {
        self.state.read().await.identity.clone()
    }

    async fn load_listings(&self) -> Vec<Listing> {
        match load_json::<Vec<Listing>>(self.storage.as_ref(), STORAGE_KEY_LISTINGS).await {
            Ok(Some(listings)) => listings,
            Ok(None) if self.seed_catalog => {
                tracing::info!("No saved listings, seeding default catalog");
                let catalog = default_catalog();
                // Already logged; the catalog is still used in memory.
                let _ = self.persist(STORAGE_KEY_LISTINGS, &catalog).await;
                catalog
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load listings, using default catalog");
                default_catalog()
            }
        }
    }

    async fn load_favorites(&self, identity: Option<&str>) -> FavoriteSet {
        let key = favorites_key(identity);
        match load_json::<FavoriteSet>(self.storage.as_ref(), &key).await {
            Ok(favorites) => favorites.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to load favorites, starting empty");
                FavoriteSet::new()
            }
        }
    }

    /// Applies `change` to the active favorites and persists them if it
    /// reports a modification.
    async fn update_favorites<F>(&self, change: F) -> ListingStoreResult<bool>
    where
        F: FnOnce(&mut FavoriteSet) -> bool,
    {
        let pending = {
            let mut state = self.state.write().await;
            if change(&mut state.favorites) {
                Some((favorites_key(state.identity.as_deref()), state.favorites.clone()))
            } else {
                None
            }
        };

        match pending {
            Some((key, favorites)) => {
                tracing::debug!(key = %key, favorites = favorites.len(), "Updated favorites");
                self.persist(&key, &favorites).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn persist<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> ListingStoreResult<()> {
        save_json(self.storage.as_ref(), key, value).await.map_err(|e| {
            tracing::error!(key, error = %e, "Failed to persist listing state");
            ListingStoreError::from(e)
        })
    }
}
