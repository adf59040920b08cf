//! Application context.

use std::sync::Arc;

use auth::AuthStore;
use entities::{Listing, ListingDraft, ListingId, ListingUpdate, NewUser, ProfileUpdate, User};
use kv_store::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
use listing_store::ListingStore;

use crate::config::{Config, StorageBackend};
use crate::error::{AppError, AppResult};

/// The stores a UI host needs, sharing one storage medium.
///
/// Session-changing operations go through the context so the listing store
/// always follows the active identity.
pub struct AppContext {
    config: Config,
    auth: AuthStore,
    listings: ListingStore,
}

impl AppContext {
    /// Opens the storage medium named by `config` and builds the stores.
    pub async fn open(config: Config) -> AppResult<Self> {
        let storage: Arc<dyn KeyValueStore> = match &config.storage {
            StorageBackend::Memory => Arc::new(MemoryKeyValueStore::new()),
            StorageBackend::File(dir) => Arc::new(FileKeyValueStore::open(dir.clone()).await?),
        };
        Ok(Self::with_storage(config, storage))
    }

    /// Builds the stores over an existing storage medium.
    pub fn with_storage(config: Config, storage: Arc<dyn KeyValueStore>) -> Self {
        let auth = AuthStore::new(storage.clone());
        let listings = ListingStore::new(storage).with_seed_catalog(config.seed_catalog);
        Self {
            config,
            auth,
            listings,
        }
    }

    /// Restores the session, then the listings and favorites for it.
    pub async fn load(&self) {
        self.auth.load().await;
        let identity = self.auth.active_identity().await;
        self.listings.load(identity.clone()).await;
        tracing::info!(user_id = identity.as_deref(), "Application state loaded");
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the auth store for read access.
    pub fn auth(&self) -> &AuthStore {
        &self.auth
    }

    /// Returns the listing store.
    pub fn listings(&self) -> &ListingStore {
        &self.listings
    }

    /// Registers and signs in a new user.
    pub async fn register(&self, candidate: NewUser) -> AppResult<bool> {
        let result = self.auth.register(candidate).await;
        self.sync_identity().await;
        Ok(result?)
    }

    /// Signs in.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<bool> {
        let result = self.auth.login(email, password).await;
        self.sync_identity().await;
        Ok(result?)
    }

    /// Signs out. Favorites switch to the anonymous set.
    pub async fn logout(&self) -> AppResult<()> {
        let result = self.auth.logout().await;
        self.sync_identity().await;
        Ok(result?)
    }

    /// Updates the signed-in user's profile.
    pub async fn update_profile(&self, update: ProfileUpdate) -> AppResult<bool> {
        Ok(self.auth.update_profile(update).await?)
    }

    /// Publishes a draft as a listing owned by the signed-in user.
    pub async fn publish_listing(&self, draft: ListingDraft) -> AppResult<Listing> {
        let owner = self.signed_in_user().await?;
        Ok(self.listings.publish_listing(draft, &owner).await?)
    }

    /// Applies `update` to a listing owned by the signed-in user.
    ///
    /// Returns false if the listing does not exist or belongs to someone else.
    pub async fn edit_listing(&self, update: ListingUpdate) -> AppResult<bool> {
        let owner = self.signed_in_user().await?;
        if !self.owns(&owner, &update.id).await {
            tracing::warn!(
                user_id = %owner.id,
                listing_id = %update.id,
                "Edit rejected, not the owner"
            );
            return Ok(false);
        }
        Ok(self.listings.modify_listing(update).await?)
    }

    /// Deletes a listing owned by the signed-in user.
    ///
    /// Returns false if the listing does not exist or belongs to someone else.
    pub async fn delete_listing(&self, id: &ListingId) -> AppResult<bool> {
        let owner = self.signed_in_user().await?;
        if !self.owns(&owner, id).await {
            tracing::warn!(
                user_id = %owner.id,
                listing_id = %id,
                "Delete rejected, not the owner"
            );
            return Ok(false);
        }
        Ok(self.listings.delete_listing(id).await?)
    }

    /// Returns the listings published by the signed-in user.
    pub async fn my_listings(&self) -> Vec<Listing> {
        match self.auth.active_identity().await {
            Some(user_id) => self.listings.listings_owned_by(&user_id).await,
            None => Vec::new(),
        }
    }

    async fn signed_in_user(&self) -> AppResult<User> {
        self.auth.current_user().await.ok_or(AppError::NotSignedIn)
    }

    async fn owns(&self, owner: &User, id: &ListingId) -> bool {
        self.listings
            .listing(id)
            .await
            .is_some_and(|listing| listing.is_owned_by(&owner.id))
    }

    async fn sync_identity(&self) {
        let identity = self.auth.active_identity().await;
        self.listings.switch_identity(identity).await;
    }
}
