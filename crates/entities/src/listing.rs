//! Listing-related entity definitions.

use std::{
    fmt,
    sync::atomic::{AtomicI64, Ordering},
};

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};

use crate::User;

/// Owner name used when the publishing user has no display name.
pub const UNKNOWN_OWNER: &str = "Unknown";

/// File extensions treated as video media.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm"];

/// Last timestamp identifier issued by this process.
static LAST_TIMESTAMP_ID: AtomicI64 = AtomicI64::new(0);

/// Identifier of a listing.
///
/// Older records store numeric timestamps and newer ones strings, so both
/// JSON forms are accepted and compared by their textual value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ListingId(String);

impl ListingId {
    /// Creates an identifier from any string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates an identifier from the current time in milliseconds.
    ///
    /// Identifiers issued by one process strictly increase, even within the
    /// same millisecond.
    pub fn from_timestamp() -> Self {
        Self::next_after(std::iter::empty())
    }

    /// Creates a timestamp identifier greater than every numeric identifier
    /// in `existing` and every identifier issued before by this process.
    pub fn next_after<'a>(existing: impl IntoIterator<Item = &'a ListingId>) -> Self {
        let floor = existing
            .into_iter()
            .filter_map(|id| id.0.parse::<i64>().ok())
            .max()
            .unwrap_or(0);
        let now = Utc::now().timestamp_millis();
        let next = |last: i64| now.max(last.saturating_add(1)).max(floor.saturating_add(1));

        let last = LAST_TIMESTAMP_ID
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(next(last)))
            .unwrap_or_else(|last| last);
        Self(next(last).to_string())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for ListingId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Integer(i64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Integer(n) => Self(n.to_string()),
            Raw::Text(s) => Self(s),
        })
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ListingId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ListingId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<i64> for ListingId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

/// Kind of a media reference attached to a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Classifies a media reference by its file extension.
    pub fn of(uri: &str) -> Self {
        let is_video = uri
            .rsplit_once('.')
            .map(|(_, ext)| {
                !ext.contains('/')
                    && VIDEO_EXTENSIONS
                        .iter()
                        .any(|video| ext.eq_ignore_ascii_case(video))
            })
            .unwrap_or(false);

        if is_video { Self::Video } else { Self::Image }
    }
}

/// A property listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: ListingId,
    pub title: String,
    pub price: u64,
    #[serde(default)]
    pub description: String,
    /// Ordered image and video references.
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub bedrooms: u32,
    #[serde(default)]
    pub bathrooms: u32,
    /// Owner display name at publication time.
    #[serde(default)]
    pub owner: String,
    /// Owner user ID. Not checked against registered users; may dangle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
}

impl Listing {
    /// Creates a listing with only the identifier, title and price set.
    pub fn new(id: impl Into<ListingId>, title: impl Into<String>, price: u64) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            price,
            description: String::new(),
            images: Vec::new(),
            location: String::new(),
            bedrooms: 0,
            bathrooms: 0,
            owner: String::new(),
            owner_id: None,
        }
    }

    /// Sets the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Sets the owner from a user.
    pub fn with_owner(mut self, owner: &User) -> Self {
        self.owner = owner_name(owner);
        self.owner_id = Some(owner.id.clone());
        self
    }

    /// Returns true if this listing was published by `user_id`.
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id.as_deref() == Some(user_id)
    }

    /// Returns true if the title or location contains `query`, ignoring case.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.title.to_lowercase().contains(&query) || self.location.to_lowercase().contains(&query)
    }

    /// Returns true if any attached media is a video.
    pub fn has_video(&self) -> bool {
        self.images
            .iter()
            .any(|uri| MediaKind::of(uri) == MediaKind::Video)
    }

    /// Shallow-merges an update. Fields absent from the update are kept.
    pub fn apply(&mut self, update: &ListingUpdate) {
        if let Some(title) = &update.title {
            self.title = title.clone();
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(description) = &update.description {
            self.description = description.clone();
        }
        if let Some(images) = &update.images {
            self.images = images.clone();
        }
        if let Some(location) = &update.location {
            self.location = location.clone();
        }
        if let Some(bedrooms) = update.bedrooms {
            self.bedrooms = bedrooms;
        }
        if let Some(bathrooms) = update.bathrooms {
            self.bathrooms = bathrooms;
        }
        if let Some(owner) = &update.owner {
            self.owner = owner.clone();
        }
        if let Some(owner_id) = &update.owner_id {
            self.owner_id = Some(owner_id.clone());
        }
    }
}

fn owner_name(owner: &User) -> String {
    if owner.name.is_empty() {
        UNKNOWN_OWNER.to_string()
    } else {
        owner.name.clone()
    }
}

/// Partial listing changes, located by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingUpdate {
    pub id: ListingId,
    pub title: Option<String>,
    pub price: Option<u64>,
    pub description: Option<String>,
    pub images: Option<Vec<String>>,
    pub location: Option<String>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub owner: Option<String>,
    pub owner_id: Option<String>,
}

impl ListingUpdate {
    /// Creates an empty update for `id`.
    pub fn new(id: impl Into<ListingId>) -> Self {
        Self {
            id: id.into(),
            title: None,
            price: None,
            description: None,
            images: None,
            location: None,
            bedrooms: None,
            bathrooms: None,
            owner: None,
            owner_id: None,
        }
    }

    /// Sets the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the price.
    pub fn with_price(mut self, price: u64) -> Self {
        self.price = Some(price);
        self
    }

    /// Sets the media references.
    pub fn with_images(mut self, images: Vec<String>) -> Self {
        self.images = Some(images);
        self
    }
}

/// Publish form content, before an owner and identifier are assigned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDraft {
    pub title: String,
    pub price: u64,
    pub description: String,
    pub images: Vec<String>,
    pub location: String,
    pub bedrooms: u32,
    pub bathrooms: u32,
}

impl ListingDraft {
    /// Creates a draft with a title and price.
    pub fn new(title: impl Into<String>, price: u64) -> Self {
        Self {
            title: title.into(),
            price,
            ..Self::default()
        }
    }

    /// Turns the draft into a listing owned by `owner`, stamped with a
    /// timestamp identifier.
    pub fn publish(self, owner: &User) -> Listing {
        self.publish_as(ListingId::from_timestamp(), owner)
    }

    /// Turns the draft into a listing with identifier `id` owned by `owner`.
    pub fn publish_as(self, id: ListingId, owner: &User) -> Listing {
        Listing {
            id,
            title: self.title,
            price: self.price,
            description: self.description,
            images: self.images,
            location: self.location,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            owner: owner_name(owner),
            owner_id: Some(owner.id.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::NewUser;

    #[test]
    fn test_listing_id_accepts_numbers_and_strings() {
        let ids: Vec<ListingId> = serde_json::from_str(r#"[1, "abc", 1700000000000]"#).unwrap();

        assert_eq!(ids[0], ListingId::from("1"));
        assert_eq!(ids[1].as_str(), "abc");
        assert_eq!(ids[2], ListingId::from(1_700_000_000_000_i64));
    }

    #[test]
    fn test_media_kind() {
        assert_eq!(MediaKind::of("file:///tour.MP4"), MediaKind::Video);
        assert_eq!(MediaKind::of("https://cdn.example.com/a.webm"), MediaKind::Video);
        assert_eq!(MediaKind::of("https://cdn.example.com/a.jpg"), MediaKind::Image);
        assert_eq!(MediaKind::of("https://example.mov/photo"), MediaKind::Image);
        assert_eq!(MediaKind::of("no-extension"), MediaKind::Image);
    }

    #[test]
    fn test_apply_keeps_missing_fields() {
        let mut listing = Listing::new("7", "Villa", 1000).with_location("Kribi");
        listing.bedrooms = 4;

        listing.apply(&ListingUpdate::new("7").with_price(2000));

        assert_eq!(listing.price, 2000);
        assert_eq!(listing.title, "Villa");
        assert_eq!(listing.location, "Kribi");
        assert_eq!(listing.bedrooms, 4);
    }

    #[test]
    fn test_matches_title_or_location() {
        let listing = Listing::new("1", "Villa spacieuse", 10).with_location("Douala");

        assert!(listing.matches("VILLA"));
        assert!(listing.matches("doua"));
        assert!(!listing.matches("Kribi"));
    }

    #[test]
    fn test_publish_draft() {
        let owner = NewUser::new("", "a@x.com", "secret1").with_id("u1").into_user();
        let mut draft = ListingDraft::new("T1", 1000);
        draft.images = vec!["a.jpg".to_string(), "b.mov".to_string()];

        let listing = draft.publish(&owner);

        assert!(listing.is_owned_by("u1"));
        assert_eq!(listing.owner, UNKNOWN_OWNER);
        assert!(listing.has_video());
        assert!(listing.id.as_str().parse::<i64>().is_ok());
    }

    #[test]
    fn test_publish_in_a_tight_loop_yields_distinct_ids() {
        let owner = NewUser::new("A", "a@x.com", "secret1").into_user();

        let ids: HashSet<ListingId> = (0..50)
            .map(|_| ListingDraft::new("T", 1).publish(&owner).id)
            .collect();

        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn test_next_after_skips_existing_ids() {
        let far_future = 4_000_000_000_000_i64;
        let existing = [
            ListingId::from("1"),
            ListingId::from(far_future),
            ListingId::from("abc"),
        ];

        let next = ListingId::next_after(&existing);

        assert!(next.as_str().parse::<i64>().unwrap() > far_future);
    }

    #[test]
    fn test_owner_id_omitted_when_absent() {
        let json = serde_json::to_value(Listing::new(1_i64, "T", 1)).unwrap();
        assert!(json.get("ownerId").is_none());
        assert_eq!(json["id"], "1");
    }
}
