//! User-related entity definitions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Photo shown for users who never set one.
pub const DEFAULT_PHOTO_URL: &str = "https://via.placeholder.com/150";

/// A registered user of the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier, generated on the device at registration.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Email address. Used as the login key and compared case-insensitively.
    pub email: String,
    /// Password, kept in plain text.
    pub password: String,
    /// Phone number.
    #[serde(default)]
    pub phone: String,
    /// Street address.
    #[serde(default)]
    pub address: String,
    /// City of residence.
    #[serde(default)]
    pub city: String,
    /// Profile photo reference.
    #[serde(default = "default_photo_url")]
    pub photo_url: String,
}

fn default_photo_url() -> String {
    DEFAULT_PHOTO_URL.to_string()
}

impl User {
    /// Returns true if `email` matches this user's email, ignoring case.
    pub fn has_email(&self, email: &str) -> bool {
        self.email.to_lowercase() == email.to_lowercase()
    }

    /// Merges a partial update into this user. The identifier never changes.
    pub fn apply(&mut self, update: &ProfileUpdate) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(email) = &update.email {
            self.email = email.clone();
        }
        if let Some(password) = &update.password {
            self.password = password.clone();
        }
        if let Some(phone) = &update.phone {
            self.phone = phone.clone();
        }
        if let Some(address) = &update.address {
            self.address = address.clone();
        }
        if let Some(city) = &update.city {
            self.city = city.clone();
        }
        if let Some(photo_url) = &update.photo_url {
            self.photo_url = photo_url.clone();
        }
    }
}

/// A registration candidate. Optional fields are defaulted by [`NewUser::into_user`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    /// Identifier to register under; a UUID v4 is generated when absent.
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub photo_url: Option<String>,
}

impl NewUser {
    /// Creates a candidate with the required fields set.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    /// Sets the identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the phone number.
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Sets the city.
    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    /// Sets the photo reference.
    pub fn with_photo_url(mut self, photo_url: impl Into<String>) -> Self {
        self.photo_url = Some(photo_url.into());
        self
    }

    /// Builds the stored user, filling every unset optional field.
    pub fn into_user(self) -> User {
        User {
            id: self.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            name: self.name,
            email: self.email,
            password: self.password,
            phone: self.phone.unwrap_or_default(),
            address: self.address.unwrap_or_default(),
            city: self.city.unwrap_or_default(),
            photo_url: self.photo_url.unwrap_or_else(default_photo_url),
        }
    }
}

/// Partial profile changes. Only fields that are `Some` are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub photo_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_defaults() {
        let user = NewUser::new("Alice", "alice@example.com", "secret1").into_user();

        assert!(!user.id.is_empty());
        assert_eq!(user.phone, "");
        assert_eq!(user.address, "");
        assert_eq!(user.city, "");
        assert_eq!(user.photo_url, DEFAULT_PHOTO_URL);
    }

    #[test]
    fn test_new_user_keeps_provided_fields() {
        let user = NewUser::new("Alice", "alice@example.com", "secret1")
            .with_id("user-1")
            .with_city("Douala")
            .with_photo_url("file:///me.jpg")
            .into_user();

        assert_eq!(user.id, "user-1");
        assert_eq!(user.city, "Douala");
        assert_eq!(user.photo_url, "file:///me.jpg");
    }

    #[test]
    fn test_has_email_ignores_case() {
        let user = NewUser::new("Alice", "Alice@Example.com", "secret1").into_user();

        assert!(user.has_email("alice@example.COM"));
        assert!(!user.has_email("bob@example.com"));
    }

    #[test]
    fn test_apply_profile_update() {
        let mut user = NewUser::new("Alice", "alice@example.com", "secret1")
            .with_phone("699 00 00 00")
            .into_user();
        let id = user.id.clone();

        user.apply(&ProfileUpdate {
            name: Some("Alice B.".to_string()),
            city: Some("Kribi".to_string()),
            ..ProfileUpdate::default()
        });

        assert_eq!(user.id, id);
        assert_eq!(user.name, "Alice B.");
        assert_eq!(user.city, "Kribi");
        assert_eq!(user.phone, "699 00 00 00");
    }

    #[test]
    fn test_user_deserializes_without_optional_fields() {
        let json = r#"{"id":"u1","name":"A","email":"a@x.com","password":"p"}"#;
        let user: User = serde_json::from_str(json).unwrap();

        assert_eq!(user.phone, "");
        assert_eq!(user.photo_url, DEFAULT_PHOTO_URL);
    }
}
