//! Built-in listings seeded on first run.

use entities::{Listing, ListingId};

const VILLA_DESCRIPTION: &str =
    "Villa with garden, 5 bedrooms, secure neighbourhood, close to schools and shops.";

/// Returns the default catalog written to storage when no listing collection
/// exists yet.
pub fn default_catalog() -> Vec<Listing> {
    vec![
        seed(
            1,
            "Modern apartment in Yaoundé",
            35_000_000,
            "Bright 3-bedroom apartment close to the city centre, ideal for a family.",
            &[
                "https://images.unsplash.com/photo-1560448204-e02f11c3d0e2?auto=format&fit=crop&w=800&q=80",
                "https://images.unsplash.com/photo-1560448204-e02f11c3d0e2?auto=format&fit=crop&w=800&q=80",
            ],
            "Yaoundé",
            (3, 2),
            "Alice",
        ),
        seed(
            2,
            "Spacious villa in Douala",
            120_000_000,
            VILLA_DESCRIPTION,
            &["https://images.unsplash.com/photo-1710883727450-d3a0ab1bbbe3?q=80&w=1163&auto=format&fit=crop"],
            "Douala",
            (5, 4),
            "Bob",
        ),
        seed(
            3,
            "Spacious villa in Kribi",
            140_500_000,
            VILLA_DESCRIPTION,
            &["https://images.unsplash.com/photo-1710883734891-93709398496d?q=80&w=1332&auto=format&fit=crop"],
            "Kribi",
            (5, 4),
            "Bob",
        ),
        seed(
            4,
            "Spacious villa in Kribi",
            140_500_000,
            VILLA_DESCRIPTION,
            &["https://images.unsplash.com/photo-1638369022547-1c763b1b9b3b?q=80&w=1170&auto=format&fit=crop"],
            "Kribi",
            (5, 4),
            "Bob",
        ),
        seed(
            5,
            "Spacious villa in Kribi",
            140_500_000,
            VILLA_DESCRIPTION,
            &[
                "https://images.unsplash.com/photo-1615127039501-bdcc95f61c63?q=80&w=753&auto=format&fit=crop",
                "https://images.unsplash.com/photo-1560448204-e02f11c3d0e2?auto=format&fit=crop&w=800&q=80",
            ],
            "Kribi",
            (5, 4),
            "Bob",
        ),
        seed(
            6,
            "Spacious villa in Kribi",
            140_500_000,
            VILLA_DESCRIPTION,
            &[
                "https://images.unsplash.com/photo-1603384596556-78e66c81c91b?q=80&w=1074&auto=format&fit=crop",
                "https://images.unsplash.com/photo-1560448204-e02f11c3d0e2?auto=format&fit=crop&w=800&q=80",
            ],
            "Kribi",
            (5, 4),
            "Bob",
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn seed(
    id: i64,
    title: &str,
    price: u64,
    description: &str,
    images: &[&str],
    location: &str,
    (bedrooms, bathrooms): (u32, u32),
    owner: &str,
) -> Listing {
    Listing {
        id: ListingId::from(id),
        title: title.to_string(),
        price,
        description: description.to_string(),
        images: images.iter().map(|uri| uri.to_string()).collect(),
        location: location.to_string(),
        bedrooms,
        bathrooms,
        owner: owner.to_string(),
        owner_id: None,
    }
}
