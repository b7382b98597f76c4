use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Property amenities relevant to pricing and lease addenda.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Amenity {
    Pool,
    HotTub,
    PetFriendly,
    Wifi,
    Kitchen,
    Parking,
    Fireplace,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub amenities: Vec<Amenity>,
    pub min_stay_nights: u32,
}

impl Property {
    pub fn has_amenity(&self, amenity: &Amenity) -> bool {
        self.amenities.contains(amenity)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PropertyError {
    #[error("Property not found: {0}")]
    NotFound(String),

    #[error("Property lookup failed: {0}")]
    Transport(String),
}

/// External property catalog collaborator.
#[async_trait]
pub trait PropertyLookup: Send + Sync {
    async fn get_property(&self, slug: &str) -> Result<Property, PropertyError>;
}
