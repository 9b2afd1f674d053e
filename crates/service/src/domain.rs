use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use models::{dog, geo::GeoPoint, user};

/// GeoJSON point, `[longitude, latitude]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(rename = "type", default = "point_kind")]
    pub kind: String,
    pub coordinates: Vec<f64>,
}

fn point_kind() -> String { "Point".into() }

impl From<GeoPoint> for Location {
    fn from(p: GeoPoint) -> Self {
        Self { kind: point_kind(), coordinates: vec![p.longitude, p.latitude] }
    }
}

/// Listing submission as received from the client
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewListing {
    pub lister_id: Option<String>,
    pub location: Option<Location>,
    pub image_url: Option<String>,
    #[serde(rename = "type")]
    pub dog_type: Option<String>,
    pub age: Option<String>,
    pub gender: Option<String>,
}

/// Listing (business view)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dog {
    pub id: Uuid,
    pub image_url: String,
    #[serde(rename = "type")]
    pub dog_type: String,
    pub age: String,
    pub gender: String,
    pub location: Location,
    pub lister_id: Uuid,
    pub adopted: bool,
    pub adopted_by: Option<Uuid>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl From<dog::Model> for Dog {
    fn from(m: dog::Model) -> Self {
        Self {
            id: m.id,
            location: m.location().into(),
            image_url: m.image_url,
            dog_type: m.dog_type,
            age: m.age,
            gender: m.gender,
            lister_id: m.lister_id,
            adopted: m.adopted,
            adopted_by: m.adopted_by,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Public subset of the lister's profile shown alongside each listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListerSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub avatar_url: String,
}

impl From<user::Model> for ListerSummary {
    fn from(u: user::Model) -> Self {
        Self { id: u.id, name: u.name, email: u.email, phone: u.phone, avatar_url: u.avatar_url }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DogWithLister {
    #[serde(flatten)]
    pub dog: Dog,
    pub lister: Option<ListerSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyDog {
    #[serde(flatten)]
    pub dog: Dog,
    pub distance_km: f64,
}

/// User profile (business view)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub external_id: String,
    pub email: String,
    pub name: String,
    pub avatar_url: String,
    pub phone: Option<String>,
    pub profile_complete: bool,
    pub dogs_listed: Vec<Uuid>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl From<user::Model> for User {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            external_id: u.external_id,
            email: u.email,
            name: u.name,
            avatar_url: u.avatar_url,
            phone: u.phone,
            profile_complete: u.profile_complete,
            dogs_listed: u.dogs_listed,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

/// Profile submission; required fields are checked by the service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProfile {
    pub external_id: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub phone: Option<String>,
    pub profile_complete: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarUpdate {
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdoptRequest {
    pub adopted_by: Option<String>,
}

/// Result of a committed listing: the new dog and its owner after the append.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingCreated {
    pub dog: Dog,
    pub user: User,
}

/// What happened to the stored image of a deleted listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageCleanup {
    Removed,
    /// The image URL does not name a dog image in the bucket.
    Skipped,
    Failed,
}

#[derive(Debug, Clone)]
pub struct ListingDeleted {
    pub dog: Dog,
    pub image: ImageCleanup,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_listing_reads_camel_case_and_type() {
        let body = json!({
            "type": "Brown",
            "age": "0-6 months",
            "gender": "Male",
            "listerId": "abc",
            "location": {"type": "Point", "coordinates": [77.5, 12.9]},
            "imageUrl": "x.jpg"
        });
        let l: NewListing = serde_json::from_value(body).unwrap();
        assert_eq!(l.dog_type.as_deref(), Some("Brown"));
        assert_eq!(l.lister_id.as_deref(), Some("abc"));
        assert_eq!(l.location.unwrap().coordinates, vec![77.5, 12.9]);
    }

    #[test]
    fn location_kind_defaults_to_point() {
        let loc: Location = serde_json::from_value(json!({"coordinates": [1.0, 2.0]})).unwrap();
        assert_eq!(loc.kind, "Point");
    }

    #[test]
    fn coordinates_of_wrong_type_fail_to_parse() {
        let res: Result<NewListing, _> = serde_json::from_value(json!({"location": {"coordinates": ["a", 2]}}));
        assert!(res.is_err());
    }
}
