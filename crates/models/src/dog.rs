use std::fmt;
use std::str::FromStr;

use sea_orm::{entity::prelude::*, sea_query::Expr, ConnectionTrait, QueryOrder, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{errors::ModelError, geo::{BoundingBox, GeoPoint}, user};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "dog")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub image_url: String,
    pub dog_type: String,
    pub age: String,
    pub gender: String,
    pub longitude: f64,
    pub latitude: f64,
    pub lister_id: Uuid,
    pub adopted: bool,
    pub adopted_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Lister,
    Adopter,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Lister => Entity::belongs_to(user::Entity)
                .from(Column::ListerId)
                .to(user::Column::Id)
                .into(),
            Relation::Adopter => Entity::belongs_to(user::Entity)
                .from(Column::AdoptedBy)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef { Relation::Lister.def() }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn location(&self) -> GeoPoint {
        GeoPoint { longitude: self.longitude, latitude: self.latitude }
    }
}

macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident, $field:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $name { $($variant),+ }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self { $($name::$variant => $text),+ }
            }
        }

        impl FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s))
                    .ok_or_else(|| {
                        let allowed: Vec<&str> = $name::ALL.iter().map(|v| v.as_str()).collect();
                        ModelError::Validation(format!("{} `{}` is not one of: {}", $field, s, allowed.join(", ")))
                    })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
        }
    };
}

string_enum!(
    /// Coat colour, which the listing UI filters on.
    DogType, "type" {
        Black => "Black",
        Brown => "Brown",
        White => "White",
        Golden => "Golden",
        Grey => "Grey",
        Cream => "Cream",
        Spotted => "Spotted",
        Mixed => "Mixed",
    }
);

string_enum!(
    AgeBracket, "age" {
        UpToSixMonths => "0-6 months",
        SixToTwelveMonths => "6-12 months",
        OneToThreeYears => "1-3 years",
        ThreeToSevenYears => "3-7 years",
        SevenPlusYears => "7+ years",
    }
);

string_enum!(
    Gender, "gender" {
        Male => "Male",
        Female => "Female",
    }
);

/// Raw listing fields as submitted; every field is optional so that missing
/// ones are reported together with malformed ones.
#[derive(Clone, Debug, Default)]
pub struct DogFields {
    pub image_url: Option<String>,
    pub dog_type: Option<String>,
    pub age: Option<String>,
    pub gender: Option<String>,
}

/// Listing fields after validation.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidDogFields {
    pub image_url: String,
    pub dog_type: DogType,
    pub age: AgeBracket,
    pub gender: Gender,
}

fn required<'a>(value: &'a Option<String>, name: &str, errors: &mut Vec<String>) -> Option<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Some(v),
        _ => {
            errors.push(format!("{name} is required"));
            None
        }
    }
}

fn parse_field<T: FromStr<Err = ModelError>>(raw: Option<&str>, errors: &mut Vec<String>) -> Option<T> {
    match raw?.parse::<T>() {
        Ok(v) => Some(v),
        Err(ModelError::Validation(m)) => { errors.push(m); None }
        Err(other) => { errors.push(other.to_string()); None }
    }
}

/// Validate all listing fields, aggregating every field-level message.
pub fn validate_fields(fields: &DogFields) -> Result<ValidDogFields, ModelError> {
    let mut errors = Vec::new();
    let image_url = required(&fields.image_url, "imageUrl", &mut errors).map(str::to_string);
    let dog_type = parse_field::<DogType>(required(&fields.dog_type, "type", &mut errors), &mut errors);
    let age = parse_field::<AgeBracket>(required(&fields.age, "age", &mut errors), &mut errors);
    let gender = parse_field::<Gender>(required(&fields.gender, "gender", &mut errors), &mut errors);

    match (image_url, dog_type, age, gender) {
        (Some(image_url), Some(dog_type), Some(age), Some(gender)) if errors.is_empty() => {
            Ok(ValidDogFields { image_url, dog_type, age, gender })
        }
        _ => Err(ModelError::Validation(errors.join("; "))),
    }
}

/// Insert a dog row. Field validation runs here as well, so callers inside a
/// transaction abort on the first invalid listing.
pub async fn create<C: ConnectionTrait>(
    db: &C,
    fields: &DogFields,
    location: GeoPoint,
    lister_id: Uuid,
) -> Result<Model, ModelError> {
    let valid = validate_fields(fields)?;
    let location = GeoPoint::new(location.longitude, location.latitude)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        image_url: Set(valid.image_url),
        dog_type: Set(valid.dog_type.as_str().to_string()),
        age: Set(valid.age.as_str().to_string()),
        gender: Set(valid.gender.as_str().to_string()),
        longitude: Set(location.longitude),
        latitude: Set(location.latitude),
        lister_id: Set(lister_id),
        adopted: Set(false),
        adopted_by: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(am.insert(db).await?)
}

/// Newest first, each paired with its lister row.
pub async fn list_with_lister<C: ConnectionTrait>(db: &C) -> Result<Vec<(Model, Option<user::Model>)>, ModelError> {
    Ok(Entity::find()
        .find_also_related(user::Entity)
        .order_by_desc(Column::CreatedAt)
        .all(db)
        .await?)
}

pub async fn find_by_ids<C: ConnectionTrait>(db: &C, ids: &[Uuid]) -> Result<Vec<Model>, ModelError> {
    if ids.is_empty() { return Ok(Vec::new()); }
    Ok(Entity::find()
        .filter(Column::Id.is_in(ids.iter().copied()))
        .order_by_desc(Column::CreatedAt)
        .all(db)
        .await?)
}

pub async fn find_by_lister<C: ConnectionTrait>(db: &C, lister_id: Uuid) -> Result<Vec<Model>, ModelError> {
    Ok(Entity::find()
        .filter(Column::ListerId.eq(lister_id))
        .order_by_desc(Column::CreatedAt)
        .all(db)
        .await?)
}

/// Rows inside the bounding box; callers refine by exact distance.
pub async fn find_in_box<C: ConnectionTrait>(db: &C, bbox: &BoundingBox) -> Result<Vec<Model>, ModelError> {
    Ok(Entity::find()
        .filter(Column::Latitude.between(bbox.min_lat, bbox.max_lat))
        .filter(Column::Longitude.between(bbox.min_lng, bbox.max_lng))
        .all(db)
        .await?)
}

/// Flag a dog as adopted unless it already is. `None` means the row was
/// missing or had been adopted by a concurrent request.
pub async fn mark_adopted<C: ConnectionTrait>(db: &C, dog_id: Uuid, adopter_id: Uuid) -> Result<Option<Model>, ModelError> {
    let now: DateTimeWithTimeZone = Utc::now().into();
    let res = Entity::update_many()
        .col_expr(Column::Adopted, Expr::value(true))
        .col_expr(Column::AdoptedBy, Expr::value(adopter_id))
        .col_expr(Column::UpdatedAt, Expr::value(now))
        .filter(Column::Id.eq(dog_id))
        .filter(Column::Adopted.eq(false))
        .exec(db)
        .await?;
    if res.rows_affected == 0 {
        return Ok(None);
    }
    Ok(Entity::find_by_id(dog_id).one(db).await?)
}

/// Delete by id and return the removed row, if any.
pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Model>, ModelError> {
    let Some(found) = Entity::find_by_id(id).one(db).await? else { return Ok(None) };
    let res = Entity::delete_by_id(id).exec(db).await?;
    Ok((res.rows_affected > 0).then_some(found))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(t: &str, age: &str, gender: &str, img: &str) -> DogFields {
        DogFields {
            image_url: Some(img.into()),
            dog_type: Some(t.into()),
            age: Some(age.into()),
            gender: Some(gender.into()),
        }
    }

    #[test]
    fn parses_enumerations_case_insensitively() {
        assert_eq!("brown".parse::<DogType>().unwrap(), DogType::Brown);
        assert_eq!(" 0-6 months ".parse::<AgeBracket>().unwrap(), AgeBracket::UpToSixMonths);
        assert_eq!("FEMALE".parse::<Gender>().unwrap(), Gender::Female);
        assert!("Purple".parse::<DogType>().is_err());
    }

    #[test]
    fn validate_fields_accepts_complete_submission() {
        let v = validate_fields(&fields("Brown", "0-6 months", "Male", "x.jpg")).unwrap();
        assert_eq!(v.dog_type, DogType::Brown);
        assert_eq!(v.age.as_str(), "0-6 months");
        assert_eq!(v.gender, Gender::Male);
        assert_eq!(v.image_url, "x.jpg");
    }

    #[test]
    fn validate_fields_reports_every_problem() {
        let err = validate_fields(&DogFields { image_url: None, dog_type: Some("Purple".into()), age: Some("ancient".into()), gender: Some(" ".into()) })
            .unwrap_err()
            .to_string();
        assert!(err.contains("imageUrl is required"), "{err}");
        assert!(err.contains("type `Purple` is not one of"), "{err}");
        assert!(err.contains("age `ancient` is not one of"), "{err}");
        assert!(err.contains("gender is required"), "{err}");
    }

    #[test]
    fn enum_display_matches_stored_text() {
        assert_eq!(AgeBracket::SevenPlusYears.to_string(), "7+ years");
        assert_eq!(DogType::ALL.len(), 8);
    }
}
