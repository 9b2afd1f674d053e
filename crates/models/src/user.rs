use sea_orm::{entity::prelude::*, ConnectionTrait, QuerySelect, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub external_id: String,
    #[sea_orm(unique)]
    pub email: String,
    pub name: String,
    pub avatar_url: String,
    pub phone: Option<String>,
    pub profile_complete: bool,
    pub dogs_listed: Vec<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Dogs,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::Dogs => Entity::has_many(crate::dog::Entity).into() }
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Fields accepted when a profile is first submitted.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub external_id: String,
    pub email: String,
    pub name: String,
    pub avatar_url: String,
    pub phone: Option<String>,
    pub profile_complete: bool,
}

pub fn validate_email(email: &str) -> Result<(), ModelError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.') => Ok(()),
        _ => Err(ModelError::Validation("invalid email".into())),
    }
}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    if name.trim().is_empty() { return Err(ModelError::Validation("name required".into())); }
    if name.chars().count() > 128 { return Err(ModelError::Validation("name too long (<=128)".into())); }
    Ok(())
}

/// Accepts an optional leading `+` and 7–15 digits; spaces, dashes and
/// parentheses are ignored. Returns the normalized form.
pub fn normalize_phone(phone: &str) -> Result<String, ModelError> {
    let trimmed = phone.trim();
    let (plus, rest) = match trimmed.strip_prefix('+') {
        Some(rest) => ("+", rest),
        None => ("", trimmed),
    };
    let mut digits = String::with_capacity(rest.len());
    for c in rest.chars() {
        match c {
            '0'..='9' => digits.push(c),
            ' ' | '-' | '(' | ')' => {}
            _ => return Err(ModelError::Validation(format!("invalid phone number: {phone}"))),
        }
    }
    if !(7..=15).contains(&digits.len()) {
        return Err(ModelError::Validation(format!("invalid phone number: {phone}")));
    }
    Ok(format!("{plus}{digits}"))
}

/// Validate every field and report all failures at once.
pub fn validate_new(input: &NewUser) -> Result<NewUser, ModelError> {
    let mut errors = Vec::new();
    if input.external_id.trim().is_empty() { errors.push("externalId required".to_string()); }
    if let Err(ModelError::Validation(m)) = validate_email(&input.email) { errors.push(m); }
    if let Err(ModelError::Validation(m)) = validate_name(&input.name) { errors.push(m); }
    let phone = match input.phone.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
        Some(p) => match normalize_phone(p) {
            Ok(n) => Some(n),
            Err(e) => { errors.push(validation_message(e)); None }
        },
        None => None,
    };
    if !errors.is_empty() {
        return Err(ModelError::Validation(errors.join("; ")));
    }
    Ok(NewUser {
        external_id: input.external_id.trim().to_string(),
        email: input.email.trim().to_ascii_lowercase(),
        name: input.name.trim().to_string(),
        avatar_url: input.avatar_url.trim().to_string(),
        phone,
        profile_complete: input.profile_complete,
    })
}

fn validation_message(e: ModelError) -> String {
    match e { ModelError::Validation(m) => m, other => other.to_string() }
}

/// Append `dog_id` unless already present; returns whether the list changed.
pub fn push_dog(list: &mut Vec<Uuid>, dog_id: Uuid) -> bool {
    if list.contains(&dog_id) { return false; }
    list.push(dog_id);
    true
}

/// Remove every occurrence of `dog_id`; returns whether the list changed.
pub fn pull_dog(list: &mut Vec<Uuid>, dog_id: Uuid) -> bool {
    let before = list.len();
    list.retain(|id| *id != dog_id);
    list.len() != before
}

pub async fn create<C: ConnectionTrait>(db: &C, input: &NewUser) -> Result<Model, ModelError> {
    let input = validate_new(input)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        external_id: Set(input.external_id),
        email: Set(input.email),
        name: Set(input.name),
        avatar_url: Set(input.avatar_url),
        phone: Set(input.phone),
        profile_complete: Set(input.profile_complete),
        dogs_listed: Set(Vec::new()),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(am.insert(db).await?)
}

pub async fn find_by_external_id<C: ConnectionTrait>(db: &C, external_id: &str) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find().filter(Column::ExternalId.eq(external_id)).one(db).await?)
}

/// Load a user row with `FOR UPDATE`; only meaningful inside a transaction.
pub async fn find_for_update<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find_by_id(id).lock_exclusive().one(db).await?)
}

/// Append a dog id to an already-loaded user row.
pub async fn append_dog<C: ConnectionTrait>(db: &C, user: Model, dog_id: Uuid) -> Result<Model, ModelError> {
    let mut listed = user.dogs_listed.clone();
    if !push_dog(&mut listed, dog_id) {
        return Ok(user);
    }
    let mut am: ActiveModel = user.into();
    am.dogs_listed = Set(listed);
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

/// Pull a dog id out of a user's listing collection. `None` if the user is gone.
pub async fn remove_dog<C: ConnectionTrait>(db: &C, user_id: Uuid, dog_id: Uuid) -> Result<Option<Model>, ModelError> {
    let Some(user) = find_for_update(db, user_id).await? else { return Ok(None) };
    let mut listed = user.dogs_listed.clone();
    if !pull_dog(&mut listed, dog_id) {
        return Ok(Some(user));
    }
    let mut am: ActiveModel = user.into();
    am.dogs_listed = Set(listed);
    am.updated_at = Set(Utc::now().into());
    Ok(Some(am.update(db).await?))
}

pub async fn set_avatar<C: ConnectionTrait>(db: &C, id: Uuid, avatar_url: &str) -> Result<Option<Model>, ModelError> {
    let Some(found) = Entity::find_by_id(id).one(db).await? else { return Ok(None) };
    let mut am: ActiveModel = found.into();
    am.avatar_url = Set(avatar_url.trim().to_string());
    am.updated_at = Set(Utc::now().into());
    Ok(Some(am.update(db).await?))
}
