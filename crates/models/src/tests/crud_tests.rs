use anyhow::Result;
use sea_orm::EntityTrait;

use super::{cleanup, setup_test_db, unique_user};
use crate::dog::{self, DogFields};
use crate::errors::ModelError;
use crate::geo::GeoPoint;
use crate::user::{self, NewUser};

fn brown_puppy() -> DogFields {
    DogFields {
        image_url: Some("dogs/x.jpg".into()),
        dog_type: Some("Brown".into()),
        age: Some("0-6 months".into()),
        gender: Some("Male".into()),
    }
}

#[tokio::test]
async fn test_user_crud() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let created = user::create(&db, &unique_user()).await?;
    assert!(created.dogs_listed.is_empty());

    let by_ext = user::find_by_external_id(&db, &created.external_id).await?;
    assert_eq!(by_ext.map(|u| u.id), Some(created.id));

    let updated = user::set_avatar(&db, created.id, "https://img.example.com/new.png").await?.unwrap();
    assert_eq!(updated.avatar_url, "https://img.example.com/new.png");
    assert_eq!(updated.dogs_listed, created.dogs_listed);

    let missing = user::set_avatar(&db, uuid::Uuid::new_v4(), "x").await?;
    assert!(missing.is_none());

    cleanup(&db, &[created.id]).await;
    Ok(())
}

#[tokio::test]
async fn test_duplicate_email_is_conflict() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let first = user::create(&db, &unique_user()).await?;
    let dup = NewUser { email: first.email.clone(), ..unique_user() };
    let err = user::create(&db, &dup).await.unwrap_err();
    assert!(matches!(err, ModelError::Conflict(_)), "got {err:?}");

    cleanup(&db, &[first.id]).await;
    Ok(())
}

#[tokio::test]
async fn test_dog_crud_and_queries() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let owner = user::create(&db, &unique_user()).await?;
    let here = GeoPoint::new(77.5, 12.9)?;
    let a = dog::create(&db, &brown_puppy(), here, owner.id).await?;
    let b = dog::create(&db, &brown_puppy(), GeoPoint::new(-0.12, 51.5)?, owner.id).await?;
    assert_eq!(a.dog_type, "Brown");
    assert!(!a.adopted);

    let by_ids = dog::find_by_ids(&db, &[a.id, b.id, uuid::Uuid::new_v4()]).await?;
    assert_eq!(by_ids.len(), 2);

    let by_lister = dog::find_by_lister(&db, owner.id).await?;
    assert_eq!(by_lister.len(), 2);

    let nearby = dog::find_in_box(&db, &here.bounding_box(5.0)).await?;
    assert!(nearby.iter().any(|d| d.id == a.id));
    assert!(!nearby.iter().any(|d| d.id == b.id));

    let listed = dog::list_with_lister(&db).await?;
    let (_, lister) = listed.iter().find(|(d, _)| d.id == a.id).expect("listed");
    assert_eq!(lister.as_ref().map(|u| u.id), Some(owner.id));

    let removed = dog::delete(&db, a.id).await?;
    assert_eq!(removed.map(|d| d.id), Some(a.id));
    assert!(dog::delete(&db, a.id).await?.is_none());
    assert!(dog::Entity::find_by_id(a.id).one(&db).await?.is_none());

    cleanup(&db, &[owner.id]).await;
    Ok(())
}

#[tokio::test]
async fn test_dog_with_unknown_lister_is_rejected() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let res = dog::create(&db, &brown_puppy(), GeoPoint::new(1.0, 1.0)?, uuid::Uuid::new_v4()).await;
    assert!(matches!(res, Err(ModelError::Validation(_))), "got {res:?}");
    Ok(())
}

#[tokio::test]
async fn test_mark_adopted_only_once() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let lister = user::create(&db, &unique_user()).await?;
    let adopter = user::create(&db, &unique_user()).await?;
    let d = dog::create(&db, &brown_puppy(), GeoPoint::new(5.0, 5.0)?, lister.id).await?;

    let adopted = dog::mark_adopted(&db, d.id, adopter.id).await?.expect("first adoption");
    assert!(adopted.adopted);
    assert_eq!(adopted.adopted_by, Some(adopter.id));
    assert!(dog::mark_adopted(&db, d.id, adopter.id).await?.is_none());

    cleanup(&db, &[lister.id, adopter.id]).await;
    Ok(())
}
