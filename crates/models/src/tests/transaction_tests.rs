use std::sync::Arc;

use anyhow::Result;
use sea_orm::{EntityTrait, TransactionTrait};
use tokio::sync::Barrier;

use super::{cleanup, setup_test_db, unique_user};
use crate::dog::{self, DogFields};
use crate::geo::GeoPoint;
use crate::user;

fn fields(dog_type: &str) -> DogFields {
    DogFields {
        image_url: Some("dogs/y.jpg".into()),
        dog_type: Some(dog_type.into()),
        age: Some("1-3 years".into()),
        gender: Some("Female".into()),
    }
}

/// Insert dog + append id inside one transaction, then commit
#[tokio::test]
async fn test_listing_commit_updates_both_tables() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };
    let owner = user::create(&db, &unique_user()).await?;

    let txn = db.begin().await?;
    let locked = user::find_for_update(&txn, owner.id).await?.expect("owner exists");
    let created = dog::create(&txn, &fields("Golden"), GeoPoint::new(10.0, 10.0)?, owner.id).await?;
    let updated = user::append_dog(&txn, locked, created.id).await?;
    txn.commit().await?;

    assert_eq!(updated.dogs_listed, vec![created.id]);
    let reloaded = user::Entity::find_by_id(owner.id).one(&db).await?.unwrap();
    assert_eq!(reloaded.dogs_listed, vec![created.id]);
    assert!(dog::Entity::find_by_id(created.id).one(&db).await?.is_some());

    cleanup(&db, &[owner.id]).await;
    Ok(())
}

/// A failing insert inside the unit of work leaves nothing behind
#[tokio::test]
async fn test_listing_rollback_on_invalid_fields() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };
    let owner = user::create(&db, &unique_user()).await?;

    let result = async {
        let txn = db.begin().await?;
        let locked = user::find_for_update(&txn, owner.id).await?.expect("owner exists");
        let first = dog::create(&txn, &fields("Black"), GeoPoint::new(1.0, 1.0)?, owner.id).await?;
        let _ = user::append_dog(&txn, locked, first.id).await?;
        // second listing fails validation and aborts the whole unit
        let _ = dog::create(&txn, &fields("Plaid"), GeoPoint::new(1.0, 1.0)?, owner.id).await?;
        txn.commit().await?;
        Ok::<(), anyhow::Error>(())
    }
    .await;
    assert!(result.is_err());

    let reloaded = user::Entity::find_by_id(owner.id).one(&db).await?.unwrap();
    assert!(reloaded.dogs_listed.is_empty());
    assert!(dog::find_by_lister(&db, owner.id).await?.is_empty());

    cleanup(&db, &[owner.id]).await;
    Ok(())
}

/// Concurrent listings for one owner serialize on the row lock; no id is lost
#[tokio::test]
async fn test_concurrent_appends_for_same_owner() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };
    let owner = user::create(&db, &unique_user()).await?;
    let db = Arc::new(db);

    let num_tasks = 5;
    let barrier = Arc::new(Barrier::new(num_tasks));
    let mut handles: Vec<tokio::task::JoinHandle<anyhow::Result<uuid::Uuid>>> = vec![];
    for _ in 0..num_tasks {
        let db = Arc::clone(&db);
        let barrier = Arc::clone(&barrier);
        let owner_id = owner.id;
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            let txn = db.begin().await?;
            let locked = user::find_for_update(&txn, owner_id).await?.expect("owner exists");
            let d = dog::create(&txn, &fields("Mixed"), GeoPoint::new(2.0, 2.0)?, owner_id).await?;
            user::append_dog(&txn, locked, d.id).await?;
            txn.commit().await?;
            Ok(d.id)
        }));
    }

    let mut ids = vec![];
    for h in handles {
        ids.push(h.await??);
    }

    let reloaded = user::Entity::find_by_id(owner.id).one(db.as_ref()).await?.unwrap();
    assert_eq!(reloaded.dogs_listed.len(), num_tasks);
    for id in &ids {
        assert_eq!(reloaded.dogs_listed.iter().filter(|x| *x == id).count(), 1);
    }

    cleanup(db.as_ref(), &[owner.id]).await;
    Ok(())
}

/// Pruning is idempotent and tolerates a missing owner
#[tokio::test]
async fn test_remove_dog_from_owner() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };
    let owner = user::create(&db, &unique_user()).await?;
    let d = dog::create(&db, &fields("White"), GeoPoint::new(3.0, 3.0)?, owner.id).await?;
    let owner = user::append_dog(&db, owner, d.id).await?;
    assert_eq!(owner.dogs_listed, vec![d.id]);

    let pruned = user::remove_dog(&db, owner.id, d.id).await?.unwrap();
    assert!(pruned.dogs_listed.is_empty());
    let again = user::remove_dog(&db, owner.id, d.id).await?.unwrap();
    assert!(again.dogs_listed.is_empty());
    assert!(user::remove_dog(&db, uuid::Uuid::new_v4(), d.id).await?.is_none());

    cleanup(&db, &[owner.id]).await;
    Ok(())
}
