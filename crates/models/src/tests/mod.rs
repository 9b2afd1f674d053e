//! Database-backed tests. They run against `DATABASE_URL` and are skipped when
//! `SKIP_DB_TESTS` is set or the database cannot be reached.

use std::time::Duration;

use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::db::{connect_with_config, DatabaseConfig, DATABASE_URL};
use crate::user::{self, NewUser};

/// CRUD operations on users and dogs
pub mod crud_tests;

/// Transactional listing creation and row locking
pub mod transaction_tests;

// Migrations run once per test process; `false` means they could not run
static MIGRATED: OnceCell<bool> = OnceCell::const_new();

fn test_config() -> DatabaseConfig {
    DatabaseConfig {
        url: DATABASE_URL.clone(),
        max_connections: 10,
        min_connections: 1,
        connect_timeout: Duration::from_secs(3),
        acquire_timeout: Duration::from_secs(3),
        ..DatabaseConfig::default()
    }
}

/// Connect and migrate, or `None` when the database is unavailable.
pub(crate) async fn setup_test_db() -> Option<DatabaseConnection> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return None;
    }
    let migrated = *MIGRATED
        .get_or_init(|| async {
            let db = match connect_with_config(&test_config()).await {
                Ok(db) => db,
                Err(e) => {
                    eprintln!("skip: cannot connect to db: {}", e);
                    return false;
                }
            };
            match migration::Migrator::up(&db, None).await {
                Ok(()) => true,
                Err(e) => {
                    eprintln!("skip: migrate up failed: {}", e);
                    false
                }
            }
        })
        .await;
    if !migrated {
        return None;
    }
    connect_with_config(&test_config()).await.ok()
}

pub(crate) fn unique_user() -> NewUser {
    let tag = Uuid::new_v4().simple().to_string();
    NewUser {
        external_id: format!("ext_{tag}"),
        email: format!("owner_{tag}@example.com"),
        name: "Test Owner".into(),
        avatar_url: "https://img.example.com/avatar.png".into(),
        phone: None,
        profile_complete: true,
    }
}

pub(crate) async fn cleanup(db: &DatabaseConnection, user_ids: &[Uuid]) {
    use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
    for id in user_ids {
        let _ = crate::dog::Entity::delete_many().filter(crate::dog::Column::ListerId.eq(*id)).exec(db).await;
        let _ = user::Entity::delete_by_id(*id).exec(db).await;
    }
}
