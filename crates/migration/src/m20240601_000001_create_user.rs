//! Create `user` table.
//!
//! One row per identity-provider subject; `dogs_listed` mirrors the ids of
//! the dogs this user has listed, in listing order.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(uuid(User::Id).primary_key())
                    .col(string_len(User::ExternalId, 128).unique_key().not_null())
                    .col(string_len(User::Email, 255).unique_key().not_null())
                    .col(string_len(User::Name, 128).not_null())
                    .col(string_len(User::AvatarUrl, 1024).not_null())
                    .col(ColumnDef::new(User::Phone).string_len(32).null())
                    .col(boolean(User::ProfileComplete).not_null())
                    .col(
                        ColumnDef::new(User::DogsListed)
                            .array(ColumnType::Uuid)
                            .not_null()
                            .default(Expr::cust("'{}'::uuid[]")),
                    )
                    .col(timestamp_with_time_zone(User::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(User::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(User::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
    ExternalId,
    Email,
    Name,
    AvatarUrl,
    Phone,
    ProfileComplete,
    DogsListed,
    CreatedAt,
    UpdatedAt,
}
