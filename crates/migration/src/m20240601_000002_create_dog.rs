//! Create `dog` table with FKs to `user` (lister and optional adopter).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Dog::Table)
                    .if_not_exists()
                    .col(uuid(Dog::Id).primary_key())
                    .col(string_len(Dog::ImageUrl, 1024).not_null())
                    .col(string_len(Dog::DogType, 32).not_null())
                    .col(string_len(Dog::Age, 32).not_null())
                    .col(string_len(Dog::Gender, 16).not_null())
                    .col(double(Dog::Longitude).not_null())
                    .col(double(Dog::Latitude).not_null())
                    .col(uuid(Dog::ListerId).not_null())
                    .col(boolean(Dog::Adopted).not_null())
                    .col(ColumnDef::new(Dog::AdoptedBy).uuid().null())
                    .col(timestamp_with_time_zone(Dog::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Dog::UpdatedAt).not_null())
                    .check(Expr::col(Dog::Longitude).between(-180.0, 180.0))
                    .check(Expr::col(Dog::Latitude).between(-90.0, 90.0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_dog_lister")
                            .from(Dog::Table, Dog::ListerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_dog_adopter")
                            .from(Dog::Table, Dog::AdoptedBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Dog::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Dog {
    Table,
    Id,
    ImageUrl,
    DogType,
    Age,
    Gender,
    Longitude,
    Latitude,
    ListerId,
    Adopted,
    AdoptedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum User { Table, Id }
