use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Dog: composite (latitude, longitude) for bounding-box proximity scans
        manager
            .create_index(
                Index::create()
                    .name("idx_dog_location")
                    .if_not_exists()
                    .table(Dog::Table)
                    .col(Dog::Latitude)
                    .col(Dog::Longitude)
                    .to_owned(),
            )
            .await?;

        // Dog: index on lister_id
        manager
            .create_index(
                Index::create()
                    .name("idx_dog_lister")
                    .if_not_exists()
                    .table(Dog::Table)
                    .col(Dog::ListerId)
                    .to_owned(),
            )
            .await?;

        // Dog: newest-first listing
        manager
            .create_index(
                Index::create()
                    .name("idx_dog_created_at")
                    .if_not_exists()
                    .table(Dog::Table)
                    .col(Dog::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_dog_location").table(Dog::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_dog_lister").table(Dog::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_dog_created_at").table(Dog::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Dog { Table, Latitude, Longitude, ListerId, CreatedAt }
