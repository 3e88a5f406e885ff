use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("CREATE SCHEMA IF NOT EXISTS meeting_sync;")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("SET search_path TO meeting_sync, public;")
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // CASCADE removes every table and type created by later migrations
        manager
            .get_connection()
            .execute_unprepared("DROP SCHEMA IF EXISTS meeting_sync CASCADE;")
            .await?;

        Ok(())
    }
}
