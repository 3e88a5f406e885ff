use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE TYPE meeting_sync.transcript_status AS ENUM \
                 ('none', 'scheduled', 'recording', 'processing', 'completed', 'failed')",
            )
            .await?;

        // bot_id is written by whatever dispatches the bot; transcript_status and
        // transcript_url are written only by the bot status poller.
        let create_table_sql = r#"
            CREATE TABLE IF NOT EXISTS meeting_sync.trackable_events (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                user_id UUID NOT NULL,
                title VARCHAR(255) NOT NULL,
                meeting_url TEXT,

                bot_id VARCHAR(255),
                transcript_status meeting_sync.transcript_status NOT NULL DEFAULT 'none',
                transcript_url TEXT,

                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#;

        manager
            .get_connection()
            .execute_unprepared(create_table_sql)
            .await?;

        // Serves the poller's candidate query
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE INDEX IF NOT EXISTS idx_trackable_events_in_flight
                 ON meeting_sync.trackable_events(transcript_status, updated_at)
                 WHERE bot_id IS NOT NULL",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS meeting_sync.trackable_events")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("DROP TYPE IF EXISTS meeting_sync.transcript_status")
            .await?;

        Ok(())
    }
}
