use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Add providers and platforms via ALTER TYPE ADD VALUE as needed.
        manager
            .get_connection()
            .execute_unprepared("CREATE TYPE meeting_sync.provider AS ENUM ('google')")
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "CREATE TYPE meeting_sync.platform AS ENUM ('linkedin', 'facebook', 'twitter')",
            )
            .await?;

        // Tokens are AES-256-GCM ciphertext, encrypted by the application.
        // A NULL token_expires_at means the access token does not expire.
        let create_oauth_connections_sql = r#"
            CREATE TABLE IF NOT EXISTS meeting_sync.oauth_connections (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                user_id UUID NOT NULL,

                provider meeting_sync.provider NOT NULL,
                external_email VARCHAR(255),

                access_token TEXT NOT NULL,
                refresh_token TEXT,
                token_expires_at TIMESTAMPTZ,

                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

                UNIQUE(user_id, provider)
            )
        "#;

        let create_platform_connections_sql = r#"
            CREATE TABLE IF NOT EXISTS meeting_sync.platform_connections (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                user_id UUID NOT NULL,

                platform meeting_sync.platform NOT NULL,
                account_name VARCHAR(255),

                access_token TEXT NOT NULL,
                refresh_token TEXT,
                token_expires_at TIMESTAMPTZ,

                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

                UNIQUE(user_id, platform)
            )
        "#;

        for sql in [create_oauth_connections_sql, create_platform_connections_sql] {
            manager.get_connection().execute_unprepared(sql).await?;
        }

        // Serve the refresher's expiry window query
        for table in ["oauth_connections", "platform_connections"] {
            manager
                .get_connection()
                .execute_unprepared(&format!(
                    "CREATE INDEX IF NOT EXISTS idx_{table}_token_expires_at
                     ON meeting_sync.{table}(token_expires_at)
                     WHERE refresh_token IS NOT NULL"
                ))
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in ["platform_connections", "oauth_connections"] {
            manager
                .get_connection()
                .execute_unprepared(&format!("DROP TABLE IF EXISTS meeting_sync.{table}"))
                .await?;
        }

        for enum_type in ["platform", "provider"] {
            manager
                .get_connection()
                .execute_unprepared(&format!("DROP TYPE IF EXISTS meeting_sync.{enum_type}"))
                .await?;
        }

        Ok(())
    }
}
