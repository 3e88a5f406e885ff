use super::error::Error;
use entity::oauth_connections::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::debug;
use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    DatabaseConnection, QueryOrder, TryIntoModel,
};

/// Finds primary account connections holding a refresh token whose access token
/// expires at or before `cutoff`.
pub async fn find_refreshable(
    db: &DatabaseConnection,
    cutoff: DateTimeUtc,
) -> Result<Vec<Model>, Error> {
    let cutoff: DateTimeWithTimeZone = cutoff.into();

    Ok(Entity::find()
        .filter(Column::RefreshToken.is_not_null())
        .filter(Column::TokenExpiresAt.is_not_null())
        .filter(Column::TokenExpiresAt.lte(cutoff))
        .order_by_asc(Column::TokenExpiresAt)
        .all(db)
        .await?)
}

/// Finds every primary account connection
pub async fn find_all(db: &DatabaseConnection) -> Result<Vec<Model>, Error> {
    Ok(Entity::find().all(db).await?)
}

/// Finds an OAuth connection by ID
pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(Error::not_found)
}

/// Writes refreshed tokens to an existing OAuth connection.
///
/// `refresh_token` replaces the stored value only when `Some`; `None` keeps the
/// current refresh token.
pub async fn update_tokens(
    db: &DatabaseConnection,
    id: Id,
    access_token: String,
    refresh_token: Option<String>,
    token_expires_at: DateTimeUtc,
) -> Result<Model, Error> {
    let existing = find_by_id(db, id).await?;

    debug!("Updating OAuth connection tokens: {id}");

    let refresh_token = match refresh_token {
        Some(token) => Set(Some(token)),
        None => Unchanged(existing.refresh_token),
    };

    let active_model = ActiveModel {
        id: Unchanged(existing.id),
        user_id: Unchanged(existing.user_id),
        provider: Unchanged(existing.provider),
        external_email: Unchanged(existing.external_email),
        access_token: Set(access_token),
        refresh_token,
        token_expires_at: Set(Some(token_expires_at.into())),
        created_at: Unchanged(existing.created_at),
        updated_at: Set(chrono::Utc::now().into()),
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use crate::error::EntityApiErrorKind;
    use entity::provider::Provider;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn test_model() -> Model {
        let now = chrono::Utc::now();
        Model {
            id: Id::new_v4(),
            user_id: Id::new_v4(),
            provider: Provider::Google,
            external_email: Some("test@gmail.com".to_string()),
            access_token: "access-token".to_string(),
            refresh_token: Some("refresh-token".to_string()),
            token_expires_at: Some((now + chrono::Duration::minutes(5)).into()),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn find_refreshable_returns_expiring_connections() -> Result<(), Error> {
        let model = test_model();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model.clone()]])
            .into_connection();

        let cutoff = chrono::Utc::now() + chrono::Duration::minutes(10);
        let result = find_refreshable(&db, cutoff).await?;

        assert_eq!(result, vec![model]);
        Ok(())
    }

    #[tokio::test]
    async fn update_tokens_updates_access_and_refresh_tokens() -> Result<(), Error> {
        let model = test_model();
        let mut updated = model.clone();
        updated.access_token = "new-access-token".to_string();
        updated.refresh_token = Some("new-refresh-token".to_string());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // First query: find_by_id
            .append_query_results(vec![vec![model.clone()]])
            // Second query: update result
            .append_query_results(vec![vec![updated.clone()]])
            .into_connection();

        let result = update_tokens(
            &db,
            model.id,
            "new-access-token".to_string(),
            Some("new-refresh-token".to_string()),
            chrono::Utc::now() + chrono::Duration::hours(1),
        )
        .await?;

        assert_eq!(result.access_token, "new-access-token");
        assert_eq!(result.refresh_token, Some("new-refresh-token".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn update_tokens_returns_not_found_for_disconnected_account() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results::<Model, Vec<Model>, _>(vec![vec![]])
            .into_connection();

        let result = update_tokens(
            &db,
            Id::new_v4(),
            "token".to_string(),
            None,
            chrono::Utc::now(),
        )
        .await;

        assert_eq!(
            result.map_err(|e| e.error_kind),
            Err(EntityApiErrorKind::RecordNotFound)
        );
    }
}
