use super::error::Error;
use entity::platform_connections::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::debug;
use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    DatabaseConnection, QueryOrder, TryIntoModel,
};

/// Finds publishing platform connections holding a refresh token whose access
/// token expires at or before `cutoff`.
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

/// Finds every publishing platform connection
pub async fn find_all(db: &DatabaseConnection) -> Result<Vec<Model>, Error> {
    Ok(Entity::find().all(db).await?)
}

/// Finds a platform connection by ID
pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(Error::not_found)
}

/// Writes refreshed tokens to an existing platform connection. A `None`
/// refresh token keeps the stored one.
pub async fn update_tokens(
    db: &DatabaseConnection,
    id: Id,
    access_token: String,
    refresh_token: Option<String>,
    token_expires_at: DateTimeUtc,
) -> Result<Model, Error> {
    let existing = find_by_id(db, id).await?;

    debug!(
        "Updating {} connection tokens: {id}",
        existing.platform
    );

    let refresh_token = match refresh_token {
        Some(token) => Set(Some(token)),
        None => Unchanged(existing.refresh_token),
    };

    let active_model = ActiveModel {
        id: Unchanged(existing.id),
        user_id: Unchanged(existing.user_id),
        platform: Unchanged(existing.platform),
        account_name: Unchanged(existing.account_name),
        access_token: Set(access_token),
        refresh_token,
        token_expires_at: Set(Some(token_expires_at.into())),
        created_at: Unchanged(existing.created_at),
        updated_at: Set(chrono::Utc::now().into()),
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}
