//! Queries and transcript status updates for trackable_events table.

use super::error::Error;
use entity::trackable_events::{ActiveModel, Column, Entity, Model};
use entity::transcript_status::TranscriptStatus;
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    DatabaseConnection, QueryOrder, TryIntoModel,
};

/// Finds every event with a dispatched bot whose transcript is still in flight,
/// least recently updated first.
pub async fn find_pollable(db: &DatabaseConnection) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::BotId.is_not_null())
        .filter(Column::TranscriptStatus.is_in(TranscriptStatus::POLLABLE))
        .order_by_asc(Column::UpdatedAt)
        .all(db)
        .await?)
}

/// Finds a trackable event by ID
pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(Error::not_found)
}

/// Moves an event's transcript to `status`. `transcript_url` is written only on
/// the move into `completed`; elsewhere it is ignored.
///
/// The row is re-read first. A transition that the stored status does not permit
/// (for example anything out of `completed`) is refused with `RecordNotUpdated`,
/// which keeps terminal rows immutable even if the caller acted on a stale copy.
pub async fn update_transcript_status(
    db: &DatabaseConnection,
    id: Id,
    status: TranscriptStatus,
    transcript_url: Option<String>,
) -> Result<Model, Error> {
    let existing = find_by_id(db, id).await?;

    if !existing.transcript_status.can_advance_to(status) {
        warn!(
            "Refusing transcript status change {} -> {status} for event {id}",
            existing.transcript_status
        );
        return Err(Error::not_updated());
    }

    debug!(
        "Updating transcript status {} -> {status} for event {id}",
        existing.transcript_status
    );

    let transcript_url = match transcript_url {
        Some(url) if status == TranscriptStatus::Completed => Set(Some(url)),
        _ => Unchanged(existing.transcript_url),
    };

    let active_model = ActiveModel {
        id: Unchanged(existing.id),
        user_id: Unchanged(existing.user_id),
        title: Unchanged(existing.title),
        meeting_url: Unchanged(existing.meeting_url),
        bot_id: Unchanged(existing.bot_id),
        transcript_status: Set(status),
        transcript_url,
        created_at: Unchanged(existing.created_at),
        updated_at: Set(chrono::Utc::now().into()),
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}
