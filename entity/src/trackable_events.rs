//! SeaORM Entity for trackable_events table.
//! A meeting whose transcript is produced by a third-party recording bot.

use crate::transcript_status::TranscriptStatus;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(schema_name = "meeting_sync", table_name = "trackable_events")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,

    pub user_id: Id,

    pub title: String,

    pub meeting_url: Option<String>,

    /// Recording bot ID, set once a bot has been dispatched to the meeting
    pub bot_id: Option<String>,

    pub transcript_status: TranscriptStatus,

    /// Set only when the transcript reaches `completed`
    pub transcript_url: Option<String>,

    #[serde(skip_deserializing)]
    pub created_at: DateTimeWithTimeZone,

    #[serde(skip_deserializing)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
