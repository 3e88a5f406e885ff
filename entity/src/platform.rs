use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Publishing platform a user has connected for distributing generated content.
#[derive(Debug, Clone, Copy, Eq, PartialEq, EnumIter, Deserialize, Serialize, DeriveActiveEnum)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "platform")]
pub enum Platform {
    #[sea_orm(string_value = "linkedin")]
    LinkedIn,
    #[sea_orm(string_value = "facebook")]
    Facebook,
    #[sea_orm(string_value = "twitter")]
    Twitter,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LinkedIn => write!(f, "linkedin"),
            Self::Facebook => write!(f, "facebook"),
            Self::Twitter => write!(f, "twitter"),
        }
    }
}
