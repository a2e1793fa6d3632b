//! User form entity - one session's submission for one poll.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_form")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Submitting session. `(session_key, poll_id)` is unique.
    #[sea_orm(indexed)]
    pub session_key: String,

    #[sea_orm(indexed)]
    pub poll_id: String,

    #[sea_orm(nullable)]
    pub phone_number: Option<String>,

    #[sea_orm(nullable)]
    pub email: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::session::Entity",
        from = "Column::SessionKey",
        to = "super::session::Column::SessionKey",
        on_delete = "Restrict"
    )]
    Session,

    #[sea_orm(
        belongs_to = "super::poll::Entity",
        from = "Column::PollId",
        to = "super::poll::Column::Id",
        on_delete = "Cascade"
    )]
    Poll,

    #[sea_orm(has_many = "super::user_answer::Entity")]
    UserAnswer,
}

impl Related<super::session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl Related<super::poll::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Poll.def()
    }
}

impl Related<super::user_answer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserAnswer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
