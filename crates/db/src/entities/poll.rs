//! Poll entity: a named, time-windowed collection of questions.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "poll")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// Start of the window in which anonymous callers can see the poll.
    /// Fixed once the poll is created.
    pub start_date: DateTimeWithTimeZone,

    /// End of the visibility window (inclusive). Not checked against
    /// `start_date`.
    pub end_date: DateTimeWithTimeZone,

    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    /// Whether `now` falls inside `[start_date, end_date]`.
    #[must_use]
    pub fn is_active_at(&self, now: DateTimeWithTimeZone) -> bool {
        self.start_date <= now && now <= self.end_date
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::question::Entity")]
    Question,

    #[sea_orm(has_many = "super::user_form::Entity")]
    UserForm,
}

impl Related<super::question::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Question.def()
    }
}

impl Related<super::user_form::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserForm.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
