//! Anonymous session entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "session")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub session_key: String,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(indexed)]
    pub expires_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_form::Entity")]
    UserForm,
}

impl Related<super::user_form::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserForm.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
