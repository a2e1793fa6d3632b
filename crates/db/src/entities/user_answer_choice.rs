//! Link between a user answer and a selected choice.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user_answer_choice")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_answer_id: String,

    #[sea_orm(primary_key, auto_increment = false)]
    pub choice_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user_answer::Entity",
        from = "Column::UserAnswerId",
        to = "super::user_answer::Column::Id",
        on_delete = "Cascade"
    )]
    UserAnswer,

    #[sea_orm(
        belongs_to = "super::choice::Entity",
        from = "Column::ChoiceId",
        to = "super::choice::Column::Id",
        on_delete = "Cascade"
    )]
    Choice,
}

impl ActiveModelBehavior for ActiveModel {}
