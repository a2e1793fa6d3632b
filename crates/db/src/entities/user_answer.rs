//! User answer entity - the answer to one question inside a user form.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_answer")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub user_form_id: String,

    pub question_id: String,

    /// Set only for `CUSTOM` questions.
    #[sea_orm(nullable)]
    pub custom_answer: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user_form::Entity",
        from = "Column::UserFormId",
        to = "super::user_form::Column::Id",
        on_delete = "Cascade"
    )]
    UserForm,

    #[sea_orm(
        belongs_to = "super::question::Entity",
        from = "Column::QuestionId",
        to = "super::question::Column::Id",
        on_delete = "Cascade"
    )]
    Question,
}

impl Related<super::user_form::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserForm.def()
    }
}

impl Related<super::question::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Question.def()
    }
}

impl Related<super::choice::Entity> for Entity {
    fn to() -> RelationDef {
        super::user_answer_choice::Relation::Choice.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::user_answer_choice::Relation::UserAnswer.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
