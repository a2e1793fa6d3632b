//! Create user_form, user_answer and user_answer_choice tables migration.

use sea_orm_migration::prelude::*;

use super::m20250101_000003_create_poll_tables::{Choice, Poll, Question};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserForm::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserForm::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(UserForm::SessionKey).string_len(64).not_null())
                    .col(ColumnDef::new(UserForm::PollId).string_len(32).not_null())
                    .col(ColumnDef::new(UserForm::PhoneNumber).string_len(11))
                    .col(ColumnDef::new(UserForm::Email).string_len(254))
                    .col(
                        ColumnDef::new(UserForm::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_form_session")
                            .from(UserForm::Table, UserForm::SessionKey)
                            .to(Session::Table, Session::SessionKey)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_form_poll")
                            .from(UserForm::Table, UserForm::PollId)
                            .to(Poll::Table, Poll::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (session_key, poll_id) - one submission per session and poll.
        // Concurrent duplicate submissions lose here instead of both succeeding.
        manager
            .create_index(
                Index::create()
                    .name("idx_user_form_session_poll")
                    .table(UserForm::Table)
                    .col(UserForm::SessionKey)
                    .col(UserForm::PollId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_form_poll_id")
                    .table(UserForm::Table)
                    .col(UserForm::PollId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserAnswer::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserAnswer::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserAnswer::UserFormId).string_len(32).not_null())
                    .col(ColumnDef::new(UserAnswer::QuestionId).string_len(32).not_null())
                    .col(ColumnDef::new(UserAnswer::CustomAnswer).string_len(1024))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_answer_user_form")
                            .from(UserAnswer::Table, UserAnswer::UserFormId)
                            .to(UserForm::Table, UserForm::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_answer_question")
                            .from(UserAnswer::Table, UserAnswer::QuestionId)
                            .to(Question::Table, Question::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_answer_user_form_id")
                    .table(UserAnswer::Table)
                    .col(UserAnswer::UserFormId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserAnswerChoice::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserAnswerChoice::UserAnswerId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserAnswerChoice::ChoiceId)
                            .string_len(32)
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(UserAnswerChoice::UserAnswerId)
                            .col(UserAnswerChoice::ChoiceId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_answer_choice_answer")
                            .from(UserAnswerChoice::Table, UserAnswerChoice::UserAnswerId)
                            .to(UserAnswer::Table, UserAnswer::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_answer_choice_choice")
                            .from(UserAnswerChoice::Table, UserAnswerChoice::ChoiceId)
                            .to(Choice::Table, Choice::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_answer_choice_choice_id")
                    .table(UserAnswerChoice::Table)
                    .col(UserAnswerChoice::ChoiceId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserAnswerChoice::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(UserAnswer::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(UserForm::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Session {
    Table,
    SessionKey,
}

#[derive(Iden)]
enum UserForm {
    Table,
    Id,
    SessionKey,
    PollId,
    PhoneNumber,
    Email,
    CreatedAt,
}

#[derive(Iden)]
enum UserAnswer {
    Table,
    Id,
    UserFormId,
    QuestionId,
    CustomAnswer,
}

#[derive(Iden)]
enum UserAnswerChoice {
    Table,
    UserAnswerId,
    ChoiceId,
}
