//! Create poll, question and choice tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Poll::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Poll::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Poll::Title).string_len(4096).not_null())
                    .col(ColumnDef::new(Poll::Description).text().not_null())
                    .col(
                        ColumnDef::new(Poll::StartDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Poll::EndDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Poll::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_poll_title")
                    .table(Poll::Table)
                    .col(Poll::Title)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: (start_date, end_date) for the active-window listing
        manager
            .create_index(
                Index::create()
                    .name("idx_poll_window")
                    .table(Poll::Table)
                    .col(Poll::StartDate)
                    .col(Poll::EndDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Question::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Question::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Question::PollId).string_len(32).not_null())
                    .col(ColumnDef::new(Question::Text).string_len(4096).not_null())
                    .col(
                        ColumnDef::new(Question::QuestionType)
                            .string_len(8)
                            .not_null()
                            .default("SINGLE"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_question_poll")
                            .from(Question::Table, Question::PollId)
                            .to(Poll::Table, Poll::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: text (unique across all polls)
        manager
            .create_index(
                Index::create()
                    .name("idx_question_text")
                    .table(Question::Table)
                    .col(Question::Text)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_question_poll_id")
                    .table(Question::Table)
                    .col(Question::PollId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Choice::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Choice::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Choice::QuestionId).string_len(32).not_null())
                    .col(ColumnDef::new(Choice::Title).string_len(4096).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_choice_question")
                            .from(Choice::Table, Choice::QuestionId)
                            .to(Question::Table, Question::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: title (unique across all questions)
        manager
            .create_index(
                Index::create()
                    .name("idx_choice_title")
                    .table(Choice::Table)
                    .col(Choice::Title)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_choice_question_id")
                    .table(Choice::Table)
                    .col(Choice::QuestionId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Choice::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Question::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Poll::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Poll {
    Table,
    Id,
    Title,
    Description,
    StartDate,
    EndDate,
    CreatedAt,
}

#[derive(Iden)]
pub enum Question {
    Table,
    Id,
    PollId,
    Text,
    QuestionType,
}

#[derive(Iden)]
pub enum Choice {
    Table,
    Id,
    QuestionId,
    Title,
}
