//! Submission service: validates a session's answers to a poll and stores
//! them as one user form.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use survey_common::{AppError, AppResult, FieldErrors, IdGenerator, SessionKey};
use survey_db::{
    entities::{
        choice, question, question::QuestionType, user_answer, user_answer_choice, user_form,
    },
    repositories::{
        ChoiceRepository, NewAnswer, NewSubmission, PollRepository, QuestionRepository,
        UserFormRepository,
    },
};
use validator::{Validate, ValidationError};

use crate::access::SubmissionScope;
use crate::services::{Page, PageRequest};

static PHONE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,11}$").expect("phone number pattern is valid"));

const ALREADY_SUBMITTED: &str = "This poll has already been completed";

/// Submission service for business logic.
#[derive(Clone)]
pub struct SubmissionService {
    form_repo: UserFormRepository,
    poll_repo: PollRepository,
    question_repo: QuestionRepository,
    choice_repo: ChoiceRepository,
    id_gen: IdGenerator,
}

/// A poll response as sent by the client.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitInput {
    pub poll: String,

    #[validate(custom(function = "validate_phone_number"))]
    pub phone_number: Option<String>,

    #[validate(email(message = "Enter a valid email address"))]
    pub email: Option<String>,

    #[serde(default, alias = "userAnswers")]
    #[validate(nested)]
    pub answers: Vec<ProposedAnswer>,
}

/// One answer as sent by the client, before its question is known.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProposedAnswer {
    pub question: String,

    #[serde(default)]
    pub choices: Vec<String>,

    #[validate(length(max = 1024))]
    pub custom_answer: Option<String>,
}

/// A validated answer. Each question type carries only its own data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "UPPERCASE")]
pub enum Answer {
    Custom(String),
    Single(String),
    Multiple(Vec<String>),
}

impl Answer {
    /// Selected choice IDs (empty for free-text answers).
    #[must_use]
    pub fn choice_ids(&self) -> &[String] {
        match self {
            Self::Custom(_) => &[],
            Self::Single(id) => std::slice::from_ref(id),
            Self::Multiple(ids) => ids,
        }
    }

    /// Free text, only for custom answers.
    #[must_use]
    pub fn custom_answer(&self) -> Option<&str> {
        match self {
            Self::Custom(text) => Some(text),
            Self::Single(_) | Self::Multiple(_) => None,
        }
    }
}

/// A stored answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRecord {
    pub id: String,
    pub question_id: String,
    pub choices: Vec<String>,
    pub custom_answer: Option<String>,
}

/// A stored user form with its answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFormDetail {
    pub form: user_form::Model,
    pub answers: Vec<AnswerRecord>,
}

fn validate_phone_number(value: &str) -> Result<(), ValidationError> {
    if PHONE_NUMBER.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::new("phone_number").with_message("Enter up to 11 digits".into()))
    }
}

/// Check a proposed answer against its question's type.
///
/// Repeated choice IDs count once. A `MULTIPLE` question needs at least two
/// distinct choices. Choices sent for a `CUSTOM` question and text sent for a
/// choice question are dropped. Failures are keyed by the question's text.
pub fn validate_answer(question: &question::Model, proposed: &ProposedAnswer) -> AppResult<Answer> {
    let mut seen = HashSet::new();
    let mut choices: Vec<String> = proposed
        .choices
        .iter()
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect();

    let answer = match question.question_type {
        QuestionType::Single if choices.len() == 1 => choices.pop().map(Answer::Single),
        QuestionType::Multiple if choices.len() > 1 => Some(Answer::Multiple(choices)),
        QuestionType::Custom => proposed
            .custom_answer
            .as_ref()
            .filter(|text| !text.is_empty())
            .map(|text| Answer::Custom(text.clone())),
        QuestionType::Single | QuestionType::Multiple => None,
    };

    answer.ok_or_else(|| AppError::invalid(&question.text, reason(question.question_type)))
}

const fn reason(question_type: QuestionType) -> &'static str {
    match question_type {
        QuestionType::Single => "Select exactly one option",
        QuestionType::Multiple => "Select several options",
        QuestionType::Custom => "Enter your own answer",
    }
}

impl SubmissionService {
    /// Create a new submission service.
    #[must_use]
    pub const fn new(
        form_repo: UserFormRepository,
        poll_repo: PollRepository,
        question_repo: QuestionRepository,
        choice_repo: ChoiceRepository,
    ) -> Self {
        Self {
            form_repo,
            poll_repo,
            question_repo,
            choice_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Submit a session's response to a poll.
    ///
    /// Either the whole form is stored or nothing is.
    pub async fn submit(&self, session: &SessionKey, input: SubmitInput) -> AppResult<UserFormDetail> {
        input.validate()?;

        let poll = self.poll_repo.get_by_id(&input.poll).await?;

        if self.form_repo.exists_for(session.as_str(), &poll.id).await? {
            return Err(AppError::duplicate("poll", ALREADY_SUBMITTED));
        }

        let questions = self.load_questions(&input.answers).await?;
        let choices = self.load_choices(&input.answers).await?;

        let mut errors = FieldErrors::new();
        let mut answered = HashSet::new();
        let mut validated = Vec::with_capacity(input.answers.len());

        for (index, proposed) in input.answers.iter().enumerate() {
            let Some(question) = questions.get(proposed.question.as_str()) else {
                continue;
            };

            if question.poll_id != poll.id {
                errors.add(
                    format!("answers[{index}].question"),
                    "Question does not belong to this poll",
                );
                continue;
            }
            if !answered.insert(question.id.as_str()) {
                errors.add(&question.text, "Question answered more than once");
                continue;
            }
            if let Some(foreign) = proposed
                .choices
                .iter()
                .find(|id| choices.get(id.as_str()).is_some_and(|c| c.question_id != question.id))
            {
                errors.add(
                    format!("answers[{index}].choices"),
                    format!("Choice {foreign} does not belong to this question"),
                );
                continue;
            }

            match validate_answer(question, proposed) {
                Ok(answer) => validated.push((question.id.clone(), answer)),
                Err(AppError::Validation(fields)) => {
                    for (field, messages) in fields.iter() {
                        for message in messages {
                            errors.add(field.clone(), message.clone());
                        }
                    }
                }
                Err(e) => return Err(e),
            }
        }

        if !errors.is_empty() {
            tracing::debug!(poll_id = %poll.id, errors = %errors, "Rejected submission");
            return Err(AppError::Validation(errors));
        }

        let (submission, records) = self.build_submission(session, &poll.id, &input, validated);

        let form = match self.form_repo.create_submission(submission).await {
            Ok(form) => form,
            Err(AppError::Uniqueness(_)) => {
                tracing::warn!(
                    poll_id = %poll.id,
                    "Concurrent submission from the same session lost the race"
                );
                return Err(AppError::duplicate("poll", ALREADY_SUBMITTED));
            }
            Err(e) => return Err(e),
        };

        tracing::info!(
            form_id = %form.id,
            poll_id = %form.poll_id,
            answers = records.len(),
            "Poll submitted"
        );

        Ok(UserFormDetail {
            form,
            answers: records,
        })
    }

    /// Replace the choices of a stored answer, checked like a new one.
    pub async fn update_answer_choices(
        &self,
        answer_id: &str,
        choice_ids: Vec<String>,
    ) -> AppResult<AnswerRecord> {
        let stored = self.form_repo.get_answer(answer_id).await?;
        let question = self.question_repo.get_by_id(&stored.question_id).await?;

        let found = self.choice_repo.find_by_ids(&choice_ids).await?;
        for id in &choice_ids {
            match found.iter().find(|c| &c.id == id) {
                None => return Err(AppError::NotFound(format!("Choice not found: {id}"))),
                Some(c) if c.question_id != question.id => {
                    return Err(AppError::invalid(
                        "choices",
                        format!("Choice {id} does not belong to this question"),
                    ));
                }
                Some(_) => {}
            }
        }

        let proposed = ProposedAnswer {
            question: question.id.clone(),
            choices: choice_ids,
            custom_answer: stored.custom_answer.clone(),
        };
        let answer = validate_answer(&question, &proposed)?;
        if let Answer::Custom(_) = answer {
            return Err(AppError::invalid(
                &question.text,
                "Free-text answers have no choices",
            ));
        }

        let links = answer
            .choice_ids()
            .iter()
            .map(|choice_id| user_answer_choice::ActiveModel {
                user_answer_id: Set(stored.id.clone()),
                choice_id: Set(choice_id.clone()),
            })
            .collect();
        self.form_repo.replace_answer_choices(&stored.id, links).await?;

        Ok(AnswerRecord {
            id: stored.id,
            question_id: stored.question_id,
            choices: answer.choice_ids().to_vec(),
            custom_answer: None,
        })
    }

    /// List user forms visible in `scope`.
    pub async fn list(
        &self,
        scope: &SubmissionScope,
        page: PageRequest,
    ) -> AppResult<Page<UserFormDetail>> {
        let session_key = match scope {
            SubmissionScope::All => None,
            SubmissionScope::Session(key) => Some(key.as_str()),
            SubmissionScope::Nothing => return Ok(Page::empty()),
        };

        let count = self.form_repo.count(session_key).await?;
        let forms = self
            .form_repo
            .list(session_key, page.limit, page.offset)
            .await?;

        let form_ids: Vec<String> = forms.iter().map(|f| f.id.clone()).collect();
        let answers = self.form_repo.find_answers(&form_ids).await?;
        let answer_ids: Vec<String> = answers.iter().map(|a| a.id.clone()).collect();
        let links = self.form_repo.find_answer_choices(&answer_ids).await?;

        let mut choices_by_answer: HashMap<String, Vec<String>> = HashMap::new();
        for link in links {
            choices_by_answer
                .entry(link.user_answer_id)
                .or_default()
                .push(link.choice_id);
        }

        let mut answers_by_form: HashMap<String, Vec<AnswerRecord>> = HashMap::new();
        for answer in answers {
            let choices = choices_by_answer.remove(&answer.id).unwrap_or_default();
            answers_by_form
                .entry(answer.user_form_id)
                .or_default()
                .push(AnswerRecord {
                    id: answer.id,
                    question_id: answer.question_id,
                    choices,
                    custom_answer: answer.custom_answer,
                });
        }

        let results = forms
            .into_iter()
            .map(|form| UserFormDetail {
                answers: answers_by_form.remove(&form.id).unwrap_or_default(),
                form,
            })
            .collect();

        Ok(Page { count, results })
    }

    async fn load_questions(
        &self,
        answers: &[ProposedAnswer],
    ) -> AppResult<HashMap<String, question::Model>> {
        let ids = distinct(answers.iter().map(|a| &a.question));
        let found: HashMap<String, question::Model> = self
            .question_repo
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|q| (q.id.clone(), q))
            .collect();

        if let Some(missing) = ids.iter().find(|id| !found.contains_key(id.as_str())) {
            return Err(AppError::NotFound(format!("Question not found: {missing}")));
        }
        Ok(found)
    }

    async fn load_choices(
        &self,
        answers: &[ProposedAnswer],
    ) -> AppResult<HashMap<String, choice::Model>> {
        let ids = distinct(answers.iter().flat_map(|a| &a.choices));
        let found: HashMap<String, choice::Model> = self
            .choice_repo
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();

        if let Some(missing) = ids.iter().find(|id| !found.contains_key(id.as_str())) {
            return Err(AppError::NotFound(format!("Choice not found: {missing}")));
        }
        Ok(found)
    }

    fn build_submission(
        &self,
        session: &SessionKey,
        poll_id: &str,
        input: &SubmitInput,
        validated: Vec<(String, Answer)>,
    ) -> (NewSubmission, Vec<AnswerRecord>) {
        let form_id = self.id_gen.generate();
        let mut answers = Vec::with_capacity(validated.len());
        let mut records = Vec::with_capacity(validated.len());

        for (question_id, answer) in validated {
            let answer_id = self.id_gen.generate();
            let custom_answer = answer.custom_answer().map(ToString::to_string);

            answers.push(NewAnswer {
                answer: user_answer::ActiveModel {
                    id: Set(answer_id.clone()),
                    user_form_id: Set(form_id.clone()),
                    question_id: Set(question_id.clone()),
                    custom_answer: Set(custom_answer.clone()),
                },
                choices: answer
                    .choice_ids()
                    .iter()
                    .map(|choice_id| user_answer_choice::ActiveModel {
                        user_answer_id: Set(answer_id.clone()),
                        choice_id: Set(choice_id.clone()),
                    })
                    .collect(),
            });
            records.push(AnswerRecord {
                id: answer_id,
                question_id,
                choices: answer.choice_ids().to_vec(),
                custom_answer,
            });
        }

        let form = user_form::ActiveModel {
            id: Set(form_id),
            session_key: Set(session.as_str().to_string()),
            poll_id: Set(poll_id.to_string()),
            phone_number: Set(input.phone_number.clone()),
            email: Set(input.email.clone()),
            created_at: Set(Utc::now().into()),
        };

        (NewSubmission { form, answers }, records)
    }
}

fn distinct<'a>(ids: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(id.as_str())).cloned().collect()
}
