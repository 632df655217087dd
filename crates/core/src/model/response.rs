use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{ChoiceId, QuestionId, QuestionnaireId, ResponseId, UserId};

/// Choice id a yes/no answer selects when answered "yes".
pub const YES_CHOICE: ChoiceId = ChoiceId::new(0);
/// Choice id a yes/no answer selects when answered "no".
pub const NO_CHOICE: ChoiceId = ChoiceId::new(1);

/// A stored answer to one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum Answer {
    YesNo(bool),
    Text(String),
    Choices(Vec<ChoiceId>),
    Ranks(BTreeMap<ChoiceId, u32>),
    Date(NaiveDate),
}

impl Answer {
    /// Whether this answer picked the given choice.
    ///
    /// Yes/no answers select [`YES_CHOICE`] or [`NO_CHOICE`]; ranked answers
    /// select every choice that received a rank.
    #[must_use]
    pub fn selects(&self, choice: ChoiceId) -> bool {
        match self {
            Answer::YesNo(true) => choice == YES_CHOICE,
            Answer::YesNo(false) => choice == NO_CHOICE,
            Answer::Choices(ids) => ids.contains(&choice),
            Answer::Ranks(ranks) => ranks.contains_key(&choice),
            Answer::Text(_) | Answer::Date(_) => false,
        }
    }
}

/// One user's saved or submitted answer set for a questionnaire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    id: ResponseId,
    questionnaire_id: QuestionnaireId,
    user_id: UserId,
    submitted_at: Option<DateTime<Utc>>,
    answers: BTreeMap<QuestionId, Answer>,
}

impl Response {
    /// Start an in-progress response with no answers.
    #[must_use]
    pub fn in_progress(id: ResponseId, questionnaire_id: QuestionnaireId, user_id: UserId) -> Self {
        Self {
            id,
            questionnaire_id,
            user_id,
            submitted_at: None,
            answers: BTreeMap::new(),
        }
    }

    /// Rehydrate a response from persisted storage.
    #[must_use]
    pub fn from_persisted(
        id: ResponseId,
        questionnaire_id: QuestionnaireId,
        user_id: UserId,
        submitted_at: Option<DateTime<Utc>>,
        answers: BTreeMap<QuestionId, Answer>,
    ) -> Self {
        Self {
            id,
            questionnaire_id,
            user_id,
            submitted_at,
            answers,
        }
    }

    #[must_use]
    pub fn with_answer(mut self, question: QuestionId, answer: Answer) -> Self {
        self.answers.insert(question, answer);
        self
    }

    #[must_use]
    pub fn submitted(mut self, at: DateTime<Utc>) -> Self {
        self.submitted_at = Some(at);
        self
    }

    #[must_use]
    pub fn id(&self) -> ResponseId {
        self.id
    }

    #[must_use]
    pub fn questionnaire_id(&self) -> QuestionnaireId {
        self.questionnaire_id
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.submitted_at.is_some()
    }

    #[must_use]
    pub fn is_answered(&self, question: QuestionId) -> bool {
        self.answers.contains_key(&question)
    }

    #[must_use]
    pub fn answer(&self, question: QuestionId) -> Option<&Answer> {
        self.answers.get(&question)
    }

    #[must_use]
    pub fn answers(&self) -> &BTreeMap<QuestionId, Answer> {
        &self.answers
    }
}
