use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{
    CourseId, CourseModuleId, PageNumber, Question, QuestionId, QuestionnaireId, Response,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionnaireError {
    #[error("question {0} is defined more than once")]
    DuplicateQuestion(QuestionId),

    #[error("page {page} references unknown question {question}")]
    UnknownQuestion { page: u32, question: QuestionId },

    #[error("question {0} appears on more than one page")]
    QuestionOnSeveralPages(QuestionId),

    #[error("question {0} is not placed on any page")]
    UnplacedQuestion(QuestionId),

    #[error("closes_at is before opens_at")]
    InvalidTimeRange,
}

/// How many submissions a user may make.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionLimit {
    #[default]
    Unlimited,
    Once,
    /// At most one submission per UTC calendar day.
    Daily,
}

/// Reason the caller cannot complete the questionnaire right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "notice", rename_all = "snake_case")]
pub enum AccessNotice {
    NotYetOpen { opens_at: DateTime<Utc> },
    Closed { closed_at: DateTime<Utc> },
    CannotSubmit,
    AlreadySubmitted,
}

impl AccessNotice {
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            AccessNotice::NotYetOpen { opens_at } => {
                format!("This questionnaire opens on {}.", opens_at.format("%Y-%m-%d %H:%M UTC"))
            }
            AccessNotice::Closed { closed_at } => {
                format!("This questionnaire closed on {}.", closed_at.format("%Y-%m-%d %H:%M UTC"))
            }
            AccessNotice::CannotSubmit => "You are not eligible to take this questionnaire.".into(),
            AccessNotice::AlreadySubmitted => "You have already filled out this questionnaire.".into(),
        }
    }
}

/// A questionnaire: its questions in document order and how they are paged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Questionnaire {
    id: QuestionnaireId,
    name: String,
    intro: String,
    autonumber: bool,
    opens_at: Option<DateTime<Utc>>,
    closes_at: Option<DateTime<Utc>>,
    submission_limit: SubmissionLimit,
    questions: Vec<Question>,
    pages: Vec<Vec<QuestionId>>,
}

impl Questionnaire {
    /// Build a questionnaire from its questions and page layout.
    ///
    /// # Errors
    ///
    /// Returns `QuestionnaireError` when question ids repeat, a page references
    /// an unknown question, or a question is placed on zero or several pages.
    pub fn new(
        id: QuestionnaireId,
        name: impl Into<String>,
        questions: Vec<Question>,
        pages: Vec<Vec<QuestionId>>,
    ) -> Result<Self, QuestionnaireError> {
        let mut known = HashSet::with_capacity(questions.len());
        for question in &questions {
            if !known.insert(question.id()) {
                return Err(QuestionnaireError::DuplicateQuestion(question.id()));
            }
        }

        let mut placed = HashSet::with_capacity(questions.len());
        for (index, page) in pages.iter().enumerate() {
            for question in page {
                if !known.contains(question) {
                    return Err(QuestionnaireError::UnknownQuestion {
                        page: u32::try_from(index + 1).unwrap_or(u32::MAX),
                        question: *question,
                    });
                }
                if !placed.insert(*question) {
                    return Err(QuestionnaireError::QuestionOnSeveralPages(*question));
                }
            }
        }

        if let Some(unplaced) = questions.iter().find(|q| !placed.contains(&q.id())) {
            return Err(QuestionnaireError::UnplacedQuestion(unplaced.id()));
        }

        Ok(Self {
            id,
            name: name.into(),
            intro: String::new(),
            autonumber: false,
            opens_at: None,
            closes_at: None,
            submission_limit: SubmissionLimit::Unlimited,
            questions,
            pages,
        })
    }

    #[must_use]
    pub fn with_intro(mut self, intro: impl Into<String>) -> Self {
        self.intro = intro.into();
        self
    }

    #[must_use]
    pub fn with_autonumber(mut self, autonumber: bool) -> Self {
        self.autonumber = autonumber;
        self
    }

    #[must_use]
    pub fn with_submission_limit(mut self, limit: SubmissionLimit) -> Self {
        self.submission_limit = limit;
        self
    }

    /// Restrict the window in which the questionnaire can be completed.
    ///
    /// # Errors
    ///
    /// Returns `QuestionnaireError::InvalidTimeRange` if both bounds are set
    /// and `closes_at` is before `opens_at`.
    pub fn with_schedule(
        mut self,
        opens_at: Option<DateTime<Utc>>,
        closes_at: Option<DateTime<Utc>>,
    ) -> Result<Self, QuestionnaireError> {
        if let (Some(open), Some(close)) = (opens_at, closes_at) {
            if close < open {
                return Err(QuestionnaireError::InvalidTimeRange);
            }
        }
        self.opens_at = opens_at;
        self.closes_at = closes_at;
        Ok(self)
    }

    #[must_use]
    pub fn id(&self) -> QuestionnaireId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn intro(&self) -> &str {
        &self.intro
    }

    #[must_use]
    pub fn autonumber(&self) -> bool {
        self.autonumber
    }

    #[must_use]
    pub fn opens_at(&self) -> Option<DateTime<Utc>> {
        self.opens_at
    }

    #[must_use]
    pub fn closes_at(&self) -> Option<DateTime<Utc>> {
        self.closes_at
    }

    #[must_use]
    pub fn submission_limit(&self) -> SubmissionLimit {
        self.submission_limit
    }

    /// All questions in document order.
    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id() == id)
    }

    #[must_use]
    pub fn page_count(&self) -> u32 {
        u32::try_from(self.pages.len()).unwrap_or(u32::MAX)
    }

    /// Question ids on a page, or an empty slice when the page does not exist.
    #[must_use]
    pub fn page(&self, page: PageNumber) -> &[QuestionId] {
        let index = (page.get() - 1) as usize;
        self.pages.get(index).map_or(&[], Vec::as_slice)
    }

    /// Questions on a page in their defined order.
    pub fn page_questions(&self, page: PageNumber) -> impl Iterator<Item = &Question> + '_ {
        self.page(page).iter().filter_map(|id| self.question(*id))
    }

    /// Whether any question on the page is eligible for the response.
    #[must_use]
    pub fn page_has_eligible_questions(&self, page: PageNumber, response: Option<&Response>) -> bool {
        self.page_questions(page).any(|q| q.is_eligible(response))
    }

    #[must_use]
    pub fn has_dependencies(&self) -> bool {
        self.questions.iter().any(|q| !q.dependencies().is_empty())
    }

    /// Notices that block the caller from completing the questionnaire.
    ///
    /// `submitted` is the caller's submitted responses for this questionnaire.
    #[must_use]
    pub fn access_notices(
        &self,
        now: DateTime<Utc>,
        can_submit: bool,
        submitted: &[Response],
    ) -> Vec<AccessNotice> {
        let mut notices = Vec::new();

        if let Some(opens_at) = self.opens_at.filter(|open| now < *open) {
            notices.push(AccessNotice::NotYetOpen { opens_at });
        }
        if let Some(closed_at) = self.closes_at.filter(|close| now > *close) {
            notices.push(AccessNotice::Closed { closed_at });
        }
        if !can_submit {
            notices.push(AccessNotice::CannotSubmit);
        }

        let limit_reached = match self.submission_limit {
            SubmissionLimit::Unlimited => false,
            SubmissionLimit::Once => submitted.iter().any(Response::is_submitted),
            SubmissionLimit::Daily => submitted
                .iter()
                .filter_map(Response::submitted_at)
                .any(|at| at.date_naive() == now.date_naive()),
        };
        if limit_reached {
            notices.push(AccessNotice::AlreadySubmitted);
        }

        notices
    }
}

/// A questionnaire as placed in a course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub course_id: CourseId,
    pub course_module_id: CourseModuleId,
    pub questionnaire: Questionnaire,
}
