//! JSON fixtures describing activities, responses, and capability grants.
//!
//! Used by the command-line front end and by tests to stand up an
//! in-memory backend without a host platform.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use questionnaire_core::model::{
    Activity, Answer, CapabilitySet, Choice, CourseId, CourseModuleId, Dependency, Question,
    QuestionId, QuestionKind, Questionnaire, QuestionnaireId, Response, ResponseId,
    SubmissionLimit, UserId,
};
use serde::Deserialize;
use thiserror::Error;

use crate::repository::{InMemoryRepository, StorageError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FixtureError {
    #[error("cannot read fixture {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid fixture JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Model(#[from] questionnaire_core::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuestionRecord {
    pub id: QuestionId,
    pub kind: QuestionKind,
    pub name: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl QuestionRecord {
    fn into_question(self) -> Question {
        let mut question =
            Question::new(self.id, self.kind, self.name, self.content).required(self.required);
        for choice in self.choices {
            question = question.with_choice(choice.id, choice.label);
        }
        for dep in self.dependencies {
            question = question.depends_on(dep.question, dep.choice);
        }
        question
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuestionnaireRecord {
    pub id: QuestionnaireId,
    pub name: String,
    #[serde(default)]
    pub intro: String,
    #[serde(default)]
    pub autonumber: bool,
    #[serde(default)]
    pub opens_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub closes_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub submission_limit: SubmissionLimit,
    pub questions: Vec<QuestionRecord>,
    pub pages: Vec<Vec<QuestionId>>,
}

impl QuestionnaireRecord {
    /// Convert the record into a validated domain `Questionnaire`.
    ///
    /// # Errors
    ///
    /// Returns `FixtureError::Model` if the page layout or schedule is invalid.
    pub fn into_questionnaire(self) -> Result<Questionnaire, FixtureError> {
        let questions = self
            .questions
            .into_iter()
            .map(QuestionRecord::into_question)
            .collect();
        let questionnaire = Questionnaire::new(self.id, self.name, questions, self.pages)
            .and_then(|q| q.with_schedule(self.opens_at, self.closes_at))
            .map_err(questionnaire_core::Error::from)?;
        Ok(questionnaire
            .with_intro(self.intro)
            .with_autonumber(self.autonumber)
            .with_submission_limit(self.submission_limit))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActivityRecord {
    pub course_id: CourseId,
    pub course_module_id: CourseModuleId,
    pub questionnaire: QuestionnaireRecord,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseRecord {
    pub id: ResponseId,
    pub questionnaire_id: QuestionnaireId,
    pub user_id: UserId,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub answers: BTreeMap<QuestionId, Answer>,
}

impl ResponseRecord {
    #[must_use]
    pub fn into_response(self) -> Response {
        Response::from_persisted(
            self.id,
            self.questionnaire_id,
            self.user_id,
            self.submitted_at,
            self.answers,
        )
    }
}

/// Capabilities a user holds in one activity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Grant {
    pub user_id: UserId,
    pub course_module_id: CourseModuleId,
    pub capabilities: CapabilitySet,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub activities: Vec<ActivityRecord>,
    #[serde(default)]
    pub responses: Vec<ResponseRecord>,
    #[serde(default)]
    pub grants: Vec<Grant>,
}

impl Fixture {
    /// Parse a fixture from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns `FixtureError::Json` if the document does not match the fixture shape.
    pub fn from_json(json: &str) -> Result<Self, FixtureError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a fixture file.
    ///
    /// # Errors
    ///
    /// Returns `FixtureError::Io` if the file cannot be read, or
    /// `FixtureError::Json` if it cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, FixtureError> {
        let json = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Populate an in-memory repository, returning it with the fixture's grants.
    ///
    /// # Errors
    ///
    /// Returns `FixtureError` if a questionnaire is invalid or storing fails.
    pub fn into_repository(self) -> Result<(InMemoryRepository, Vec<Grant>), FixtureError> {
        let repo = InMemoryRepository::new();
        for record in self.activities {
            let questionnaire = record.questionnaire.into_questionnaire()?;
            repo.insert_activity(Activity {
                course_id: record.course_id,
                course_module_id: record.course_module_id,
                questionnaire,
            })?;
        }
        for record in self.responses {
            repo.upsert_response(record.into_response())?;
        }
        Ok((repo, self.grants))
    }
}
