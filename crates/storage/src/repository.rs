use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use questionnaire_core::model::{
    Activity, CourseModuleId, QuestionnaireId, Response, ResponseId, UserId,
};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),
}

/// Loads questionnaire activities by course-module id.
pub trait QuestionnaireRepository: Send + Sync {
    /// Fetch the activity placed at a course module.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the course module does not resolve.
    fn load_activity(&self, id: CourseModuleId) -> Result<Activity, StorageError>;
}

/// Read access to users' responses.
pub trait ResponseRepository: Send + Sync {
    /// Submitted responses of a user, in repository order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    fn submitted_responses(
        &self,
        questionnaire: QuestionnaireId,
        user: UserId,
    ) -> Result<Vec<Response>, StorageError>;

    /// Whether the user has an in-progress (saved, unsubmitted) response.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    fn has_saved_response(
        &self,
        questionnaire: QuestionnaireId,
        user: UserId,
    ) -> Result<bool, StorageError> {
        Ok(self.latest_saved_response_id(questionnaire, user)?.is_some())
    }

    /// Id of the user's most recent in-progress response, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    fn latest_saved_response_id(
        &self,
        questionnaire: QuestionnaireId,
        user: UserId,
    ) -> Result<Option<ResponseId>, StorageError>;

    /// Fetch one response by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    fn load_response(&self, id: ResponseId) -> Result<Response, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Debug, Default)]
pub struct InMemoryRepository {
    activities: Arc<Mutex<HashMap<CourseModuleId, Activity>>>,
    responses: Arc<Mutex<Vec<Response>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store or replace an activity.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the store lock is poisoned.
    pub fn insert_activity(&self, activity: Activity) -> Result<(), StorageError> {
        let mut guard = self
            .activities
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(activity.course_module_id, activity);
        Ok(())
    }

    /// Store a response, replacing any response with the same id in place.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the store lock is poisoned.
    pub fn upsert_response(&self, response: Response) -> Result<(), StorageError> {
        let mut guard = self
            .responses
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        match guard.iter_mut().find(|r| r.id() == response.id()) {
            Some(existing) => *existing = response,
            None => guard.push(response),
        }
        Ok(())
    }
}

impl QuestionnaireRepository for InMemoryRepository {
    fn load_activity(&self, id: CourseModuleId) -> Result<Activity, StorageError> {
        let guard = self
            .activities
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.get(&id).cloned().ok_or(StorageError::NotFound)
    }
}

impl ResponseRepository for InMemoryRepository {
    fn submitted_responses(
        &self,
        questionnaire: QuestionnaireId,
        user: UserId,
    ) -> Result<Vec<Response>, StorageError> {
        let guard = self
            .responses
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .iter()
            .filter(|r| {
                r.questionnaire_id() == questionnaire && r.user_id() == user && r.is_submitted()
            })
            .cloned()
            .collect())
    }

    fn latest_saved_response_id(
        &self,
        questionnaire: QuestionnaireId,
        user: UserId,
    ) -> Result<Option<ResponseId>, StorageError> {
        let guard = self
            .responses
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .iter()
            .filter(|r| {
                r.questionnaire_id() == questionnaire && r.user_id() == user && !r.is_submitted()
            })
            .map(Response::id)
            .max())
    }

    fn load_response(&self, id: ResponseId) -> Result<Response, StorageError> {
        let guard = self
            .responses
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .iter()
            .find(|r| r.id() == id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }
}

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub questionnaires: Arc<dyn QuestionnaireRepository>,
    pub responses: Arc<dyn ResponseRepository>,
}

impl Storage {
    #[must_use]
    pub fn from_repository(repo: InMemoryRepository) -> Self {
        let questionnaires: Arc<dyn QuestionnaireRepository> = Arc::new(repo.clone());
        let responses: Arc<dyn ResponseRepository> = Arc::new(repo);
        Self {
            questionnaires,
            responses,
        }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_repository(InMemoryRepository::new())
    }
}
