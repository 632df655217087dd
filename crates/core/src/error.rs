use thiserror::Error;

use crate::model::{ParseIdError, QuestionnaireError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Questionnaire(#[from] QuestionnaireError),
    #[error(transparent)]
    ParseId(#[from] ParseIdError),
}
