mod capability;
mod ids;
mod navigation;
mod question;
mod questionnaire;
mod response;

pub use capability::{Capability, CapabilitySet};
pub use ids::{
    ChoiceId, CourseId, CourseModuleId, ParseIdError, QuestionId, QuestionnaireId, ResponseId,
    UserId,
};
pub use navigation::{Action, NavigationRequest, PageNumber};
pub use question::{
    Choice, ChoiceDisplay, Dependency, Question, QuestionDisplay, QuestionKind, ResponseEntry,
};
pub use questionnaire::{
    AccessNotice, Activity, Questionnaire, QuestionnaireError, SubmissionLimit,
};
pub use response::{Answer, NO_CHOICE, Response, YES_CHOICE};
