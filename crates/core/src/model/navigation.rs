use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::{CourseModuleId, ResponseId};

/// A 1-based page number. Never below 1.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageNumber(u32);

impl PageNumber {
    pub const FIRST: PageNumber = PageNumber(1);

    /// Creates a page number, clamping 0 up to the first page.
    #[must_use]
    pub fn new(page: u32) -> Self {
        Self(page.max(1))
    }

    /// Interpret a loosely-typed page parameter; anything below 1 means page 1.
    #[must_use]
    pub fn from_param(raw: i64) -> Self {
        u32::try_from(raw).map_or(Self::FIRST, Self::new)
    }

    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for PageNumber {
    fn default() -> Self {
        Self::FIRST
    }
}

impl fmt::Debug for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PageNumber({})", self.0)
    }
}

impl fmt::Display for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the mobile client asked to do.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Action {
    #[default]
    Index,
    Respond,
    Resume,
    NextPage,
    PreviousPage,
    Review,
    /// Unrecognised action string; handled as a blank page.
    Unknown(String),
}

impl Action {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Action::Index => "index",
            Action::Respond => "respond",
            Action::Resume => "resume",
            Action::NextPage => "nextpage",
            Action::PreviousPage => "previouspage",
            Action::Review => "review",
            Action::Unknown(raw) => raw,
        }
    }

    /// Actions that walk through the questionnaire pages.
    #[must_use]
    pub fn is_paging(&self) -> bool {
        matches!(
            self,
            Action::Respond | Action::Resume | Action::NextPage | Action::PreviousPage
        )
    }
}

impl FromStr for Action {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "index" => Action::Index,
            "respond" => Action::Respond,
            "resume" => Action::Resume,
            "nextpage" => Action::NextPage,
            "previouspage" => Action::PreviousPage,
            "review" => Action::Review,
            other => Action::Unknown(other.to_owned()),
        })
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One navigation request against a questionnaire activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest {
    pub course_module_id: CourseModuleId,
    pub response_id: Option<ResponseId>,
    pub action: Action,
    pub page: PageNumber,
    pub review_submission_id: Option<ResponseId>,
}

impl NavigationRequest {
    /// Index request for an activity with every optional field defaulted.
    #[must_use]
    pub fn new(course_module_id: CourseModuleId) -> Self {
        Self {
            course_module_id,
            response_id: None,
            action: Action::Index,
            page: PageNumber::FIRST,
            review_submission_id: None,
        }
    }

    #[must_use]
    pub fn with_action(mut self, action: Action) -> Self {
        self.action = action;
        self
    }

    #[must_use]
    pub fn with_page(mut self, page: PageNumber) -> Self {
        self.page = page;
        self
    }

    #[must_use]
    pub fn with_response(mut self, response_id: ResponseId) -> Self {
        self.response_id = Some(response_id);
        self
    }

    #[must_use]
    pub fn reviewing(mut self, submission: ResponseId) -> Self {
        self.action = Action::Review;
        self.review_submission_id = Some(submission);
        self
    }
}
