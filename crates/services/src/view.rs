use chrono::{DateTime, Utc};
use serde::Serialize;

use questionnaire_core::model::{
    AccessNotice, CourseModuleId, PageNumber, QuestionDisplay, QuestionnaireId, ResponseEntry,
    ResponseId, UserId,
};
use questionnaire_core::time::format_submission_date;

/// Template the page data is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateId {
    Index,
    Page,
}

impl TemplateId {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TemplateId::Index => "index",
            TemplateId::Page => "page",
        }
    }
}

/// One past submission listed on the index page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionItem {
    pub id: ResponseId,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexView {
    pub submissions: Vec<SubmissionItem>,
    /// The caller has a saved, unsubmitted response to pick up.
    pub resume: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    pub page: PageNumber,
    pub has_previous: bool,
    pub has_next: bool,
    pub questions: Vec<QuestionDisplay>,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageBody {
    Index(IndexView),
    Page(PageView),
    /// Blank state: blocked, unauthorised, or unrecognised request.
    Empty,
}

/// Structured page data for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageData {
    pub course_module_id: CourseModuleId,
    pub user_id: UserId,
    pub questionnaire_id: QuestionnaireId,
    pub intro: String,
    pub autonumber: bool,
    pub response_id: Option<ResponseId>,
    pub page: PageNumber,
    pub notifications: Vec<AccessNotice>,
    pub body: PageBody,
}

impl PageData {
    #[must_use]
    pub fn is_empty_page(&self) -> bool {
        match &self.body {
            PageBody::Index(index) => index.submissions.is_empty(),
            PageBody::Page(_) => false,
            PageBody::Empty => true,
        }
    }

    #[must_use]
    pub fn page_view(&self) -> Option<&PageView> {
        match &self.body {
            PageBody::Page(view) => Some(view),
            _ => None,
        }
    }

    #[must_use]
    pub fn index_view(&self) -> Option<&IndexView> {
        match &self.body {
            PageBody::Index(view) => Some(view),
            _ => None,
        }
    }

    /// Flat context handed to templates.
    #[must_use]
    pub fn template_context(&self) -> TemplateContext {
        let (submissions, resume) = match &self.body {
            PageBody::Index(index) => (
                index
                    .submissions
                    .iter()
                    .map(|s| SubmissionContext {
                        submissionid: s.id,
                        submissiondate: format_submission_date(s.submitted_at),
                    })
                    .collect(),
                index.resume,
            ),
            _ => (Vec::new(), false),
        };
        let page = self.page_view();

        TemplateContext {
            cmid: self.course_module_id,
            userid: self.user_id,
            id: self.questionnaire_id,
            intro: self.intro.clone(),
            autonumquestions: self.autonumber,
            rid: self.response_id,
            pagenum: page.map_or(self.page, |p| p.page),
            prevpage: page.is_some_and(|p| p.has_previous),
            nextpage: page.is_some_and(|p| p.has_next),
            notifications: self.notifications.iter().map(AccessNotice::message).collect(),
            emptypage: self.is_empty_page(),
            submissions,
            resume,
            pagequestions: page.map(|p| p.questions.clone()).unwrap_or_default(),
            completed: page.is_some_and(|p| p.completed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionContext {
    pub submissionid: ResponseId,
    pub submissiondate: String,
}

/// Template-facing view of `PageData`, keyed the way mobile templates expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateContext {
    pub cmid: CourseModuleId,
    pub userid: UserId,
    pub id: QuestionnaireId,
    pub intro: String,
    pub autonumquestions: bool,
    pub rid: Option<ResponseId>,
    pub pagenum: PageNumber,
    pub prevpage: bool,
    pub nextpage: bool,
    pub notifications: Vec<String>,
    pub emptypage: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub submissions: Vec<SubmissionContext>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub resume: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pagequestions: Vec<QuestionDisplay>,
    pub completed: bool,
}

/// Side-channel payload, kept apart from page data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SideData {
    pub responses: Vec<ResponseEntry>,
}

impl SideData {
    /// JSON encoding of the response entries, as shipped in `otherdata`.
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if serialization fails.
    pub fn responses_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.responses)
    }
}

/// Output of one controller invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModel {
    pub template: TemplateId,
    pub page: PageData,
    pub side: SideData,
}
