//! Mobile content envelope: request arguments in, rendered template out.

use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use questionnaire_core::model::{
    Action, CourseModuleId, NavigationRequest, PageNumber, ResponseId,
};

use crate::access::UserIdentity;
use crate::controller::ActivityPageController;
use crate::error::PageError;
use crate::render::Renderer;

/// Loosely-typed parameter as sent by the app: a number or a numeric string.
#[derive(Deserialize)]
#[serde(untagged)]
enum Param {
    Int(i64),
    Text(String),
    Other(serde_json::Value),
}

impl Param {
    fn as_i64(&self) -> Option<i64> {
        match self {
            Param::Int(v) => Some(*v),
            Param::Text(s) => s.trim().parse().ok(),
            Param::Other(_) => None,
        }
    }
}

fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Param>::deserialize(deserializer)?.and_then(|p| p.as_i64()))
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Param>::deserialize(deserializer)? {
        Some(Param::Text(s)) => Some(s),
        _ => None,
    })
}

fn required_id<'de, D>(deserializer: D) -> Result<CourseModuleId, D::Error>
where
    D: Deserializer<'de>,
{
    Param::deserialize(deserializer)?
        .as_i64()
        .and_then(|v| u64::try_from(v).ok())
        .map(CourseModuleId::new)
        .ok_or_else(|| serde::de::Error::custom("cmid must be a non-negative integer"))
}

fn positive_id(raw: Option<i64>) -> Option<ResponseId> {
    raw.filter(|v| *v > 0)
        .and_then(|v| u64::try_from(v).ok())
        .map(ResponseId::new)
}

/// Arguments of a mobile "view activity" content request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MobileArgs {
    #[serde(deserialize_with = "required_id")]
    pub cmid: CourseModuleId,
    #[serde(default, deserialize_with = "lenient_int")]
    pub rid: Option<i64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub action: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub pagenum: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub submissionid: Option<i64>,
}

impl MobileArgs {
    #[must_use]
    pub fn new(cmid: CourseModuleId) -> Self {
        Self {
            cmid,
            rid: None,
            action: None,
            pagenum: None,
            submissionid: None,
        }
    }

    /// Parse arguments from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` when `cmid` is missing or not an integer.
    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Build the navigation request, defaulting every optional field.
    ///
    /// `rid` and `submissionid` of 0 mean "none"; `pagenum` below 1 means 1.
    #[must_use]
    pub fn into_request(self) -> NavigationRequest {
        let action = self
            .action
            .map_or(Action::Index, |raw| raw.parse::<Action>().unwrap_or_default());
        NavigationRequest {
            course_module_id: self.cmid,
            response_id: positive_id(self.rid),
            action,
            page: self.pagenum.map_or(PageNumber::FIRST, PageNumber::from_param),
            review_submission_id: positive_id(self.submissionid),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MobileTemplate {
    pub id: String,
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OtherData {
    /// JSON-encoded response entries.
    pub responses: String,
}

/// Envelope returned to the mobile app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MobileContent {
    pub templates: Vec<MobileTemplate>,
    pub otherdata: OtherData,
    pub files: Option<Vec<String>>,
}

/// Runs the page controller and packs its view model into the mobile envelope.
#[derive(Clone)]
pub struct MobileOutputService {
    controller: ActivityPageController,
    renderer: Arc<dyn Renderer>,
}

impl MobileOutputService {
    #[must_use]
    pub fn new(controller: ActivityPageController, renderer: Arc<dyn Renderer>) -> Self {
        Self {
            controller,
            renderer,
        }
    }

    /// Produce the mobile content for one "view activity" request.
    ///
    /// # Errors
    ///
    /// Propagates `PageError` from the controller, and returns
    /// `PageError::Render` or `PageError::Encode` if output cannot be produced.
    pub fn view_activity(
        &self,
        args: MobileArgs,
        caller: UserIdentity,
    ) -> Result<MobileContent, PageError> {
        let request = args.into_request();
        let view = self.controller.handle(&request, caller)?;

        let html = self
            .renderer
            .render(view.template, &view.page.template_context())?;
        let responses = view.side.responses_json()?;
        debug!(
            template = view.template.as_str(),
            entries = view.side.responses.len(),
            "rendered mobile content"
        );

        Ok(MobileContent {
            templates: vec![MobileTemplate {
                id: "main".to_owned(),
                html,
            }],
            otherdata: OtherData { responses },
            files: None,
        })
    }
}
