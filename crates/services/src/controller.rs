use std::sync::Arc;

use tracing::{debug, warn};

use questionnaire_core::model::{
    Action, Activity, Capability, NavigationRequest, PageNumber, Response, ResponseId, UserId,
};
use questionnaire_core::{Clock, ConditionalNavigation, NavigationPolicy};
use storage::{QuestionnaireRepository, ResponseRepository, Storage, StorageError};

use crate::access::{AccessPolicy, UserIdentity};
use crate::error::PageError;
use crate::pagination::{assemble_page, assemble_review, page_flags, resolve_page};
use crate::view::{
    IndexView, PageBody, PageData, PageView, SideData, SubmissionItem, TemplateId, ViewModel,
};

/// Turns a navigation request into page data for one questionnaire activity.
///
/// The controller holds no per-request state; every collaborator is injected.
#[derive(Clone)]
pub struct ActivityPageController {
    clock: Clock,
    questionnaires: Arc<dyn QuestionnaireRepository>,
    responses: Arc<dyn ResponseRepository>,
    access: Arc<dyn AccessPolicy>,
    navigation: Arc<dyn NavigationPolicy>,
}

/// What a dispatched action contributes to the view model.
struct Outcome {
    template: TemplateId,
    body: PageBody,
    side: SideData,
    response_id: Option<ResponseId>,
    page: PageNumber,
}

impl Outcome {
    fn blank(request: &NavigationRequest) -> Self {
        Self {
            template: TemplateId::Index,
            body: PageBody::Empty,
            side: SideData::default(),
            response_id: None,
            page: request.page,
        }
    }
}

impl ActivityPageController {
    #[must_use]
    pub fn new(
        clock: Clock,
        questionnaires: Arc<dyn QuestionnaireRepository>,
        responses: Arc<dyn ResponseRepository>,
        access: Arc<dyn AccessPolicy>,
    ) -> Self {
        Self {
            clock,
            questionnaires,
            responses,
            access,
            navigation: Arc::new(ConditionalNavigation),
        }
    }

    #[must_use]
    pub fn from_storage(clock: Clock, storage: &Storage, access: Arc<dyn AccessPolicy>) -> Self {
        Self::new(
            clock,
            Arc::clone(&storage.questionnaires),
            Arc::clone(&storage.responses),
            access,
        )
    }

    #[must_use]
    pub fn with_navigation(mut self, navigation: Arc<dyn NavigationPolicy>) -> Self {
        self.navigation = navigation;
        self
    }

    /// Handle one navigation request for `caller`.
    ///
    /// # Errors
    ///
    /// Returns `PageError::NotFound` if the activity does not resolve,
    /// `PageError::AccessDenied` if the caller fails the login or `view`
    /// check, and `PageError::Storage` for repository failures.
    pub fn handle(
        &self,
        request: &NavigationRequest,
        caller: UserIdentity,
    ) -> Result<ViewModel, PageError> {
        let activity = self
            .questionnaires
            .load_activity(request.course_module_id)
            .map_err(PageError::lookup("activity"))?;

        let user = self.guard(caller, &activity)?;
        let questionnaire = &activity.questionnaire;

        let submitted = self.responses.submitted_responses(questionnaire.id(), user)?;
        let can_submit = self
            .access
            .has_capability(user, &activity, Capability::Submit);
        let notifications = questionnaire.access_notices(self.clock.now(), can_submit, &submitted);
        let can_read_own = self
            .access
            .has_capability(user, &activity, Capability::ReadOwnResponses);

        debug!(
            cmid = %request.course_module_id,
            user = %user,
            action = %request.action,
            page = %request.page,
            notices = notifications.len(),
            "dispatching questionnaire page request"
        );

        let outcome = match &request.action {
            Action::Index if can_read_own => self.index(request, &activity, user, submitted)?,
            action if action.is_paging() && notifications.is_empty() => {
                self.paging(request, &activity, user)?
            }
            Action::Review if can_read_own => match request.review_submission_id {
                Some(submission) => self.review(request, &activity, user, submission)?,
                None => Outcome::blank(request),
            },
            _ => Outcome::blank(request),
        };

        Ok(ViewModel {
            template: outcome.template,
            page: PageData {
                course_module_id: activity.course_module_id,
                user_id: user,
                questionnaire_id: questionnaire.id(),
                intro: questionnaire.intro().to_owned(),
                autonumber: questionnaire.autonumber(),
                response_id: outcome.response_id,
                page: outcome.page,
                notifications,
                body: outcome.body,
            },
            side: outcome.side,
        })
    }

    fn guard(&self, caller: UserIdentity, activity: &Activity) -> Result<UserId, PageError> {
        let checked = self.access.require_login(caller, activity).and_then(|user| {
            self.access
                .require_capability(user, activity, Capability::View)
                .map(|()| user)
        });
        checked.map_err(|denied| {
            warn!(cmid = %activity.course_module_id, ?caller, %denied, "questionnaire access denied");
            PageError::AccessDenied(denied)
        })
    }

    fn index(
        &self,
        request: &NavigationRequest,
        activity: &Activity,
        user: UserId,
        submitted: Vec<Response>,
    ) -> Result<Outcome, PageError> {
        let submissions = submitted
            .iter()
            .filter_map(|r| {
                r.submitted_at().map(|submitted_at| SubmissionItem {
                    id: r.id(),
                    submitted_at,
                })
            })
            .collect();
        let resume = self
            .responses
            .has_saved_response(activity.questionnaire.id(), user)?;

        Ok(Outcome {
            template: TemplateId::Index,
            body: PageBody::Index(IndexView {
                submissions,
                resume,
            }),
            side: SideData::default(),
            response_id: None,
            page: request.page,
        })
    }

    fn paging(
        &self,
        request: &NavigationRequest,
        activity: &Activity,
        user: UserId,
    ) -> Result<Outcome, PageError> {
        let questionnaire = &activity.questionnaire;

        // A named response the caller does not own counts as no response.
        let mut active = match request.response_id {
            Some(id) => self.own_response(activity, user, id)?,
            None => None,
        };
        if active.is_none() && self.responses.has_saved_response(questionnaire.id(), user)? {
            if let Some(saved) = self
                .responses
                .latest_saved_response_id(questionnaire.id(), user)?
            {
                active = self.own_response(activity, user, saved)?;
                debug!(rid = %saved, "attached saved response");
            }
        }
        let response_id = active.as_ref().map(Response::id);

        let page = resolve_page(
            self.navigation.as_ref(),
            questionnaire,
            &request.action,
            request.page,
            active.as_ref(),
        );
        let assembled = assemble_page(questionnaire, page, active.as_ref());
        let flags = page_flags(page, questionnaire.page_count());
        debug!(from = %request.page, to = %page, shown = assembled.displays.len(), "resolved page");

        Ok(Outcome {
            template: TemplateId::Page,
            body: PageBody::Page(PageView {
                page,
                has_previous: flags.has_previous,
                has_next: flags.has_next,
                questions: assembled.displays,
                completed: false,
            }),
            side: SideData {
                responses: assembled.entries,
            },
            response_id,
            page,
        })
    }

    fn review(
        &self,
        request: &NavigationRequest,
        activity: &Activity,
        user: UserId,
        submission: ResponseId,
    ) -> Result<Outcome, PageError> {
        let Some(response) = self
            .own_response(activity, user, submission)?
            .filter(Response::is_submitted)
        else {
            return Ok(Outcome::blank(request));
        };

        let assembled = assemble_review(&activity.questionnaire, &response);
        Ok(Outcome {
            template: TemplateId::Page,
            body: PageBody::Page(PageView {
                page: request.page,
                has_previous: false,
                has_next: false,
                questions: assembled.displays,
                completed: true,
            }),
            side: SideData {
                responses: assembled.entries,
            },
            response_id: None,
            page: request.page,
        })
    }

    /// Load a response the caller owns in this questionnaire.
    ///
    /// Unknown ids and responses belonging to someone else resolve to `None`.
    fn own_response(
        &self,
        activity: &Activity,
        user: UserId,
        id: ResponseId,
    ) -> Result<Option<Response>, PageError> {
        match self.responses.load_response(id) {
            Ok(response)
                if response.user_id() == user
                    && response.questionnaire_id() == activity.questionnaire.id() =>
            {
                Ok(Some(response))
            }
            Ok(_) | Err(StorageError::NotFound) => {
                warn!(rid = %id, user = %user, "ignoring response outside caller's questionnaire");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }
}
