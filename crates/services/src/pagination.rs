//! Page resolution and per-page question assembly.

use questionnaire_core::NavigationPolicy;
use questionnaire_core::model::{
    Action, PageNumber, QuestionDisplay, Questionnaire, Response, ResponseEntry,
};

/// Previous/next availability for a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageFlags {
    pub has_previous: bool,
    pub has_next: bool,
}

/// Flags for page `page` of `total`; single-page questionnaires never navigate.
#[must_use]
pub fn page_flags(page: PageNumber, total: u32) -> PageFlags {
    let multi = total > 1;
    PageFlags {
        has_previous: multi && page.get() > 1,
        has_next: multi && page.get() < total,
    }
}

/// Resolve the page to display for a paging action.
///
/// Boundary signals from the policy clamp to the last page (next) or the
/// first page (previous). Other actions keep the requested page.
#[must_use]
pub fn resolve_page(
    policy: &dyn NavigationPolicy,
    questionnaire: &Questionnaire,
    action: &Action,
    page: PageNumber,
    response: Option<&Response>,
) -> PageNumber {
    match action {
        Action::NextPage => policy
            .next_page(questionnaire, page, response)
            .unwrap_or_else(|| PageNumber::new(questionnaire.page_count())),
        Action::PreviousPage => policy
            .prev_page(questionnaire, page, response)
            .unwrap_or(PageNumber::FIRST),
        _ => page,
    }
}

/// Question displays and side-channel entries for one rendered set of questions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssembledQuestions {
    pub displays: Vec<QuestionDisplay>,
    pub entries: Vec<ResponseEntry>,
}

/// Assemble the mobile questions on `page`.
///
/// The sequence counter advances for every question on the page, including
/// ones the mobile app cannot render, so numbering matches the full page.
#[must_use]
pub fn assemble_page(
    questionnaire: &Questionnaire,
    page: PageNumber,
    response: Option<&Response>,
) -> AssembledQuestions {
    let mut out = AssembledQuestions::default();
    for (seq, question) in (1_u32..).zip(questionnaire.page_questions(page)) {
        if !question.supports_mobile() {
            continue;
        }
        out.displays
            .push(question.mobile_display(seq, questionnaire.autonumber(), response));
        if let Some(response) = response.filter(|r| r.is_answered(question.id())) {
            out.entries.extend(question.mobile_response_entries(response));
        }
    }
    out
}

/// Assemble every mobile question of the questionnaire for reviewing a submission.
///
/// Only displayed questions consume a sequence number here.
#[must_use]
pub fn assemble_review(questionnaire: &Questionnaire, response: &Response) -> AssembledQuestions {
    let mut out = AssembledQuestions::default();
    let mobile = questionnaire.questions().iter().filter(|q| q.supports_mobile());
    for (seq, question) in (1_u32..).zip(mobile) {
        out.displays
            .push(question.mobile_display(seq, questionnaire.autonumber(), Some(response)));
        out.entries.extend(question.mobile_response_entries(response));
    }
    out
}
