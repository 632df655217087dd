//! Page-to-page navigation rules.
//!
//! A policy resolves the page reached by "next" or "previous" from a given
//! page. `None` is the boundary signal: there is no such page, and callers
//! clamp locally.

use crate::model::{PageNumber, Questionnaire, Response};

pub trait NavigationPolicy: Send + Sync {
    /// Page reached by moving forward from `page`, or `None` past the last page.
    fn next_page(
        &self,
        questionnaire: &Questionnaire,
        page: PageNumber,
        response: Option<&Response>,
    ) -> Option<PageNumber>;

    /// Page reached by moving back from `page`, or `None` before the first page.
    fn prev_page(
        &self,
        questionnaire: &Questionnaire,
        page: PageNumber,
        response: Option<&Response>,
    ) -> Option<PageNumber>;
}

/// Moves one page at a time, ignoring question dependencies.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialNavigation;

impl NavigationPolicy for SequentialNavigation {
    fn next_page(
        &self,
        questionnaire: &Questionnaire,
        page: PageNumber,
        _response: Option<&Response>,
    ) -> Option<PageNumber> {
        let next = page.get().checked_add(1)?;
        (next <= questionnaire.page_count()).then(|| PageNumber::new(next))
    }

    fn prev_page(
        &self,
        questionnaire: &Questionnaire,
        page: PageNumber,
        _response: Option<&Response>,
    ) -> Option<PageNumber> {
        let last = questionnaire.page_count();
        if page.get() <= 1 || last == 0 {
            return None;
        }
        Some(PageNumber::new((page.get() - 1).min(last)))
    }
}

/// Skips pages on which no question is eligible for the active response.
///
/// Without any question dependencies this is identical to
/// [`SequentialNavigation`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionalNavigation;

impl NavigationPolicy for ConditionalNavigation {
    fn next_page(
        &self,
        questionnaire: &Questionnaire,
        page: PageNumber,
        response: Option<&Response>,
    ) -> Option<PageNumber> {
        if !questionnaire.has_dependencies() {
            return SequentialNavigation.next_page(questionnaire, page, response);
        }
        let start = page.get().checked_add(1)?;
        (start..=questionnaire.page_count())
            .map(PageNumber::new)
            .find(|candidate| questionnaire.page_has_eligible_questions(*candidate, response))
    }

    fn prev_page(
        &self,
        questionnaire: &Questionnaire,
        page: PageNumber,
        response: Option<&Response>,
    ) -> Option<PageNumber> {
        if !questionnaire.has_dependencies() {
            return SequentialNavigation.prev_page(questionnaire, page, response);
        }
        let end = (page.get().saturating_sub(1)).min(questionnaire.page_count());
        (1..=end)
            .rev()
            .map(PageNumber::new)
            .find(|candidate| questionnaire.page_has_eligible_questions(*candidate, response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Answer, Question, QuestionId, QuestionKind, QuestionnaireId, ResponseId, UserId,
        YES_CHOICE,
    };

    fn text(id: u64) -> Question {
        Question::new(QuestionId::new(id), QuestionKind::Text, format!("q{id}"), "?")
    }

    fn pages(count: u64) -> Questionnaire {
        let questions = (1..=count).map(text).collect();
        let layout = (1..=count).map(|id| vec![QuestionId::new(id)]).collect();
        Questionnaire::new(QuestionnaireId::new(1), "S", questions, layout).unwrap()
    }

    /// Page 2 only shows when question 1 was answered "yes".
    fn branching() -> Questionnaire {
        let gate = Question::new(QuestionId::new(1), QuestionKind::YesNo, "gate", "Continue?");
        let hidden = text(2).depends_on(QuestionId::new(1), YES_CHOICE);
        Questionnaire::new(
            QuestionnaireId::new(1),
            "S",
            vec![gate, hidden, text(3)],
            vec![
                vec![QuestionId::new(1)],
                vec![QuestionId::new(2)],
                vec![QuestionId::new(3)],
            ],
        )
        .unwrap()
    }

    fn answered(yes: bool) -> Response {
        Response::in_progress(ResponseId::new(1), QuestionnaireId::new(1), UserId::new(1))
            .with_answer(QuestionId::new(1), Answer::YesNo(yes))
    }

    #[test]
    fn sequential_signals_boundaries() {
        let survey = pages(3);
        let nav = SequentialNavigation;
        assert_eq!(nav.next_page(&survey, PageNumber::new(2), None), Some(PageNumber::new(3)));
        assert_eq!(nav.next_page(&survey, PageNumber::new(3), None), None);
        assert_eq!(nav.prev_page(&survey, PageNumber::new(2), None), Some(PageNumber::FIRST));
        assert_eq!(nav.prev_page(&survey, PageNumber::FIRST, None), None);
    }

    #[test]
    fn sequential_prev_from_beyond_last_lands_on_last() {
        let survey = pages(3);
        assert_eq!(
            SequentialNavigation.prev_page(&survey, PageNumber::new(9), None),
            Some(PageNumber::new(3))
        );
    }

    #[test]
    fn conditional_skips_hidden_page() {
        let survey = branching();
        let no = answered(false);
        let nav = ConditionalNavigation;
        assert_eq!(nav.next_page(&survey, PageNumber::FIRST, Some(&no)), Some(PageNumber::new(3)));
        assert_eq!(nav.prev_page(&survey, PageNumber::new(3), Some(&no)), Some(PageNumber::FIRST));
    }

    #[test]
    fn conditional_shows_page_when_dependency_holds() {
        let survey = branching();
        let yes = answered(true);
        let nav = ConditionalNavigation;
        assert_eq!(nav.next_page(&survey, PageNumber::FIRST, Some(&yes)), Some(PageNumber::new(2)));
    }

    #[test]
    fn conditional_without_response_hides_dependent_pages() {
        let survey = branching();
        assert_eq!(
            ConditionalNavigation.next_page(&survey, PageNumber::FIRST, None),
            Some(PageNumber::new(3))
        );
    }

    #[test]
    fn conditional_boundary_when_only_hidden_pages_remain() {
        let gate = Question::new(QuestionId::new(1), QuestionKind::YesNo, "gate", "Continue?");
        let hidden = text(2).depends_on(QuestionId::new(1), YES_CHOICE);
        let survey = Questionnaire::new(
            QuestionnaireId::new(1),
            "S",
            vec![gate, hidden],
            vec![vec![QuestionId::new(1)], vec![QuestionId::new(2)]],
        )
        .unwrap();
        assert_eq!(
            ConditionalNavigation.next_page(&survey, PageNumber::FIRST, Some(&answered(false))),
            None
        );
    }
}
