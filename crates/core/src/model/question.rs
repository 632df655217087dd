use serde::{Deserialize, Serialize};

use crate::model::response::{Answer, NO_CHOICE, Response, YES_CHOICE};
use crate::model::{ChoiceId, QuestionId};

/// Question types, each with the stable numeric type id used in response-data keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    YesNo,
    Text,
    Essay,
    Radio,
    Checkbox,
    Dropdown,
    Rate,
    Date,
    Numeric,
    Slider,
    SectionText,
}

impl QuestionKind {
    #[must_use]
    pub fn type_id(self) -> u32 {
        match self {
            QuestionKind::YesNo => 1,
            QuestionKind::Text => 2,
            QuestionKind::Essay => 3,
            QuestionKind::Radio => 4,
            QuestionKind::Checkbox => 5,
            QuestionKind::Dropdown => 6,
            QuestionKind::Rate => 8,
            QuestionKind::Date => 9,
            QuestionKind::Numeric => 10,
            QuestionKind::Slider => 11,
            QuestionKind::SectionText => 100,
        }
    }

    /// Whether the mobile app can render this kind of question.
    #[must_use]
    pub fn supports_mobile(self) -> bool {
        !matches!(self, QuestionKind::Slider | QuestionKind::SectionText)
    }
}

/// A selectable option of a choice-based question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub id: ChoiceId,
    pub label: String,
}

/// A question is only shown when `question` was answered with `choice`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub question: QuestionId,
    pub choice: ChoiceId,
}

/// One key/value pair of mobile response data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEntry {
    pub key: String,
    pub value: String,
}

impl ResponseEntry {
    fn new(key: String, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

/// Choice as presented to the mobile app, with the active response applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceDisplay {
    pub id: ChoiceId,
    pub label: String,
    pub selected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
}

/// Rendered-question descriptor handed to the mobile template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionDisplay {
    pub id: QuestionId,
    /// Sequence number, present only when auto-numbering is on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qnum: Option<u32>,
    pub name: String,
    pub content: String,
    pub kind: QuestionKind,
    pub type_id: u32,
    pub required: bool,
    pub choices: Vec<ChoiceDisplay>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    name: String,
    content: String,
    kind: QuestionKind,
    required: bool,
    choices: Vec<Choice>,
    dependencies: Vec<Dependency>,
}

impl Question {
    #[must_use]
    pub fn new(
        id: QuestionId,
        kind: QuestionKind,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            content: content.into(),
            kind,
            required: false,
            choices: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    #[must_use]
    pub fn with_choice(mut self, id: ChoiceId, label: impl Into<String>) -> Self {
        self.choices.push(Choice {
            id,
            label: label.into(),
        });
        self
    }

    #[must_use]
    pub fn depends_on(mut self, question: QuestionId, choice: ChoiceId) -> Self {
        self.dependencies.push(Dependency { question, choice });
        self
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        self.kind
    }

    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    #[must_use]
    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    #[must_use]
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    #[must_use]
    pub fn supports_mobile(&self) -> bool {
        self.kind.supports_mobile()
    }

    /// Whether the question should be shown for the given response.
    ///
    /// Questions without dependencies are always eligible. Dependent questions
    /// need every parent answer to select the required choice, so they are
    /// never eligible without a response.
    #[must_use]
    pub fn is_eligible(&self, response: Option<&Response>) -> bool {
        if self.dependencies.is_empty() {
            return true;
        }
        let Some(response) = response else {
            return false;
        };
        self.dependencies.iter().all(|dep| {
            response
                .answer(dep.question)
                .is_some_and(|answer| answer.selects(dep.choice))
        })
    }

    /// Build the mobile display descriptor for this question.
    #[must_use]
    pub fn mobile_display(
        &self,
        seq: u32,
        autonumber: bool,
        response: Option<&Response>,
    ) -> QuestionDisplay {
        let answer = response.and_then(|r| r.answer(self.id));
        let choices = self.display_choices(answer);
        let value = match answer {
            Some(Answer::Text(text)) => Some(text.clone()),
            Some(Answer::Date(date)) => Some(date.format("%Y-%m-%d").to_string()),
            Some(Answer::YesNo(yes)) => Some(yes_no_value(*yes).to_owned()),
            _ => None,
        };

        QuestionDisplay {
            id: self.id,
            qnum: autonumber.then_some(seq),
            name: self.name.clone(),
            content: self.content.clone(),
            kind: self.kind,
            type_id: self.kind.type_id(),
            required: self.required,
            choices,
            value,
        }
    }

    fn display_choices(&self, answer: Option<&Answer>) -> Vec<ChoiceDisplay> {
        if self.kind == QuestionKind::YesNo {
            return [(YES_CHOICE, "yes"), (NO_CHOICE, "no")]
                .into_iter()
                .map(|(id, label)| ChoiceDisplay {
                    id,
                    label: label.to_owned(),
                    selected: answer.is_some_and(|a| a.selects(id)),
                    rank: None,
                })
                .collect();
        }

        self.choices
            .iter()
            .map(|choice| {
                let rank = match answer {
                    Some(Answer::Ranks(ranks)) => ranks.get(&choice.id).copied(),
                    _ => None,
                };
                ChoiceDisplay {
                    id: choice.id,
                    label: choice.label.clone(),
                    selected: answer.is_some_and(|a| a.selects(choice.id)),
                    rank,
                }
            })
            .collect()
    }

    /// Flatten the response's answer to this question into mobile entries.
    ///
    /// Returns nothing when the question is unanswered or the stored answer
    /// does not fit the question kind.
    #[must_use]
    pub fn mobile_response_entries(&self, response: &Response) -> Vec<ResponseEntry> {
        let Some(answer) = response.answer(self.id) else {
            return Vec::new();
        };
        let type_id = self.kind.type_id();
        let key = format!("response_{type_id}_{}", self.id);

        match (self.kind, answer) {
            (QuestionKind::YesNo, Answer::YesNo(yes)) => {
                vec![ResponseEntry::new(key, yes_no_value(*yes))]
            }
            (
                QuestionKind::Text | QuestionKind::Essay | QuestionKind::Numeric,
                Answer::Text(text),
            ) => vec![ResponseEntry::new(key, text.as_str())],
            (QuestionKind::Date, Answer::Date(date)) => {
                vec![ResponseEntry::new(key, date.format("%Y-%m-%d").to_string())]
            }
            (QuestionKind::Radio | QuestionKind::Dropdown, Answer::Choices(ids)) => ids
                .first()
                .map(|id| vec![ResponseEntry::new(key, id.to_string())])
                .unwrap_or_default(),
            (QuestionKind::Checkbox, Answer::Choices(ids)) => self
                .choices
                .iter()
                .filter(|choice| ids.contains(&choice.id))
                .map(|choice| ResponseEntry::new(format!("{key}_{}", choice.id), "1"))
                .collect(),
            (QuestionKind::Rate, Answer::Ranks(ranks)) => self
                .choices
                .iter()
                .filter_map(|choice| {
                    ranks
                        .get(&choice.id)
                        .map(|rank| ResponseEntry::new(format!("{key}_{}", choice.id), rank.to_string()))
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

fn yes_no_value(yes: bool) -> &'static str {
    if yes { "y" } else { "n" }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::NaiveDate;

    use super::*;
    use crate::model::{QuestionnaireId, ResponseId, UserId};

    fn response() -> Response {
        Response::in_progress(ResponseId::new(1), QuestionnaireId::new(1), UserId::new(1))
    }

    fn colours() -> Question {
        Question::new(QuestionId::new(12), QuestionKind::Checkbox, "colours", "Pick colours")
            .with_choice(ChoiceId::new(1), "red")
            .with_choice(ChoiceId::new(2), "green")
            .with_choice(ChoiceId::new(3), "blue")
    }

    #[test]
    fn slider_and_section_text_are_not_mobile() {
        assert!(!QuestionKind::Slider.supports_mobile());
        assert!(!QuestionKind::SectionText.supports_mobile());
        assert!(QuestionKind::Essay.supports_mobile());
    }

    #[test]
    fn display_numbers_only_when_autonumbering() {
        let q = Question::new(QuestionId::new(1), QuestionKind::Text, "name", "Your name?");
        assert_eq!(q.mobile_display(4, true, None).qnum, Some(4));
        assert_eq!(q.mobile_display(4, false, None).qnum, None);
    }

    #[test]
    fn display_applies_selected_choices() {
        let r = response().with_answer(
            QuestionId::new(12),
            Answer::Choices(vec![ChoiceId::new(3), ChoiceId::new(1)]),
        );
        let display = colours().mobile_display(1, false, Some(&r));
        let selected: Vec<bool> = display.choices.iter().map(|c| c.selected).collect();
        assert_eq!(selected, vec![true, false, true]);
        assert_eq!(display.type_id, 5);
    }

    #[test]
    fn checkbox_entries_follow_choice_order() {
        let r = response().with_answer(
            QuestionId::new(12),
            Answer::Choices(vec![ChoiceId::new(3), ChoiceId::new(1)]),
        );
        let entries = colours().mobile_response_entries(&r);
        let keys: Vec<&str> = entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["response_5_12_1", "response_5_12_3"]);
        assert!(entries.iter().all(|e| e.value == "1"));
    }

    #[test]
    fn rate_entries_carry_ranks() {
        let q = Question::new(QuestionId::new(8), QuestionKind::Rate, "rate", "Rate these")
            .with_choice(ChoiceId::new(1), "speed")
            .with_choice(ChoiceId::new(2), "price");
        let mut ranks = BTreeMap::new();
        ranks.insert(ChoiceId::new(2), 4);
        let r = response().with_answer(QuestionId::new(8), Answer::Ranks(ranks));

        let entries = q.mobile_response_entries(&r);
        assert_eq!(
            entries,
            vec![ResponseEntry {
                key: "response_8_8_2".into(),
                value: "4".into()
            }]
        );
    }

    #[test]
    fn single_valued_entries_use_question_key() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let q = Question::new(QuestionId::new(5), QuestionKind::Date, "when", "When?");
        let r = response().with_answer(QuestionId::new(5), Answer::Date(date));
        let entries = q.mobile_response_entries(&r);
        assert_eq!(entries[0].key, "response_9_5");
        assert_eq!(entries[0].value, "2024-02-29");
    }

    #[test]
    fn mismatched_or_missing_answers_produce_no_entries() {
        let q = Question::new(QuestionId::new(5), QuestionKind::Numeric, "n", "How many?");
        assert!(q.mobile_response_entries(&response()).is_empty());

        let r = response().with_answer(QuestionId::new(5), Answer::YesNo(true));
        assert!(q.mobile_response_entries(&r).is_empty());
    }

    #[test]
    fn dependent_question_needs_matching_parent_answer() {
        let child = Question::new(QuestionId::new(2), QuestionKind::Text, "why", "Why?")
            .depends_on(QuestionId::new(1), YES_CHOICE);

        assert!(!child.is_eligible(None));
        assert!(!child.is_eligible(Some(&response())));

        let no = response().with_answer(QuestionId::new(1), Answer::YesNo(false));
        assert!(!child.is_eligible(Some(&no)));

        let yes = response().with_answer(QuestionId::new(1), Answer::YesNo(true));
        assert!(child.is_eligible(Some(&yes)));
    }
}
