use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use strum::IntoStaticStr;

use crate::toolkit::knowledge::models::{FollowUpAnswerSet, FollowUpQuestion};


/// First pass surfaces clarifying questions; refinement consumes answers and stops asking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FollowUpPass {
    Initial,
    Refinement,
}

impl FollowUpPass {
    /// An empty answer set counts as no answers at all.
    pub fn from_answers(answers: Option<&FollowUpAnswerSet>) -> Self {
        match answers {
            Some(answers) if !answers.is_empty() => Self::Refinement,
            _ => Self::Initial,
        }
    }

    pub fn attaches_questions(self) -> bool {
        matches!(self, Self::Initial)
    }
}


pub fn questions_to_attach(pass: FollowUpPass, questions: Vec<FollowUpQuestion>) -> Vec<FollowUpQuestion> {
    if pass.attaches_questions() {
        questions
    } else {
        Vec::new()
    }
}

/// Answer keys that match no question consulted during scoring.
pub fn unrecognized_answer_keys<'a>(
    answers: &'a FollowUpAnswerSet,
    consulted: &[&FollowUpQuestion],
) -> Vec<&'a str> {
    let known: HashSet<&str> = consulted.iter().map(|q| q.question_text.as_str()).collect();
    answers
        .keys()
        .map(String::as_str)
        .filter(|key| !known.contains(key))
        .collect()
}


/// One question the caller still has to answer, with every disease that asks it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingQuestion {
    pub question: FollowUpQuestion,
    pub diseases: Vec<String>,
}

/// Flattens the questions attached to first-pass results into the answer sheet
/// a refinement call expects, deduplicated by question text in result order.
pub fn answer_sheet<'a, I>(results: I) -> Vec<PendingQuestion>
where
    I: IntoIterator<Item = (&'a str, &'a [FollowUpQuestion])>,
{
    let mut sheet: Vec<PendingQuestion> = Vec::new();

    for (disease, questions) in results {
        for question in questions {
            match sheet
                .iter_mut()
                .find(|p| p.question.question_text == question.question_text)
            {
                Some(pending) => {
                    if !pending.diseases.iter().any(|d| d == disease) {
                        pending.diseases.push(disease.to_string());
                    }
                }
                None => sheet.push(PendingQuestion {
                    question: question.clone(),
                    diseases: vec![disease.to_string()],
                }),
            }
        }
    }

    sheet
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_from_answers() {
        assert_eq!(FollowUpPass::from_answers(None), FollowUpPass::Initial);
        assert_eq!(
            FollowUpPass::from_answers(Some(&FollowUpAnswerSet::new())),
            FollowUpPass::Initial
        );

        let mut answers = FollowUpAnswerSet::new();
        answers.insert("Q?".into(), "yes".into());
        assert_eq!(FollowUpPass::from_answers(Some(&answers)), FollowUpPass::Refinement);
    }

    #[test]
    fn test_questions_to_attach() {
        let questions = vec![
            FollowUpQuestion::yes_no("A?", "a", 0.1),
            FollowUpQuestion::yes_no("B?", "b", 0.2),
        ];
        let attached = questions_to_attach(FollowUpPass::Initial, questions.clone());
        assert_eq!(attached, questions);
        assert!(questions_to_attach(FollowUpPass::Refinement, questions).is_empty());
    }

    #[test]
    fn test_unrecognized_answer_keys() {
        let asked = FollowUpQuestion::yes_no("Known?", "k", 0.1);
        let mut answers = FollowUpAnswerSet::new();
        answers.insert("Known?".into(), "yes".into());
        answers.insert("Stray?".into(), "no".into());

        assert_eq!(unrecognized_answer_keys(&answers, &[&asked]), vec!["Stray?"]);
    }

    #[test]
    fn test_answer_sheet_dedupes_shared_questions() {
        let shared = FollowUpQuestion::yes_no("Do you have shortness of breath?", "dyspnea", 0.5);
        let cough = FollowUpQuestion::yes_no("Do you cough phlegm?", "productive_cough", 0.5);

        let pneumonia = vec![cough.clone(), shared.clone()];
        let hypertension = vec![shared.clone()];

        let sheet = answer_sheet([
            ("Pneumonia", pneumonia.as_slice()),
            ("Hypertension", hypertension.as_slice()),
        ]);

        assert_eq!(sheet.len(), 2);
        assert_eq!(sheet[0].question, cough);
        assert_eq!(sheet[1].diseases, vec!["Pneumonia", "Hypertension"]);
    }
}
