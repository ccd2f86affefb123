use std::collections::HashSet;

use super::models::{DiseaseScore, ScoreBreakdown};
use crate::toolkit::knowledge::models::{
    DiseaseProfile, FollowUpAnswerSet, FollowUpQuestion, QuestionKind,
};


/// What a single answer contributes to a disease score.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerContribution {
    Confirmed { label: String, weight: f64 },
    None,
}

pub fn evaluate_answer(question: &FollowUpQuestion, answer: Option<&str>) -> AnswerContribution {
    let Some(answer) = answer else {
        return AnswerContribution::None;
    };

    match &question.kind {
        QuestionKind::YesNo if answer.to_lowercase() == "yes" => AnswerContribution::Confirmed {
            label: question.symptom_mapped.clone(),
            weight: question.weight,
        },
        QuestionKind::MultipleChoice { .. } if !answer.is_empty() => {
            AnswerContribution::Confirmed {
                label: format!("{}:{}", question.symptom_mapped, answer),
                weight: question.weight,
            }
        }
        _ => AnswerContribution::None,
    }
}


pub fn confidence(total_score: f64, max_possible: f64) -> f64 {
    if max_possible > 0.0 {
        (total_score / max_possible).min(1.0)
    } else {
        0.0
    }
}

/// Weighted match of one profile against the input tokens, merged with any
/// follow-up answers. `max_possible` only grows for confirmed follow-ups.
pub fn score_profile(
    tokens: &HashSet<String>,
    profile: &DiseaseProfile,
    answers: Option<&FollowUpAnswerSet>,
    questions: &[FollowUpQuestion],
) -> DiseaseScore {
    let mut initial_score = 0.0;
    let mut max_possible = 0.0;
    let mut matched_symptoms = Vec::new();

    for symptom in &profile.symptoms {
        max_possible += symptom.weight;

        if tokens.contains(&symptom.name) {
            initial_score += symptom.weight;
            matched_symptoms.push(symptom.name.clone());
        }
    }

    let mut followup_score = 0.0;
    let mut followup_matched = Vec::new();

    if let Some(answers) = answers {
        for question in questions {
            let answer = answers.get(&question.question_text).map(String::as_str);

            if let AnswerContribution::Confirmed { label, weight } = evaluate_answer(question, answer) {
                followup_score += weight;
                max_possible += weight;
                followup_matched.push(label);
            }
        }
    }

    let total_score = initial_score + followup_score;

    DiseaseScore {
        disease: profile.name.clone(),
        matched_symptoms,
        followup_matched,
        breakdown: ScoreBreakdown {
            initial_score,
            followup_score,
            total_score,
            max_possible,
        },
        confidence: confidence(total_score, max_possible),
    }
}
