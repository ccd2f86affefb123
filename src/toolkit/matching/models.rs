use serde::{Deserialize, Serialize};

use crate::toolkit::knowledge::models::FollowUpQuestion;


#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub initial_score: f64,
    pub followup_score: f64,
    pub total_score: f64,
    pub max_possible: f64,
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseScore {
    pub disease: String,
    /// Profile symptoms found in the input, in profile order.
    pub matched_symptoms: Vec<String>,
    /// Confirmed follow-ups, `label` for yes/no and `label:answer` for choices.
    pub followup_matched: Vec<String>,
    pub breakdown: ScoreBreakdown,
    pub confidence: f64,
}

impl DiseaseScore {

    /// A positive score against a positive ceiling; degenerate profiles never match.
    pub fn is_match(&self) -> bool {
        self.breakdown.total_score > 0.0 && self.breakdown.max_possible > 0.0
    }


    pub fn all_matched(&self) -> Vec<String> {
        self.matched_symptoms
            .iter()
            .chain(self.followup_matched.iter())
            .cloned()
            .collect()
    }
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub disease: String,
    pub confidence: f64,
    pub matched_symptoms: Vec<String>,
    pub specialist: String,
    pub requires_urgent_care: bool,
    pub follow_up_questions: Vec<FollowUpQuestion>,
    pub score_breakdown: ScoreBreakdown,
}
