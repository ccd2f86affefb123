use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::toolkit::knowledge::models::FollowUpAnswerSet;
use crate::toolkit::matching::models::MatchResult;


#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AuditAction {
    SymptomSearch,
    RefinedSymptomSearch,
}


#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: Uuid,
    pub action: AuditAction,
    pub timestamp: DateTime<Utc>,
    pub input: String,
    pub follow_up_answers: Option<FollowUpAnswerSet>,
    pub results: Vec<MatchResult>,
    pub emergency_detected: bool,
}

impl AuditRecord {
    pub fn new(
        input: impl Into<String>,
        follow_up_answers: Option<FollowUpAnswerSet>,
        results: Vec<MatchResult>,
        emergency_detected: bool,
    ) -> Self {
        let action = if follow_up_answers.is_some() {
            AuditAction::RefinedSymptomSearch
        } else {
            AuditAction::SymptomSearch
        };

        Self {
            id: Uuid::new_v4(),
            action,
            timestamp: Utc::now(),
            input: input.into(),
            follow_up_answers,
            results,
            emergency_detected,
        }
    }
}
