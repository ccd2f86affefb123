use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{EnumString, IntoStaticStr};


#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumString, IntoStaticStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

fn default_symptom_weight() -> f64 {
    0.5
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomWeight {
    pub name: String,
    #[serde(default = "default_symptom_weight")]
    pub weight: f64,
    #[serde(default)]
    pub severity: Severity,
}

impl SymptomWeight {
    pub fn new(name: impl Into<String>, weight: f64, severity: Severity) -> Self {
        Self {
            name: name.into(),
            weight,
            severity,
        }
    }
}


/// Reference data for one disease. `name` is the case-sensitive join key
/// shared with follow-up templates and provider expertise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseProfile {
    pub id: String,
    pub name: String,
    pub symptoms: Vec<SymptomWeight>,
    pub specialist: String,
    #[serde(default)]
    pub urgent_care_eligible: bool,
    #[serde(default)]
    pub severity_levels: Vec<String>,
    #[serde(default)]
    pub treatment_protocols: Vec<String>,
}

impl DiseaseProfile {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        symptoms: Vec<SymptomWeight>,
        specialist: impl Into<String>,
        urgent_care_eligible: bool,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            symptoms,
            specialist: specialist.into(),
            urgent_care_eligible,
            severity_levels: Vec::new(),
            treatment_protocols: Vec::new(),
        }
    }


    pub fn total_weight(&self) -> f64 {
        self.symptoms.iter().map(|s| s.weight).sum()
    }
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    YesNo,
    MultipleChoice {
        #[serde(default)]
        options: Vec<String>,
    },
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowUpQuestion {
    #[serde(alias = "question")]
    pub question_text: String,
    /// Free-form label; need not match any symptom name of the profile.
    pub symptom_mapped: String,
    pub weight: f64,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

impl FollowUpQuestion {
    pub fn yes_no(
        question_text: impl Into<String>,
        symptom_mapped: impl Into<String>,
        weight: f64,
    ) -> Self {
        Self {
            question_text: question_text.into(),
            symptom_mapped: symptom_mapped.into(),
            weight,
            kind: QuestionKind::YesNo,
        }
    }

    pub fn multiple_choice(
        question_text: impl Into<String>,
        symptom_mapped: impl Into<String>,
        weight: f64,
        options: Vec<String>,
    ) -> Self {
        Self {
            question_text: question_text.into(),
            symptom_mapped: symptom_mapped.into(),
            weight,
            kind: QuestionKind::MultipleChoice { options },
        }
    }
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowUpTemplate {
    pub disease: String,
    #[serde(default)]
    pub specialist: Option<String>,
    #[serde(default)]
    pub severity_threshold: Option<f64>,
    pub follow_up_questions: Vec<FollowUpQuestion>,
}


/// Answers keyed by the exact `question_text` they respond to.
pub type FollowUpAnswerSet = BTreeMap<String, String>;


#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeSnapshot {
    pub diseases: Vec<DiseaseProfile>,
    #[serde(default)]
    pub follow_ups: Vec<FollowUpTemplate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_symptom_weight_defaults() {
        let symptom: SymptomWeight = serde_json::from_value(json!({"name": "fever"})).unwrap();
        assert_eq!(symptom.weight, 0.5);
        assert_eq!(symptom.severity, Severity::Medium);
    }

    #[test]
    fn test_question_kind_tagging() {
        let question: FollowUpQuestion = serde_json::from_value(json!({
            "question_text": "How long does the headache typically last?",
            "symptom_mapped": "duration",
            "weight": 0.2,
            "type": "multiple_choice",
            "options": ["Less than 4 hours", "4-72 hours"]
        }))
        .unwrap();

        match &question.kind {
            QuestionKind::MultipleChoice { options } => assert_eq!(options.len(), 2),
            other => panic!("unexpected kind: {:?}", other),
        }

        let value = serde_json::to_value(FollowUpQuestion::yes_no("Q?", "aura", 0.5)).unwrap();
        assert_eq!(value["type"], "yes_no");
        assert!(value.get("options").is_none());
    }

    #[test]
    fn test_question_key_alias() {
        let question: FollowUpQuestion = serde_json::from_value(json!({
            "question": "Do you have a sore throat?",
            "symptom_mapped": "sore_throat",
            "weight": 0.3,
            "type": "yes_no"
        }))
        .unwrap();

        assert_eq!(question.question_text, "Do you have a sore throat?");
        assert_eq!(question.kind, QuestionKind::YesNo);
    }

    #[test]
    fn test_total_weight() {
        let profile = DiseaseProfile::new(
            "flu_001",
            "Flu",
            vec![
                SymptomWeight::new("fever", 1.0, Severity::High),
                SymptomWeight::new("cough", 0.5, Severity::Low),
            ],
            "General Physician",
            false,
        );
        assert!((profile.total_weight() - 1.5).abs() < 1e-9);
    }
}
