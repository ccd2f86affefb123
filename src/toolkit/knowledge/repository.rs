

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use super::models::{DiseaseProfile, FollowUpQuestion, KnowledgeSnapshot};
use crate::core::error::{MediqueryError, Result};


const BUILTIN_KNOWLEDGE: &str = include_str!("../../../data/knowledge.json");


/// Read-only source of disease profiles and follow-up templates.
#[async_trait]
pub trait KnowledgeRepository: Send + Sync {

    async fn disease_profiles(&self) -> Result<Vec<DiseaseProfile>>;

    /// Empty when the disease has no follow-up template.
    async fn followup_questions(&self, disease_name: &str) -> Result<Vec<FollowUpQuestion>>;
}


#[async_trait]
impl KnowledgeRepository for Arc<dyn KnowledgeRepository> {
    async fn disease_profiles(&self) -> Result<Vec<DiseaseProfile>> {
        (**self).disease_profiles().await
    }

    async fn followup_questions(&self, disease_name: &str) -> Result<Vec<FollowUpQuestion>> {
        (**self).followup_questions(disease_name).await
    }
}


#[derive(Debug, Clone, Default)]
pub struct InMemoryKnowledgeStore {
    profiles: Vec<DiseaseProfile>,
    followups: HashMap<String, Vec<FollowUpQuestion>>,
}

impl InMemoryKnowledgeStore {

    /// Rejects snapshots whose weights could produce a non-positive score ceiling.
    pub fn new(snapshot: KnowledgeSnapshot) -> Result<Self> {
        validate_snapshot(&snapshot)?;

        let followups = snapshot
            .follow_ups
            .into_iter()
            .map(|t| (t.disease, t.follow_up_questions))
            .collect();

        Ok(Self {
            profiles: snapshot.diseases,
            followups,
        })
    }


    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: KnowledgeSnapshot = serde_json::from_str(json)?;
        Self::new(snapshot)
    }

    /// The ten-disease sample knowledge bundled with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_KNOWLEDGE)
    }


    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            MediqueryError::KnowledgeStore(format!("cannot read {}: {}", path.display(), e))
        })?;
        let store = Self::from_json(&raw)?;
        info!(
            "Loaded {} disease profiles ({} with follow-ups) from {}",
            store.profiles.len(),
            store.followups.len(),
            path.display()
        );
        Ok(store)
    }


    pub fn len(&self) -> usize {
        self.profiles.len()
    }


    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

fn validate_snapshot(snapshot: &KnowledgeSnapshot) -> Result<()> {
    for profile in &snapshot.diseases {
        if let Some(symptom) = profile
            .symptoms
            .iter()
            .find(|s| !(s.weight.is_finite() && s.weight > 0.0 && s.weight <= 1.0))
        {
            return Err(MediqueryError::KnowledgeStore(format!(
                "symptom '{}' of '{}' has weight {} outside (0, 1]",
                symptom.name, profile.name, symptom.weight
            )));
        }
    }

    for template in &snapshot.follow_ups {
        if let Some(question) = template
            .follow_up_questions
            .iter()
            .find(|q| !(q.weight.is_finite() && q.weight > 0.0))
        {
            return Err(MediqueryError::KnowledgeStore(format!(
                "follow-up '{}' for '{}' has non-positive weight {}",
                question.question_text, template.disease, question.weight
            )));
        }
    }

    Ok(())
}

#[async_trait]
impl KnowledgeRepository for InMemoryKnowledgeStore {
    async fn disease_profiles(&self) -> Result<Vec<DiseaseProfile>> {
        Ok(self.profiles.clone())
    }

    async fn followup_questions(&self, disease_name: &str) -> Result<Vec<FollowUpQuestion>> {
        match self.followups.get(disease_name) {
            Some(questions) => Ok(questions.clone()),
            None => {
                debug!("No follow-up template for '{}'", disease_name);
                Ok(Vec::new())
            }
        }
    }
}
