

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::config::MediqueryConfig;
use super::error::{MediqueryError, Result};
use super::events::{Event, EventBus, EventKind};
use crate::toolkit::audit::{AuditRecord, AuditSink, JsonlAuditSink, TracingAuditSink, dispatch};
use crate::toolkit::knowledge::{
    CachedKnowledgeRepository, DiseaseProfile, FollowUpAnswerSet, FollowUpQuestion,
    InMemoryKnowledgeStore, KnowledgeRepository,
};
use crate::toolkit::matching::emergency::EmergencyDetector;
use crate::toolkit::matching::followup::{
    FollowUpPass, questions_to_attach, unrecognized_answer_keys,
};
use crate::toolkit::matching::models::{DiseaseScore, MatchResult};
use crate::toolkit::matching::ranking::rank_matches;
use crate::toolkit::matching::scorer::score_profile;
use crate::toolkit::matching::tokenizer::token_set;
use crate::toolkit::providers::{
    GeoPoint, InMemoryProviderStore, ProviderRecord, ProviderRepository, cap_slots,
    filter_by_distance, rank_providers,
};


pub const NO_MATCH_MESSAGE: &str = "No matching disease found";


#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub symptoms: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub max_distance_km: Option<f64>,
}

impl AnalyzeRequest {
    pub fn new(symptoms: impl Into<String>) -> Self {
        Self {
            symptoms: Some(symptoms.into()),
            ..Default::default()
        }
    }

    pub fn near(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }
}


#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefineRequest {
    pub original_symptoms: Option<String>,
    pub follow_up_answers: Option<FollowUpAnswerSet>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub max_distance_km: Option<f64>,
}

impl RefineRequest {
    pub fn new(original_symptoms: impl Into<String>, follow_up_answers: FollowUpAnswerSet) -> Self {
        Self {
            original_symptoms: Some(original_symptoms.into()),
            follow_up_answers: Some(follow_up_answers),
            ..Default::default()
        }
    }
}


/// A disease match together with its ranked care providers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedMatch {
    #[serde(flatten)]
    pub result: MatchResult,
    pub doctors: Vec<ProviderRecord>,
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalyzeResponse {
    Matches { matches: Vec<RankedMatch> },
    NoMatch { message: String },
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefineResponse {
    pub refined_matches: Vec<RankedMatch>,
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseAnalysis {
    pub pass: FollowUpPass,
    pub emergency_detected: bool,
    pub matches: Vec<MatchResult>,
}


/// Symptom matching and provider ranking over injected knowledge, provider and audit collaborators.
pub struct SymptomAnalyzer {
    config: MediqueryConfig,
    knowledge: Arc<dyn KnowledgeRepository>,
    providers: Arc<dyn ProviderRepository>,
    audit: Arc<dyn AuditSink>,
    events: Arc<EventBus>,
    emergency: EmergencyDetector,
}

impl SymptomAnalyzer {
    pub fn new(
        config: MediqueryConfig,
        knowledge: Arc<dyn KnowledgeRepository>,
        providers: Arc<dyn ProviderRepository>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        let emergency = EmergencyDetector::new(config.emergency_keywords.clone());
        Self {
            config,
            knowledge,
            providers,
            audit,
            events: Arc::new(EventBus::new()),
            emergency,
        }
    }

    /// Builds the collaborators named by the config: knowledge file or the
    /// bundled sample, provider file or an empty store, JSONL or tracing audit.
    pub async fn from_config(config: MediqueryConfig) -> Result<Self> {
        let base = match &config.knowledge_path {
            Some(path) => InMemoryKnowledgeStore::from_path(path).await?,
            None => InMemoryKnowledgeStore::builtin()?,
        };
        let knowledge: Arc<dyn KnowledgeRepository> = Arc::new(CachedKnowledgeRepository::new(
            base,
            config.knowledge_cache_size,
            config.knowledge_cache_ttl_secs,
        ));

        let providers: Arc<dyn ProviderRepository> = match &config.providers_path {
            Some(path) => Arc::new(InMemoryProviderStore::from_path(path).await?),
            None => {
                warn!("No provider store configured, provider lists will be empty");
                Arc::new(InMemoryProviderStore::default())
            }
        };

        let audit: Arc<dyn AuditSink> = match &config.audit_log_path {
            Some(path) => Arc::new(JsonlAuditSink::new(path)),
            None => Arc::new(TracingAuditSink),
        };

        Ok(Self::new(config, knowledge, providers, audit))
    }

    pub fn with_event_bus(mut self, events: Arc<EventBus>) -> Self {
        self.events = events;
        self
    }

    pub fn config(&self) -> &MediqueryConfig {
        &self.config
    }

    pub fn events(&self) -> Arc<EventBus> {
        Arc::clone(&self.events)
    }

    pub fn providers(&self) -> Arc<dyn ProviderRepository> {
        Arc::clone(&self.providers)
    }

    pub async fn disease_catalog(&self) -> Result<Vec<DiseaseProfile>> {
        self.knowledge.disease_profiles().await
    }

    /// First pass: top diseases with follow-up questions and nearby providers.
    pub async fn analyze(&self, request: AnalyzeRequest) -> Result<AnalyzeResponse> {
        let symptoms = request
            .symptoms
            .filter(|s| !s.is_empty())
            .ok_or_else(|| MediqueryError::validation("No symptoms provided"))?;
        let origin = self.resolve_origin(request.latitude, request.longitude)?;
        let max_distance_km = self.resolve_radius(request.max_distance_km)?;

        let analysis = self.match_diseases(&symptoms, None).await?;
        if analysis.matches.is_empty() {
            return Ok(AnalyzeResponse::NoMatch {
                message: NO_MATCH_MESSAGE.to_string(),
            });
        }

        let matches = self
            .attach_providers(analysis.matches, origin, max_distance_km)
            .await?;
        Ok(AnalyzeResponse::Matches { matches })
    }

    /// Second pass: rescored with follow-up answers, no further questions.
    pub async fn refine(&self, request: RefineRequest) -> Result<RefineResponse> {
        let (Some(symptoms), Some(answers)) = (
            request.original_symptoms.filter(|s| !s.is_empty()),
            request.follow_up_answers.filter(|a| !a.is_empty()),
        ) else {
            return Err(MediqueryError::validation("Missing symptoms or answers"));
        };
        let origin = self.resolve_origin(request.latitude, request.longitude)?;
        let max_distance_km = self.resolve_radius(request.max_distance_km)?;

        let analysis = self.match_diseases(&symptoms, Some(&answers)).await?;
        let refined_matches = self
            .attach_providers(analysis.matches, origin, max_distance_km)
            .await?;

        info!("Refined results: {} matches", refined_matches.len());
        Ok(RefineResponse { refined_matches })
    }

    /// Scores every known disease against the input, merges follow-up answers
    /// when given, and returns the top matches. Records an audit entry in the background.
    pub async fn match_diseases(
        &self,
        raw_text: &str,
        answers: Option<&FollowUpAnswerSet>,
    ) -> Result<DiseaseAnalysis> {
        let answers = answers.filter(|a| !a.is_empty());
        let pass = FollowUpPass::from_answers(answers);
        let correlation_id = Uuid::new_v4();

        let tokens = token_set(raw_text);
        debug!("Tokenized {} distinct words [pass={:?}]", tokens.len(), pass);

        let emergency_detected = self.emergency.detect(raw_text);
        if emergency_detected {
            let cues = self.emergency.cues(raw_text);
            warn!("Emergency cues in input: {:?}", cues);
            self.emit(
                EventKind::EmergencyDetected,
                json!({ "cues": cues }),
                correlation_id,
            )
            .await;
        }

        let profiles = self.knowledge.disease_profiles().await?;
        debug!("Scoring against {} disease profiles", profiles.len());

        let question_lists: Vec<Vec<FollowUpQuestion>> = match pass {
            FollowUpPass::Refinement => {
                try_join_all(
                    profiles
                        .iter()
                        .map(|p| self.knowledge.followup_questions(&p.name)),
                )
                .await?
            }
            FollowUpPass::Initial => vec![Vec::new(); profiles.len()],
        };

        if let Some(answers) = answers {
            let consulted: Vec<&FollowUpQuestion> = question_lists.iter().flatten().collect();
            for key in unrecognized_answer_keys(answers, &consulted) {
                warn!("Ignoring answer to unknown question: '{}'", key);
            }
        }

        let mut candidates = Vec::new();
        for (profile, questions) in profiles.iter().zip(&question_lists) {
            let score = score_profile(&tokens, profile, answers, questions);
            if !score.is_match() {
                continue;
            }

            self.report_score(&score, correlation_id).await;
            candidates.push(MatchResult {
                disease: profile.name.clone(),
                confidence: score.confidence,
                matched_symptoms: score.all_matched(),
                specialist: profile.specialist.clone(),
                requires_urgent_care: emergency_detected || profile.urgent_care_eligible,
                follow_up_questions: Vec::new(),
                score_breakdown: score.breakdown,
            });
        }

        let candidate_count = candidates.len();
        let mut matches = rank_matches(candidates, self.config.top_diseases);

        if pass.attaches_questions() {
            let attached = try_join_all(
                matches
                    .iter()
                    .map(|m| self.knowledge.followup_questions(&m.disease)),
            )
            .await?;
            for (result, questions) in matches.iter_mut().zip(attached) {
                result.follow_up_questions = questions_to_attach(pass, questions);
            }
        }

        match matches.first() {
            Some(top) => info!(
                "Analysis complete: {} candidates, top match {} ({:.1}%)",
                candidate_count,
                top.disease,
                top.confidence * 100.0
            ),
            None => info!("Analysis complete: no matching disease"),
        }

        self.emit(
            EventKind::AnalysisCompleted,
            json!({
                "pass": pass,
                "candidates": candidate_count,
                "returned": matches.iter().map(|m| &m.disease).collect::<Vec<_>>(),
                "emergency_detected": emergency_detected,
            }),
            correlation_id,
        )
        .await;

        dispatch(
            Arc::clone(&self.audit),
            AuditRecord::new(raw_text, answers.cloned(), matches.clone(), emergency_detected),
            Some(Arc::clone(&self.events)),
        );

        Ok(DiseaseAnalysis {
            pass,
            emergency_detected,
            matches,
        })
    }

    async fn attach_providers(
        &self,
        matches: Vec<MatchResult>,
        origin: Option<GeoPoint>,
        max_distance_km: f64,
    ) -> Result<Vec<RankedMatch>> {
        try_join_all(
            matches
                .into_iter()
                .map(|result| self.rank_providers_for(result, origin, max_distance_km)),
        )
        .await
    }

    async fn rank_providers_for(
        &self,
        result: MatchResult,
        origin: Option<GeoPoint>,
        max_distance_km: f64,
    ) -> Result<RankedMatch> {
        let providers = self
            .providers
            .providers_for(&result.disease, &result.specialist)
            .await?;
        let found = providers.len();

        let nearby = filter_by_distance(providers, origin, max_distance_km);
        let mut doctors = rank_providers(nearby, self.config.top_providers);

        let max_slots = self.config.max_slots;
        let slot_lists = try_join_all(
            doctors
                .iter()
                .map(|d| self.providers.upcoming_slots(d.doctor_id, max_slots)),
        )
        .await?;
        for (doctor, slots) in doctors.iter_mut().zip(slot_lists) {
            doctor.available_slots = cap_slots(slots, max_slots);
        }

        debug!(
            "{}: {} {} providers found, {} kept",
            result.disease,
            found,
            result.specialist,
            doctors.len()
        );
        Ok(RankedMatch { result, doctors })
    }

    async fn report_score(&self, score: &DiseaseScore, correlation_id: Uuid) {
        let b = &score.breakdown;
        debug!(
            "{}: initial={:.2} followup={:.2} total={:.2}/{:.2} confidence={:.2}% symptoms={:?} confirmed={:?}",
            score.disease,
            b.initial_score,
            b.followup_score,
            b.total_score,
            b.max_possible,
            score.confidence * 100.0,
            score.matched_symptoms,
            score.followup_matched
        );

        self.emit(
            EventKind::DiseaseScored,
            json!({
                "disease": score.disease,
                "initial_score": b.initial_score,
                "followup_score": b.followup_score,
                "total_score": b.total_score,
                "max_possible": b.max_possible,
                "confidence": score.confidence,
                "matched_symptoms": score.matched_symptoms,
                "followup_matched": score.followup_matched,
            }),
            correlation_id,
        )
        .await;
    }

    async fn emit(&self, kind: EventKind, payload: serde_json::Value, correlation_id: Uuid) {
        self.events
            .emit(Event::new(kind, payload).with_correlation(correlation_id))
            .await;
    }

    fn resolve_origin(&self, latitude: Option<f64>, longitude: Option<f64>) -> Result<Option<GeoPoint>> {
        match GeoPoint::from_parts(latitude, longitude) {
            Some(point) if !point.is_valid() => Err(MediqueryError::validation(format!(
                "Invalid coordinates: ({}, {})",
                point.latitude, point.longitude
            ))),
            origin => Ok(origin),
        }
    }

    fn resolve_radius(&self, max_distance_km: Option<f64>) -> Result<f64> {
        let radius = max_distance_km.unwrap_or(self.config.max_distance_km);
        if radius.is_finite() && radius >= 0.0 {
            Ok(radius)
        } else {
            Err(MediqueryError::validation(format!(
                "max_distance_km must be a non-negative number, got {}",
                radius
            )))
        }
    }
}
