

pub mod cache;
pub mod models;
pub mod repository;

pub use cache::{CacheStats, CachedKnowledgeRepository};
pub use models::{
    DiseaseProfile, FollowUpAnswerSet, FollowUpQuestion, FollowUpTemplate, KnowledgeSnapshot,
    QuestionKind, Severity, SymptomWeight,
};
pub use repository::{InMemoryKnowledgeStore, KnowledgeRepository};
