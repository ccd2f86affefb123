

pub mod emergency;
pub mod followup;
pub mod models;
pub mod ranking;
pub mod scorer;
pub mod tokenizer;

pub use emergency::{EmergencyDetector, detect_emergency};
pub use followup::{FollowUpPass, PendingQuestion, answer_sheet};
pub use models::{DiseaseScore, MatchResult, ScoreBreakdown};
pub use ranking::rank_matches;
pub use scorer::{confidence, score_profile};
pub use tokenizer::{token_set, tokenize};
