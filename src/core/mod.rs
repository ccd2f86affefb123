

pub mod analyzer;
pub mod config;
pub mod error;
pub mod events;

pub use analyzer::{
    AnalyzeRequest, AnalyzeResponse, DiseaseAnalysis, RankedMatch, RefineRequest, RefineResponse,
    SymptomAnalyzer,
};
pub use config::MediqueryConfig;
pub use error::{MediqueryError, Result};
pub use events::{Event, EventBus, EventKind};
