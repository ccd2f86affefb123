

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{EnumString, IntoStaticStr};
use uuid::Uuid;


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventKind {
    /// One disease profile went through the scorer.
    DiseaseScored,
    AnalysisCompleted,
    EmergencyDetected,
    AuditFailed,
}


#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {

    pub event_id: Uuid,

    pub kind: EventKind,

    pub timestamp: DateTime<Utc>,

    pub correlation_id: Option<Uuid>,

    pub payload: Value,
}

impl Event {

    #[must_use]
    pub fn new(kind: EventKind, payload: Value) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            kind,
            timestamp: Utc::now(),
            correlation_id: None,
            payload,
        }
    }

    /// Ties the event to a single analysis call.
    #[must_use]
    pub fn with_correlation(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }
}
