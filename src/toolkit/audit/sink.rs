

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::models::AuditRecord;
use crate::core::error::{MediqueryError, Result};
use crate::core::events::{Event, EventBus, EventKind};


#[async_trait]
pub trait AuditSink: Send + Sync {

    async fn record(&self, record: AuditRecord) -> Result<()>;


    fn sink_name(&self) -> &str;
}

/// Writes the record on a background task. Failures are logged, optionally
/// announced on the event bus, and never reach the caller.
pub fn dispatch(
    sink: Arc<dyn AuditSink>,
    record: AuditRecord,
    events: Option<Arc<EventBus>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let id = record.id;
        if let Err(e) = sink.record(record).await {
            warn!("Audit sink '{}' failed for record {}: {}", sink.sink_name(), id, e);

            if let Some(events) = events {
                let payload = json!({
                    "record_id": id,
                    "sink": sink.sink_name(),
                    "error": e.to_string(),
                });
                events.emit(Event::new(EventKind::AuditFailed, payload)).await;
            }
        }
    })
}


/// Appends one JSON document per line.
pub struct JsonlAuditSink {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl JsonlAuditSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }
}

#[async_trait]
impl AuditSink for JsonlAuditSink {
    async fn record(&self, record: AuditRecord) -> Result<()> {
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| MediqueryError::Audit(format!("{}: {}", self.path.display(), e)))?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    fn sink_name(&self) -> &str {
        "jsonl"
    }
}


pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, record: AuditRecord) -> Result<()> {
        let action: &'static str = record.action.into();
        let top = record.results.first().map(|r| r.disease.as_str()).unwrap_or("-");
        info!(
            target: "mediquery::audit",
            "{} id={} results={} top={} emergency={}",
            action,
            record.id,
            record.results.len(),
            top,
            record.emergency_detected
        );
        Ok(())
    }

    fn sink_name(&self) -> &str {
        "tracing"
    }
}


#[derive(Default)]
pub struct MemoryAuditSink {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn record(&self, record: AuditRecord) -> Result<()> {
        self.records.lock().push(record);
        Ok(())
    }

    fn sink_name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolkit::audit::models::AuditAction;
    use crate::toolkit::knowledge::models::FollowUpAnswerSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingSink;

    #[async_trait]
    impl AuditSink for FailingSink {
        async fn record(&self, _record: AuditRecord) -> Result<()> {
            Err(MediqueryError::Audit("store offline".into()))
        }

        fn sink_name(&self) -> &str {
            "failing"
        }
    }

    #[tokio::test]
    async fn test_dispatch_to_memory() {
        let sink = Arc::new(MemoryAuditSink::new());
        let handle = dispatch(
            sink.clone(),
            AuditRecord::new("mild headache", None, Vec::new(), false),
            None,
        );
        handle.await.unwrap();

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].action, AuditAction::SymptomSearch);
        assert_eq!(records[0].input, "mild headache");
    }

    #[tokio::test]
    async fn test_dispatch_swallows_failures() {
        let events = Arc::new(EventBus::new());
        let failures = Arc::new(AtomicUsize::new(0));
        let failures_clone = Arc::clone(&failures);
        events
            .register(
                EventKind::AuditFailed,
                Arc::new(move |_event| {
                    failures_clone.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .await;

        let handle = dispatch(
            Arc::new(FailingSink),
            AuditRecord::new("x", None, Vec::new(), false),
            Some(events),
        );
        assert!(handle.await.is_ok());

        tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;
        assert_eq!(failures.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_jsonl_sink_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let sink = JsonlAuditSink::new(&path);

        let mut answers = FollowUpAnswerSet::new();
        answers.insert("Is the pain on one side of your head?".into(), "yes".into());

        sink.record(AuditRecord::new("headache", None, Vec::new(), false)).await.unwrap();
        sink.record(AuditRecord::new("headache", Some(answers), Vec::new(), true)).await.unwrap();

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        let lines: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["action"], "symptom_search");
        assert_eq!(lines[1]["action"], "refined_symptom_search");
        assert_eq!(lines[1]["emergency_detected"], true);
    }

    #[tokio::test]
    async fn test_jsonl_sink_reports_unwritable_path() {
        let sink = JsonlAuditSink::new("/nonexistent-dir/audit.jsonl");
        let err = sink
            .record(AuditRecord::new("x", None, Vec::new(), false))
            .await
            .unwrap_err();
        assert!(matches!(err, MediqueryError::Audit(_)));
    }
}
