

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use super::models::{AppointmentSlot, DoctorId, ProviderRecord, SlotDetails, SlotId, StoredProvider};
use super::ranking::select_upcoming_slots;
use crate::core::error::{MediqueryError, Result};


/// Relational side of the system: providers joined on specialization, and their calendars.
#[async_trait]
pub trait ProviderRepository: Send + Sync {

    async fn providers_for(&self, disease_name: &str, specialist: &str) -> Result<Vec<ProviderRecord>>;

    /// Unbooked slots from today on, ordered by date then time.
    async fn upcoming_slots(&self, doctor_id: DoctorId, limit: usize) -> Result<Vec<AppointmentSlot>>;


    async fn slot_details(&self, slot_id: SlotId) -> Result<Option<SlotDetails>>;
}


#[async_trait]
impl ProviderRepository for Arc<dyn ProviderRepository> {
    async fn providers_for(&self, disease_name: &str, specialist: &str) -> Result<Vec<ProviderRecord>> {
        (**self).providers_for(disease_name, specialist).await
    }

    async fn upcoming_slots(&self, doctor_id: DoctorId, limit: usize) -> Result<Vec<AppointmentSlot>> {
        (**self).upcoming_slots(doctor_id, limit).await
    }

    async fn slot_details(&self, slot_id: SlotId) -> Result<Option<SlotDetails>> {
        (**self).slot_details(slot_id).await
    }
}


#[derive(Debug, Clone, Default)]
pub struct InMemoryProviderStore {
    providers: Vec<StoredProvider>,
    today: Option<NaiveDate>,
}

impl InMemoryProviderStore {
    pub fn new(providers: Vec<StoredProvider>) -> Self {
        Self {
            providers,
            today: None,
        }
    }


    pub fn from_json(json: &str) -> Result<Self> {
        let providers: Vec<StoredProvider> = serde_json::from_str(json)?;
        Ok(Self::new(providers))
    }


    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            MediqueryError::ProviderStore(format!("cannot read {}: {}", path.display(), e))
        })?;
        let store = Self::from_json(&raw)?;
        info!("Loaded {} providers from {}", store.providers.len(), path.display());
        Ok(store)
    }

    /// Pins the calendar date used to decide which slots are upcoming.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }


    pub fn len(&self) -> usize {
        self.providers.len()
    }


    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[async_trait]
impl ProviderRepository for InMemoryProviderStore {
    async fn providers_for(&self, disease_name: &str, specialist: &str) -> Result<Vec<ProviderRecord>> {
        Ok(self
            .providers
            .iter()
            .filter(|p| p.specialization == specialist)
            .map(|p| p.record_for(disease_name))
            .collect())
    }

    async fn upcoming_slots(&self, doctor_id: DoctorId, limit: usize) -> Result<Vec<AppointmentSlot>> {
        let slots = self
            .providers
            .iter()
            .filter(|p| p.doctor_id == doctor_id)
            .flat_map(|p| p.slots.iter().cloned());
        Ok(select_upcoming_slots(slots, self.today(), limit))
    }

    async fn slot_details(&self, slot_id: SlotId) -> Result<Option<SlotDetails>> {
        let details = self.providers.iter().find_map(|p| {
            p.slots
                .iter()
                .find(|s| s.slot_id == slot_id)
                .map(|slot| SlotDetails {
                    slot: slot.clone(),
                    doctor_id: p.doctor_id,
                    doctor_name: p.name.clone(),
                    specialization: p.specialization.clone(),
                    hospital_name: p.hospital_name.clone(),
                    location_label: p.location_label.clone(),
                    base_fee: p.base_fee,
                })
        });
        Ok(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROVIDERS: &str = r#"[
        {
            "doctor_id": 1,
            "name": "Dr. Mehta",
            "specialization": "Neurologist",
            "hospital_name": "City Hospital",
            "location_label": "Andheri",
            "latitude": 19.1197,
            "longitude": 72.8468,
            "hospital_rating": 4.5,
            "base_fee": 800.0,
            "expertise": {"Migraine": {"success_rate": 0.92, "total_cases": 140}},
            "slots": [
                {"slot_id": 10, "slot_date": "2026-05-02", "slot_time": "10:00:00"},
                {"slot_id": 11, "slot_date": "2026-04-30", "slot_time": "09:00:00"},
                {"slot_id": 12, "slot_date": "2026-05-01", "slot_time": "09:00:00", "is_booked": true}
            ]
        },
        {
            "doctor_id": 2,
            "name": "Dr. Rao",
            "specialization": "Cardiologist",
            "hospital_name": "Heart Care",
            "latitude": 19.0,
            "longitude": 72.8
        }
    ]"#;

    fn store() -> InMemoryProviderStore {
        InMemoryProviderStore::from_json(PROVIDERS)
            .unwrap()
            .with_today(NaiveDate::from_ymd_opt(2026, 5, 1).unwrap())
    }

    #[tokio::test]
    async fn test_providers_join_on_specialization() {
        let store = store();
        let neuro = store.providers_for("Migraine", "Neurologist").await.unwrap();
        assert_eq!(neuro.len(), 1);
        assert_eq!(neuro[0].success_rate, 0.92);
        assert_eq!(neuro[0].total_cases, 140);

        // no expertise row for this disease reads as zero
        let other = store.providers_for("Hypertension", "Neurologist").await.unwrap();
        assert_eq!(other[0].success_rate, 0.0);

        assert!(store.providers_for("Migraine", "neurologist").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upcoming_slots_excludes_past_and_booked() {
        let slots = store().upcoming_slots(1, 5).await.unwrap();
        let ids: Vec<i64> = slots.iter().map(|s| s.slot_id).collect();
        assert_eq!(ids, vec![10]);
        assert!(store().upcoming_slots(99, 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_slot_details() {
        let details = store().slot_details(11).await.unwrap().unwrap();
        assert_eq!(details.doctor_name, "Dr. Mehta");
        assert_eq!(details.base_fee, Some(800.0));
        assert!(store().slot_details(404).await.unwrap().is_none());
    }
}
