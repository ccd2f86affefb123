use chrono::Utc;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::models::{BookingRecord, BookingStatus, DEFAULT_PATIENT_NAME};
use crate::core::error::{MediqueryError, Result};
use crate::toolkit::providers::models::SlotId;
use crate::toolkit::providers::repository::ProviderRepository;


/// Appointment bookings against provider slots. A slot may be booked more than once.
pub struct BookingLedger {
    providers: Arc<dyn ProviderRepository>,
    bookings: RwLock<Vec<BookingRecord>>,
}

impl BookingLedger {
    pub fn new(providers: Arc<dyn ProviderRepository>) -> Self {
        Self {
            providers,
            bookings: RwLock::new(Vec::new()),
        }
    }

    pub async fn book(
        &self,
        slot_id: SlotId,
        patient_id: i64,
        patient_name: Option<&str>,
    ) -> Result<BookingRecord> {
        let details = self
            .providers
            .slot_details(slot_id)
            .await?
            .ok_or_else(|| MediqueryError::NotFound("Slot not found".to_string()))?;

        let patient_name = patient_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_PATIENT_NAME);

        let record = BookingRecord {
            booking_id: Uuid::new_v4(),
            patient_id,
            patient_name: patient_name.to_string(),
            slot_id,
            doctor_id: details.doctor_id,
            doctor_name: details.doctor_name,
            specialization: details.specialization,
            hospital_name: details.hospital_name,
            location_label: details.location_label,
            appointment_date: details.slot.slot_date,
            appointment_time: details.slot.slot_time,
            consultation_fee: details.base_fee,
            booked_at: Utc::now(),
            status: BookingStatus::Confirmed,
            cancelled_at: None,
        };

        self.bookings.write().push(record.clone());
        info!(
            "Booked slot {} with {} for patient {}",
            slot_id, record.doctor_name, patient_id
        );
        Ok(record)
    }

    pub fn cancel(&self, booking_id: Uuid, patient_id: i64) -> Result<BookingRecord> {
        let mut bookings = self.bookings.write();
        let booking = bookings
            .iter_mut()
            .find(|b| {
                b.booking_id == booking_id
                    && b.patient_id == patient_id
                    && b.status == BookingStatus::Confirmed
            })
            .ok_or_else(|| {
                MediqueryError::NotFound("Appointment not found or already cancelled".to_string())
            })?;

        booking.status = BookingStatus::Cancelled;
        booking.cancelled_at = Some(Utc::now());
        info!("Cancelled booking {}", booking_id);
        Ok(booking.clone())
    }

    /// Newest first.
    pub fn history(&self, patient_id: i64) -> Vec<BookingRecord> {
        let mut history: Vec<BookingRecord> = self
            .bookings
            .read()
            .iter()
            .rev()
            .filter(|b| b.patient_id == patient_id)
            .cloned()
            .collect();
        history.sort_by(|a, b| b.booked_at.cmp(&a.booked_at));
        history
    }
}
