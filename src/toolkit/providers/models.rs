use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;


pub type DoctorId = i64;
pub type SlotId = i64;


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentSlot {
    pub slot_id: SlotId,
    pub slot_date: NaiveDate,
    pub slot_time: NaiveTime,
    #[serde(default, skip_serializing)]
    pub is_booked: bool,
}


/// One care provider, already joined with hospital, fee and the expertise
/// row for the disease being ranked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderRecord {
    pub doctor_id: DoctorId,
    pub name: String,
    pub specialization: String,
    #[serde(default)]
    pub contact: Option<String>,
    pub hospital_name: String,
    #[serde(default)]
    pub location_label: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub hospital_rating: f64,
    #[serde(default)]
    pub success_rate: f64,
    #[serde(default)]
    pub total_cases: u32,
    #[serde(default)]
    pub base_fee: Option<f64>,
    #[serde(default)]
    pub available_slots: Vec<AppointmentSlot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}


#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Expertise {
    #[serde(default)]
    pub success_rate: f64,
    #[serde(default)]
    pub total_cases: u32,
}


/// Storage shape of a provider: per-disease expertise and the full slot calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredProvider {
    pub doctor_id: DoctorId,
    pub name: String,
    pub specialization: String,
    #[serde(default)]
    pub contact: Option<String>,
    pub hospital_name: String,
    #[serde(default)]
    pub location_label: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub hospital_rating: f64,
    #[serde(default)]
    pub base_fee: Option<f64>,
    #[serde(default)]
    pub expertise: HashMap<String, Expertise>,
    #[serde(default)]
    pub slots: Vec<AppointmentSlot>,
}

impl StoredProvider {
    /// Projects the row for one disease; missing expertise reads as zero.
    pub fn record_for(&self, disease_name: &str) -> ProviderRecord {
        let expertise = self.expertise.get(disease_name).copied().unwrap_or_default();

        ProviderRecord {
            doctor_id: self.doctor_id,
            name: self.name.clone(),
            specialization: self.specialization.clone(),
            contact: self.contact.clone(),
            hospital_name: self.hospital_name.clone(),
            location_label: self.location_label.clone(),
            latitude: self.latitude,
            longitude: self.longitude,
            hospital_rating: self.hospital_rating,
            success_rate: expertise.success_rate,
            total_cases: expertise.total_cases,
            base_fee: self.base_fee,
            available_slots: Vec::new(),
            distance_km: None,
        }
    }
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotDetails {
    pub slot: AppointmentSlot,
    pub doctor_id: DoctorId,
    pub doctor_name: String,
    pub specialization: String,
    pub hospital_name: String,
    pub location_label: String,
    pub base_fee: Option<f64>,
}
