use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::toolkit::providers::models::{DoctorId, SlotId};


pub const DEFAULT_PATIENT_NAME: &str = "Guest Patient";


#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRecord {
    pub booking_id: Uuid,
    pub patient_id: i64,
    pub patient_name: String,
    pub slot_id: SlotId,
    pub doctor_id: DoctorId,
    pub doctor_name: String,
    pub specialization: String,
    pub hospital_name: String,
    pub location_label: String,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub consultation_fee: Option<f64>,
    pub booked_at: DateTime<Utc>,
    pub status: BookingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<DateTime<Utc>>,
}
