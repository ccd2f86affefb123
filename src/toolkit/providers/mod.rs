

pub mod distance;
pub mod models;
pub mod ranking;
pub mod repository;

pub use distance::{EARTH_RADIUS_KM, GeoPoint, haversine_km};
pub use models::{AppointmentSlot, DoctorId, Expertise, ProviderRecord, SlotDetails, SlotId, StoredProvider};
pub use ranking::{NO_DISTANCE_SENTINEL_KM, cap_slots, filter_by_distance, rank_providers, select_upcoming_slots};
pub use repository::{InMemoryProviderStore, ProviderRepository};
