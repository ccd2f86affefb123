use chrono::NaiveDate;
use tracing::debug;

use super::distance::{GeoPoint, round_km};
use super::models::{AppointmentSlot, ProviderRecord};


/// Sort key stand-in for providers without a computed distance.
pub const NO_DISTANCE_SENTINEL_KM: f64 = 999.0;

/// Keeps providers within `max_distance_km` of `origin` and records their
/// distance. Without an origin every provider passes untouched.
pub fn filter_by_distance(
    providers: Vec<ProviderRecord>,
    origin: Option<GeoPoint>,
    max_distance_km: f64,
) -> Vec<ProviderRecord> {
    let Some(origin) = origin else {
        return providers;
    };

    providers
        .into_iter()
        .filter_map(|mut provider| {
            let Some(location) = GeoPoint::from_parts(provider.latitude, provider.longitude) else {
                debug!("Skipping provider {} without coordinates", provider.doctor_id);
                return None;
            };

            let distance = origin.distance_km(&location);
            if distance <= max_distance_km {
                provider.distance_km = Some(round_km(distance));
                Some(provider)
            } else {
                None
            }
        })
        .collect()
}

/// Nearest first, ties broken by higher success rate; stable, then truncated.
pub fn rank_providers(mut providers: Vec<ProviderRecord>, limit: usize) -> Vec<ProviderRecord> {
    providers.sort_by(|a, b| {
        let da = a.distance_km.unwrap_or(NO_DISTANCE_SENTINEL_KM);
        let db = b.distance_km.unwrap_or(NO_DISTANCE_SENTINEL_KM);
        da.total_cmp(&db)
            .then_with(|| b.success_rate.total_cmp(&a.success_rate))
    });
    providers.truncate(limit);
    providers
}

/// Unbooked slots dated `today` or later, ascending by date then time.
pub fn select_upcoming_slots(
    slots: impl IntoIterator<Item = AppointmentSlot>,
    today: NaiveDate,
    limit: usize,
) -> Vec<AppointmentSlot> {
    cap_slots(
        slots.into_iter().filter(|slot| slot.slot_date >= today).collect(),
        limit,
    )
}

/// Drops booked slots, orders by date then time and keeps the first `limit`.
pub fn cap_slots(mut slots: Vec<AppointmentSlot>, limit: usize) -> Vec<AppointmentSlot> {
    slots.retain(|slot| !slot.is_booked);
    slots.sort_by_key(|slot| (slot.slot_date, slot.slot_time));
    slots.truncate(limit);
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolkit::providers::distance::haversine_km;
    use chrono::NaiveTime;

    fn provider(doctor_id: i64, lat: Option<f64>, lon: Option<f64>, success_rate: f64) -> ProviderRecord {
        ProviderRecord {
            doctor_id,
            name: format!("Dr. {}", doctor_id),
            specialization: "Neurologist".to_string(),
            contact: None,
            hospital_name: "City Hospital".to_string(),
            location_label: "Downtown".to_string(),
            latitude: lat,
            longitude: lon,
            hospital_rating: 4.0,
            success_rate,
            total_cases: 10,
            base_fee: Some(500.0),
            available_slots: Vec::new(),
            distance_km: None,
        }
    }

    fn slot(slot_id: i64, date: (i32, u32, u32), time: (u32, u32), is_booked: bool) -> AppointmentSlot {
        AppointmentSlot {
            slot_id,
            slot_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            slot_time: NaiveTime::from_hms_opt(time.0, time.1, 0).unwrap(),
            is_booked,
        }
    }

    #[test]
    fn test_radius_boundary() {
        let origin = GeoPoint::new(0.0, 0.0);
        let exact = haversine_km(0.0, 0.0, 1.0, 0.0);

        let kept = filter_by_distance(vec![provider(1, Some(1.0), Some(0.0), 0.5)], Some(origin), exact);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].distance_km, Some(111.19));

        let dropped = filter_by_distance(
            vec![provider(1, Some(1.0), Some(0.0), 0.5)],
            Some(origin),
            exact - 0.01,
        );
        assert!(dropped.is_empty());
    }

    #[test]
    fn test_no_origin_keeps_everyone() {
        let providers = vec![
            provider(1, Some(50.0), Some(50.0), 0.5),
            provider(2, None, None, 0.9),
        ];
        let kept = filter_by_distance(providers, None, 20.0);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|p| p.distance_km.is_none()));
    }

    #[test]
    fn test_origin_drops_providers_without_coordinates() {
        let kept = filter_by_distance(
            vec![provider(1, None, None, 0.9), provider(2, Some(0.01), Some(0.01), 0.1)],
            Some(GeoPoint::new(0.0, 0.0)),
            20.0,
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].doctor_id, 2);
    }

    #[test]
    fn test_rank_by_distance_then_success_rate() {
        let mut near = provider(1, None, None, 0.2);
        near.distance_km = Some(1.5);
        let mut tied_low = provider(2, None, None, 0.3);
        tied_low.distance_km = Some(4.0);
        let mut tied_high = provider(3, None, None, 0.9);
        tied_high.distance_km = Some(4.0);
        let unknown = provider(4, None, None, 1.0);

        let ranked = rank_providers(vec![unknown, tied_low, near, tied_high], 10);
        let ids: Vec<i64> = ranked.iter().map(|p| p.doctor_id).collect();
        assert_eq!(ids, vec![1, 3, 2, 4]);
    }

    #[test]
    fn test_rank_without_distances_uses_success_rate() {
        let ranked = rank_providers(
            (1..=12).map(|i| provider(i, None, None, i as f64 / 100.0)).collect(),
            10,
        );
        assert_eq!(ranked.len(), 10);
        assert_eq!(ranked[0].doctor_id, 12);
        assert_eq!(ranked[9].doctor_id, 3);
    }

    #[test]
    fn test_select_upcoming_slots() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let slots = vec![
            slot(1, (2026, 3, 12), (9, 0), false),
            slot(2, (2026, 3, 9), (9, 0), false),
            slot(3, (2026, 3, 10), (14, 30), false),
            slot(4, (2026, 3, 10), (10, 0), true),
            slot(5, (2026, 3, 10), (8, 0), false),
            slot(6, (2026, 3, 11), (8, 0), false),
            slot(7, (2026, 3, 15), (8, 0), false),
            slot(8, (2026, 3, 20), (8, 0), false),
        ];

        let upcoming = select_upcoming_slots(slots, today, 5);
        let ids: Vec<i64> = upcoming.iter().map(|s| s.slot_id).collect();
        assert_eq!(ids, vec![5, 3, 6, 1, 7]);
    }
}
