use serde::{Deserialize, Serialize};


pub const EARTH_RADIUS_KM: f64 = 6371.0;


#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Both coordinates or nothing.
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => Some(Self::new(latitude, longitude)),
            _ => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        haversine_km(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}


pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}


pub fn round_km(distance: f64) -> f64 {
    (distance * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_point_is_zero() {
        assert_eq!(haversine_km(19.076, 72.8777, 19.076, 72.8777), 0.0);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let d = haversine_km(0.0, 0.0, 1.0, 0.0);
        assert!((d - EARTH_RADIUS_KM * std::f64::consts::PI / 180.0).abs() < 1e-9);
        assert!((d - 111.19).abs() < 0.01);
    }

    #[test]
    fn test_known_city_pair() {
        // Mumbai to Pune, roughly 120 km great-circle
        let mumbai = GeoPoint::new(19.0760, 72.8777);
        let pune = GeoPoint::new(18.5204, 73.8567);
        let d = mumbai.distance_km(&pune);
        assert!(d > 115.0 && d < 125.0, "got {}", d);
        assert!((d - pune.distance_km(&mumbai)).abs() < 1e-9);
    }

    #[test]
    fn test_geo_point_parts_and_validity() {
        assert!(GeoPoint::from_parts(Some(1.0), None).is_none());
        assert!(GeoPoint::from_parts(Some(1.0), Some(2.0)).is_some());
        assert!(!GeoPoint::new(91.0, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, f64::NAN).is_valid());
        assert!(GeoPoint::new(-90.0, 180.0).is_valid());
    }

    #[test]
    fn test_round_km() {
        assert_eq!(round_km(12.3456), 12.35);
        assert_eq!(round_km(0.001), 0.0);
    }
}
