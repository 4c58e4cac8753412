/// A charging station listed by a host.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub address: String,
    pub price_per_kwh: f64,
    pub available: bool,
}

impl Station {
    /// Great-circle distance to a point, in kilometers.
    pub fn distance_km(&self, lat: f64, lng: f64) -> f64 {
        const EARTH_RADIUS_KM: f64 = 6371.0;

        let d_lat = (lat - self.lat).to_radians();
        let d_lng = (lng - self.lng).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos() * lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(lat: f64, lng: f64) -> Station {
        Station {
            id: 1,
            user_id: 1,
            name: "SF Charger".to_string(),
            lat,
            lng,
            address: "123 Market St".to_string(),
            price_per_kwh: 0.45,
            available: true,
        }
    }

    #[test]
    fn distance_to_self_is_zero() {
        let station = station(37.7749, -122.4194);
        assert!(station.distance_km(37.7749, -122.4194) < 1e-6);
    }

    #[test]
    fn san_francisco_to_oakland_is_about_13_km() {
        let station = station(37.7749, -122.4194);
        let km = station.distance_km(37.8044, -122.2712);
        assert!((10.0..17.0).contains(&km), "got {km}");
    }
}
