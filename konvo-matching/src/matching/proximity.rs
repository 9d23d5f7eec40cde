use crate::models::Profile;

/// Haversine distance in km between two lat/lng points.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    const R: f64 = 6371.0; // Earth radius in km
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    R * c
}

/// Normalize a free-text city for comparison. Older profiles carry values
/// like "City: Lagos" or "location: lagos"; strip the label, trim, lowercase.
pub fn normalize_city(raw: &str) -> Option<String> {
    let mut s = raw.trim();
    for label in ["city:", "location:"] {
        if let Some(prefix) = s.get(..label.len()) {
            if prefix.eq_ignore_ascii_case(label) {
                s = s[label.len()..].trim_start();
                break;
            }
        }
    }
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_lowercase())
    }
}

/// Whether the profile carries any usable location data.
pub fn has_location(p: &Profile) -> bool {
    (p.latitude.is_some() && p.longitude.is_some())
        || p.city.as_deref().and_then(normalize_city).is_some()
}

/// Distance-like rank between two profiles, or None when they have no
/// comparable location data. Geopoints give the real distance; matching
/// normalized city names count as 0 km.
pub fn proximity_rank(a: &Profile, b: &Profile) -> Option<f64> {
    if let (Some(lat_a), Some(lng_a), Some(lat_b), Some(lng_b)) =
        (a.latitude, a.longitude, b.latitude, b.longitude)
    {
        return Some(haversine_km(lat_a, lng_a, lat_b, lng_b));
    }

    let city_a = a.city.as_deref().and_then(normalize_city)?;
    let city_b = b.city.as_deref().and_then(normalize_city)?;
    if city_a == city_b {
        Some(0.0)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn profile(city: Option<&str>, lat: Option<f64>, lng: Option<f64>) -> Profile {
        Profile {
            id: Uuid::now_v7(),
            user_id: Uuid::now_v7(),
            name: "test".into(),
            age: 25,
            gender: "Male".into(),
            interested_in: "Female".into(),
            bio: String::new(),
            photo_ref: None,
            city: city.map(|c| c.to_string()),
            latitude: lat,
            longitude: lng,
            active: true,
            banned: false,
            premium_credits: 0,
            referral_code: "KONVO-TEST00".into(),
            referred_by: None,
            referral_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn haversine_known_distance() {
        // Lagos to Abuja is roughly 520 km
        let km = haversine_km(6.5244, 3.3792, 9.0765, 7.3986);
        assert!((450.0..600.0).contains(&km), "got {km}");
        assert!(haversine_km(6.5244, 3.3792, 6.5244, 3.3792) < 0.001);
    }

    #[test]
    fn city_normalization_strips_labels() {
        assert_eq!(normalize_city("Lagos"), Some("lagos".into()));
        assert_eq!(normalize_city("  City: Lagos "), Some("lagos".into()));
        assert_eq!(normalize_city("location:LAGOS"), Some("lagos".into()));
        assert_eq!(normalize_city("city:  "), None);
        assert_eq!(normalize_city(""), None);
    }

    #[test]
    fn rank_prefers_geo_then_city() {
        let geo_a = profile(None, Some(6.5244), Some(3.3792));
        let geo_b = profile(None, Some(6.4550), Some(3.3841));
        let km = proximity_rank(&geo_a, &geo_b).unwrap();
        assert!(km < 20.0, "got {km}");

        let city_a = profile(Some("City: Lagos"), None, None);
        let city_b = profile(Some("lagos"), None, None);
        assert_eq!(proximity_rank(&city_a, &city_b), Some(0.0));

        let city_c = profile(Some("Abuja"), None, None);
        assert_eq!(proximity_rank(&city_a, &city_c), None);

        let nowhere = profile(None, None, None);
        assert_eq!(proximity_rank(&city_a, &nowhere), None);
    }

    #[test]
    fn has_location_cases() {
        assert!(has_location(&profile(Some("Lagos"), None, None)));
        assert!(has_location(&profile(None, Some(1.0), Some(2.0))));
        assert!(!has_location(&profile(Some("city: "), None, None)));
        assert!(!has_location(&profile(None, Some(1.0), None)));
    }
}
