//! Registration reference data: countries and major cities.
//!
//! Profiles record the centroid of the selected country (and city, when one
//! is offered). City tables exist only for the countries where coverage was
//! requested; everywhere else the city select is simply absent.
//!
//! Centroids are built with [`LatLng::from_degrees`], so a typo'd table
//! entry fails at compile time instead of decoding into a bad profile.

use shoptax_core::LatLng;

/// A selectable country with its centroid.
#[derive(Debug, Clone, Copy)]
pub struct Country {
    pub name: &'static str,
    /// ISO 3166-1 alpha-2 code.
    pub code: &'static str,
    pub centroid: LatLng,
}

/// A selectable city with its centroid.
#[derive(Debug, Clone, Copy)]
pub struct City {
    pub name: &'static str,
    pub centroid: LatLng,
}

const fn country(name: &'static str, code: &'static str, lat: f64, lng: f64) -> Country {
    Country { name, code, centroid: LatLng::from_degrees(lat, lng) }
}

const fn city(name: &'static str, lat: f64, lng: f64) -> City {
    City { name, centroid: LatLng::from_degrees(lat, lng) }
}

/// Countries offered at registration, with centroid coordinates.
pub const COUNTRIES: &[Country] = &[
    country("Pakistan", "PK", 30.3753, 69.3451),
    country("India", "IN", 20.5937, 78.9629),
    country("United States", "US", 39.8283, -98.5795),
    country("United Kingdom", "GB", 55.3781, -3.4360),
    country("Canada", "CA", 56.1304, -106.3468),
    country("Australia", "AU", -25.2744, 133.7751),
    country("Germany", "DE", 51.1657, 10.4515),
    country("France", "FR", 46.2276, 2.2137),
    country("Japan", "JP", 36.2048, 138.2529),
    country("China", "CN", 35.8617, 104.1954),
    country("Brazil", "BR", -14.2350, -51.9253),
    country("Mexico", "MX", 23.6345, -102.5528),
    country("South Africa", "ZA", -30.5595, 22.9375),
    country("Nigeria", "NG", 9.0820, 8.6753),
    country("Egypt", "EG", 26.8206, 30.8025),
    country("Turkey", "TR", 38.9637, 35.2433),
    country("Saudi Arabia", "SA", 23.8859, 45.0792),
    country("UAE", "AE", 23.4241, 53.8478),
    country("Bangladesh", "BD", 23.6850, 90.3563),
    country("Indonesia", "ID", -0.7893, 113.9213),
];

const PAKISTAN_CITIES: &[City] = &[
    city("Karachi", 24.8607, 67.0011),
    city("Lahore", 31.5204, 74.3587),
    city("Islamabad", 33.6844, 73.0479),
    city("Rawalpindi", 33.5651, 73.0169),
    city("Faisalabad", 31.4504, 73.1350),
    city("Multan", 30.1575, 71.5249),
    city("Peshawar", 34.0151, 71.5249),
    city("Quetta", 30.1798, 66.9750),
    city("Sialkot", 32.4945, 74.5229),
    city("Gujranwala", 32.1877, 74.1945),
];

const INDIA_CITIES: &[City] = &[
    city("Mumbai", 19.0760, 72.8777),
    city("Delhi", 28.7041, 77.1025),
    city("Bangalore", 12.9716, 77.5946),
    city("Hyderabad", 17.3850, 78.4867),
    city("Chennai", 13.0827, 80.2707),
    city("Kolkata", 22.5726, 88.3639),
    city("Pune", 18.5204, 73.8567),
    city("Ahmedabad", 23.0225, 72.5714),
];

const US_CITIES: &[City] = &[
    city("New York", 40.7128, -74.0060),
    city("Los Angeles", 34.0522, -118.2437),
    city("Chicago", 41.8781, -87.6298),
    city("Houston", 29.7604, -95.3698),
    city("Phoenix", 33.4484, -112.0740),
    city("Philadelphia", 39.9526, -75.1652),
];

/// Look up a country by ISO code.
#[must_use]
pub fn country_by_code(code: &str) -> Option<&'static Country> {
    COUNTRIES.iter().find(|c| c.code == code)
}

/// Cities offered for a country; empty for countries without a city table.
#[must_use]
pub fn cities_for(country_code: &str) -> &'static [City] {
    match country_code {
        "PK" => PAKISTAN_CITIES,
        "IN" => INDIA_CITIES,
        "US" => US_CITIES,
        _ => &[],
    }
}

impl Country {
    /// Country centroid.
    #[must_use]
    pub const fn latlng(&self) -> LatLng {
        self.centroid
    }
}

impl City {
    /// City centroid.
    #[must_use]
    pub const fn latlng(&self) -> LatLng {
        self.centroid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centroids_match_checked_construction() {
        for c in COUNTRIES {
            let checked = LatLng::new(c.centroid.lat, c.centroid.lng);
            assert_eq!(checked, Ok(c.centroid), "{}", c.code);
            for city in cities_for(c.code) {
                let checked = LatLng::new(city.centroid.lat, city.centroid.lng);
                assert_eq!(checked, Ok(city.centroid), "{}", city.name);
            }
        }
    }

    #[test]
    fn test_country_lookup() {
        assert_eq!(country_by_code("PK").map(|c| c.name), Some("Pakistan"));
        assert!(country_by_code("ZZ").is_none());
    }

    #[test]
    fn test_cities_only_for_covered_countries() {
        assert_eq!(cities_for("PK").len(), 10);
        assert_eq!(cities_for("IN").len(), 8);
        assert_eq!(cities_for("US").len(), 6);
        assert!(cities_for("DE").is_empty());
    }
}
