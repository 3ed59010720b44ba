//! Application profile, 1:1 with an identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shoptax_core::{IdentityId, LatLng, ProfileStatus, Role};

/// Country and optional city coordinates captured at registration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileLocation {
    /// Centroid of the selected country.
    pub country: LatLng,
    /// Centroid of the selected city, when one was chosen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<LatLng>,
}

/// The application-level record associated 1:1 with an identity.
///
/// Created once at registration and read at every session resolution. The
/// role is set at creation and never mutated afterwards; a profile document
/// missing at resolution time is fatal for that session (fail closed).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub identity_id: IdentityId,
    pub full_name: String,
    pub role: Role,
    /// ISO country code, e.g. "PK".
    pub country: String,
    pub country_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub location: ProfileLocation,
    #[serde(default)]
    pub status: ProfileStatus,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::decode_document;
    use serde_json::json;

    #[test]
    fn test_decode_full_profile() {
        let doc = json!({
            "identity_id": "u_42",
            "full_name": "Ayesha Raza",
            "role": "shop_owner",
            "country": "PK",
            "country_name": "Pakistan",
            "city": "Karachi",
            "location": {
                "country": { "lat": 30.3753, "lng": 69.3451 },
                "city": { "lat": 24.8607, "lng": 67.0011 }
            },
            "status": "active",
            "created_at": "2026-02-01T12:00:00Z"
        });
        let profile: Profile = decode_document("profiles", doc).unwrap();
        assert_eq!(profile.role, Role::ShopOwner);
        assert_eq!(profile.city.as_deref(), Some("Karachi"));
        assert!(profile.location.city.is_some());
    }

    #[test]
    fn test_decode_profile_without_city() {
        let doc = json!({
            "identity_id": "u_7",
            "full_name": "Tax Officer",
            "role": "admin",
            "country": "PK",
            "country_name": "Pakistan",
            "location": {
                "country": { "lat": 30.3753, "lng": 69.3451 }
            },
            "created_at": "2026-02-01T12:00:00Z"
        });
        let profile: Profile = decode_document("profiles", doc).unwrap();
        assert_eq!(profile.role, Role::Admin);
        assert!(profile.city.is_none());
        assert!(profile.location.city.is_none());
        assert_eq!(profile.status, ProfileStatus::Active);
    }

    #[test]
    fn test_decode_profile_missing_role_is_malformed() {
        let doc = json!({
            "identity_id": "u_9",
            "full_name": "Nameless",
            "country": "PK",
            "country_name": "Pakistan",
            "location": { "country": { "lat": 30.0, "lng": 69.0 } },
            "created_at": "2026-02-01T12:00:00Z"
        });
        let res: Result<Profile, _> = decode_document("profiles", doc);
        assert!(res.is_err());
    }
}
