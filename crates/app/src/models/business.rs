//! Registered business with tax status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use shoptax_core::{BusinessId, IdentityId, LatLng, TaxStatus};

/// A registered shop/business entity.
///
/// Created by a shop owner (for themselves) or by an admin on behalf of a
/// business; `tax_status` is mutated only by admins, recorded with a fresh
/// `updated_at`; deleted only by admins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Business {
    pub id: BusinessId,
    pub shop_name: String,
    pub owner_name: String,
    pub contact_number: String,
    pub address: String,
    pub location: LatLng,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Tax challan (payment receipt) amount, set by admin registration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challan_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challan_image_url: Option<String>,
    pub tax_status: TaxStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    pub owning_identity_id: IdentityId,
    /// Identity of the admin who registered on the owner's behalf, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered_by: Option<IdentityId>,
}

/// Validated input for registering a business.
///
/// Built by the routes layer after form validation (required fields present,
/// location selected, challan amount numeric); converted to store fields
/// only once validation has passed - no partial submissions.
#[derive(Debug, Clone)]
pub struct NewBusiness {
    pub shop_name: String,
    pub owner_name: String,
    pub contact_number: String,
    pub address: String,
    pub location: LatLng,
    pub image_url: Option<String>,
    pub challan_amount: Option<f64>,
    pub challan_image_url: Option<String>,
    pub owning_identity_id: IdentityId,
    pub registered_by: Option<IdentityId>,
}

impl NewBusiness {
    /// Store fields for document creation. New businesses always start
    /// unpaid; only an admin mark-paid action can change that.
    #[must_use]
    pub fn into_fields(self, now: DateTime<Utc>) -> Value {
        let mut map = serde_json::Map::new();
        map.insert("shop_name".to_string(), Value::String(self.shop_name));
        map.insert("owner_name".to_string(), Value::String(self.owner_name));
        map.insert(
            "contact_number".to_string(),
            Value::String(self.contact_number),
        );
        map.insert("address".to_string(), Value::String(self.address));
        map.insert(
            "location".to_string(),
            json!({ "lat": self.location.lat, "lng": self.location.lng }),
        );
        map.insert("tax_status".to_string(), json!(TaxStatus::Unpaid));
        map.insert("created_at".to_string(), json!(now));
        map.insert(
            "owning_identity_id".to_string(),
            json!(self.owning_identity_id),
        );
        if let Some(url) = self.image_url {
            map.insert("image_url".to_string(), Value::String(url));
        }
        if let Some(amount) = self.challan_amount {
            map.insert("challan_amount".to_string(), json!(amount));
        }
        if let Some(url) = self.challan_image_url {
            map.insert("challan_image_url".to_string(), Value::String(url));
        }
        if let Some(admin) = self.registered_by {
            map.insert("registered_by".to_string(), json!(admin));
        }

        Value::Object(map)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::decode_document;

    fn sample_location() -> LatLng {
        LatLng::new(31.5204, 74.3587).unwrap()
    }

    #[test]
    fn test_new_business_fields_default_unpaid() {
        let nb = NewBusiness {
            shop_name: "Anarkali Cloth House".to_string(),
            owner_name: "M. Aslam".to_string(),
            contact_number: "+92 42 1234567".to_string(),
            address: "Anarkali Bazaar, Lahore".to_string(),
            location: sample_location(),
            image_url: None,
            challan_amount: None,
            challan_image_url: None,
            owning_identity_id: IdentityId::new("u_1"),
            registered_by: None,
        };
        let fields = nb.into_fields(Utc::now());
        assert_eq!(fields["tax_status"], "unpaid");
        assert!(fields.get("image_url").is_none());
        assert!(fields.get("registered_by").is_none());
    }

    #[test]
    fn test_new_business_fields_with_challan() {
        let nb = NewBusiness {
            shop_name: "Anarkali Cloth House".to_string(),
            owner_name: "M. Aslam".to_string(),
            contact_number: "+92 42 1234567".to_string(),
            address: "Anarkali Bazaar, Lahore".to_string(),
            location: sample_location(),
            image_url: Some("https://files.example.net/shops/u_1/1.jpg".to_string()),
            challan_amount: Some(1500.0),
            challan_image_url: Some("https://files.example.net/challans/u_1/1.jpg".to_string()),
            owning_identity_id: IdentityId::new("u_1"),
            registered_by: Some(IdentityId::new("admin_1")),
        };
        let fields = nb.into_fields(Utc::now());
        assert_eq!(fields["challan_amount"], 1500.0);
        assert_eq!(fields["registered_by"], "admin_1");
    }

    #[test]
    fn test_decode_business_roundtrip() {
        let doc = serde_json::json!({
            "id": "b_12",
            "shop_name": "Mehran General Store",
            "owner_name": "A. Khan",
            "contact_number": "+92 300 1234567",
            "address": "Shahrah-e-Faisal, Karachi",
            "location": { "lat": 24.8607, "lng": 67.0011 },
            "tax_status": "paid",
            "created_at": "2026-01-10T08:00:00Z",
            "updated_at": "2026-02-11T09:30:00Z",
            "owning_identity_id": "u_3"
        });
        let business: Business = decode_document("businesses", doc).unwrap();
        assert_eq!(business.tax_status, TaxStatus::Paid);
        assert!(business.updated_at.is_some());
        assert_eq!(business.location.display_6dp(), "24.860700, 67.001100");
    }
}
