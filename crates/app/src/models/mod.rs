//! Domain models.
//!
//! The record store is schemaless; these structs are the explicit shapes
//! this application accepts at the boundary. Documents are decoded with
//! [`decode_document`], which turns any mismatch into a malformed-document
//! error instead of propagating half-trusted data.

pub mod business;
pub mod geo;
pub mod profile;
pub mod session;

pub use business::{Business, NewBusiness};
pub use profile::{Profile, ProfileLocation};
pub use session::{CurrentUser, Identity, keys as session_keys};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::backend::BackendError;

/// Decode a raw store document into a typed model.
///
/// # Errors
///
/// Returns [`BackendError::MalformedDocument`] naming the collection when
/// the document does not match the expected shape.
pub fn decode_document<T: DeserializeOwned>(
    collection: &'static str,
    doc: Value,
) -> Result<T, BackendError> {
    serde_json::from_value(doc).map_err(|e| BackendError::MalformedDocument {
        collection,
        detail: e.to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_document_rejects_wrong_shape() {
        // tax_status must be one of the two enum values
        let doc = json!({
            "id": "b1",
            "shop_name": "Mehran General Store",
            "owner_name": "A. Khan",
            "contact_number": "+92 300 1234567",
            "address": "Shahrah-e-Faisal, Karachi",
            "location": { "lat": 24.8607, "lng": 67.0011 },
            "tax_status": "overdue",
            "created_at": "2026-01-10T08:00:00Z",
            "owning_identity_id": "u1"
        });
        let res: Result<Business, _> = decode_document("businesses", doc);
        assert!(matches!(
            res.unwrap_err(),
            BackendError::MalformedDocument { collection: "businesses", .. }
        ));
    }

    #[test]
    fn test_decode_document_rejects_out_of_range_coordinates() {
        let doc = json!({
            "id": "b2",
            "shop_name": "Mehran General Store",
            "owner_name": "A. Khan",
            "contact_number": "+92 300 1234567",
            "address": "Shahrah-e-Faisal, Karachi",
            "location": { "lat": 500.0, "lng": -999.0 },
            "tax_status": "unpaid",
            "created_at": "2026-01-10T08:00:00Z",
            "owning_identity_id": "u1"
        });
        let res: Result<Business, _> = decode_document("businesses", doc);
        assert!(matches!(
            res.unwrap_err(),
            BackendError::MalformedDocument { collection: "businesses", .. }
        ));
    }
}
