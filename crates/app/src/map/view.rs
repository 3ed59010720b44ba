//! Map view model: markers, selection, and the mount gate.

use serde::Serialize;

use shoptax_core::{BusinessId, LatLng, TaxStatus};

use crate::models::Business;

const DEFAULT_ZOOM: u8 = 6;
const DEFAULT_HEIGHT: &str = "400px";

/// Pin color, derived from tax status for shop markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerColor {
    /// Taxes paid.
    Green,
    /// Taxes unpaid.
    Red,
    /// The in-progress selection pin.
    Blue,
}

impl From<TaxStatus> for MarkerColor {
    fn from(status: TaxStatus) -> Self {
        match status {
            TaxStatus::Paid => Self::Green,
            TaxStatus::Unpaid => Self::Red,
        }
    }
}

/// One pin on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub id: Option<BusinessId>,
    pub location: LatLng,
    pub color: MarkerColor,
    /// Popup HTML-escaped by the renderer; plain text here.
    pub popup_title: String,
    pub popup_lines: Vec<String>,
}

impl MapMarker {
    fn for_shop(shop: &Business) -> Self {
        Self {
            id: Some(shop.id.clone()),
            location: shop.location,
            color: MarkerColor::from(shop.tax_status),
            popup_title: shop.shop_name.clone(),
            popup_lines: vec![
                shop.owner_name.clone(),
                shop.address.clone(),
                format!("Tax: {}", shop.tax_status.label()),
            ],
        }
    }

    fn for_selection(location: LatLng) -> Self {
        Self {
            id: None,
            location,
            color: MarkerColor::Blue,
            popup_title: "Selected location".to_string(),
            popup_lines: vec![location.display_6dp()],
        }
    }
}

/// Everything the browser bootstrap script needs, serialized into the
/// page once the view has mounted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapBootstrap {
    pub tile_url: String,
    pub attribution: String,
    pub center: LatLng,
    pub zoom: u8,
    pub markers: Vec<MapMarker>,
    pub selection: Option<LatLng>,
    pub selection_mode: bool,
    pub show_current_location: bool,
}

/// The map view model.
///
/// Starts unmounted: rendering before [`mount`](Self::mount) yields a
/// fixed-height placeholder instead of a bootstrap, so layout never
/// shifts while the page hydrates.
#[derive(Debug, Clone)]
pub struct MapView {
    tile_url: String,
    attribution: String,
    center: LatLng,
    zoom: u8,
    height: String,
    selection_mode: bool,
    show_current_location: bool,
    mounted: bool,
    shops: Vec<Business>,
    selection: Option<LatLng>,
}

impl MapView {
    #[must_use]
    pub fn new(tile_url: impl Into<String>, attribution: impl Into<String>, center: LatLng) -> Self {
        Self {
            tile_url: tile_url.into(),
            attribution: attribution.into(),
            center,
            zoom: DEFAULT_ZOOM,
            height: DEFAULT_HEIGHT.to_string(),
            selection_mode: false,
            show_current_location: false,
            mounted: false,
            shops: Vec::new(),
            selection: None,
        }
    }

    #[must_use]
    pub fn with_zoom(mut self, zoom: u8) -> Self {
        self.zoom = zoom;
        self
    }

    #[must_use]
    pub fn with_height(mut self, height: impl Into<String>) -> Self {
        self.height = height.into();
        self
    }

    /// Clicking the map drops a selection pin instead of opening popups.
    #[must_use]
    pub fn selection_mode(mut self) -> Self {
        self.selection_mode = true;
        self
    }

    #[must_use]
    pub fn with_current_location(mut self) -> Self {
        self.show_current_location = true;
        self
    }

    /// Mark the view as mounted in a live document. Idempotent.
    pub fn mount(&mut self) {
        self.mounted = true;
    }

    #[must_use]
    pub const fn is_mounted(&self) -> bool {
        self.mounted
    }

    #[must_use]
    pub const fn is_selection_mode(&self) -> bool {
        self.selection_mode
    }

    #[must_use]
    pub fn height(&self) -> &str {
        &self.height
    }

    #[must_use]
    pub const fn center(&self) -> LatLng {
        self.center
    }

    #[must_use]
    pub const fn selection(&self) -> Option<LatLng> {
        self.selection
    }

    /// Replace the shop set. Markers are rebuilt wholesale; there is no
    /// incremental diffing.
    pub fn set_shops(&mut self, shops: Vec<Business>) {
        self.shops = shops;
    }

    /// Drop the selection pin at `location`. Re-selecting the same point
    /// is a no-op; selecting elsewhere moves the single pin. Returns
    /// whether the selection changed.
    pub fn select(&mut self, location: LatLng) -> bool {
        if self.selection == Some(location) {
            return false;
        }
        self.selection = Some(location);
        self.center = location;
        true
    }

    /// Clear the selection pin.
    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Recenter after a successful geolocation fix.
    pub fn recenter(&mut self, location: LatLng, zoom: u8) {
        self.center = location;
        self.zoom = zoom;
    }

    /// Bootstrap payload, or `None` while unmounted (render the
    /// placeholder instead).
    #[must_use]
    pub fn bootstrap(&self) -> Option<MapBootstrap> {
        if !self.mounted {
            return None;
        }
        let mut markers: Vec<MapMarker> = self.shops.iter().map(MapMarker::for_shop).collect();
        if let Some(selection) = self.selection {
            markers.push(MapMarker::for_selection(selection));
        }
        Some(MapBootstrap {
            tile_url: self.tile_url.clone(),
            attribution: self.attribution.clone(),
            center: self.center,
            zoom: self.zoom,
            markers,
            selection: self.selection,
            selection_mode: self.selection_mode,
            show_current_location: self.show_current_location,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shoptax_core::IdentityId;

    fn shop(id: &str, status: TaxStatus, lat: f64, lng: f64) -> Business {
        Business {
            id: BusinessId::new(id),
            shop_name: format!("Shop {id}"),
            owner_name: "Owner".to_string(),
            contact_number: "+92 300 0000000".to_string(),
            owning_identity_id: IdentityId::new("owner-1"),
            address: "Main Street".to_string(),
            location: LatLng::new(lat, lng).unwrap(),
            tax_status: status,
            image_url: None,
            challan_amount: None,
            challan_image_url: None,
            registered_by: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn view() -> MapView {
        MapView::new(
            "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
            "&copy; OpenStreetMap contributors",
            LatLng::new(30.3753, 69.3451).unwrap(),
        )
    }

    #[test]
    fn test_unmounted_view_has_no_bootstrap() {
        let mut map = view();
        map.set_shops(vec![shop("s1", TaxStatus::Paid, 24.8607, 67.0011)]);
        assert!(map.bootstrap().is_none());
        assert_eq!(map.height(), "400px");
    }

    #[test]
    fn test_marker_color_follows_tax_status() {
        let mut map = view();
        map.mount();
        map.set_shops(vec![
            shop("paid", TaxStatus::Paid, 24.8607, 67.0011),
            shop("unpaid", TaxStatus::Unpaid, 31.5204, 74.3587),
        ]);
        let bootstrap = map.bootstrap().unwrap();
        assert_eq!(bootstrap.markers[0].color, MarkerColor::Green);
        assert_eq!(bootstrap.markers[1].color, MarkerColor::Red);
        assert!(
            bootstrap.markers[1]
                .popup_lines
                .contains(&"Tax: Unpaid".to_string())
        );
    }

    #[test]
    fn test_set_shops_rebuilds_markers_wholesale() {
        let mut map = view();
        map.mount();
        map.set_shops(vec![shop("s1", TaxStatus::Paid, 24.8607, 67.0011)]);
        assert_eq!(map.bootstrap().unwrap().markers.len(), 1);

        map.set_shops(vec![
            shop("s2", TaxStatus::Unpaid, 31.5204, 74.3587),
            shop("s3", TaxStatus::Unpaid, 33.6844, 73.0479),
        ]);
        let markers = map.bootstrap().unwrap().markers;
        assert_eq!(markers.len(), 2);
        assert!(markers.iter().all(|m| m.id.as_ref().unwrap().as_str() != "s1"));
    }

    #[test]
    fn test_select_is_idempotent_and_keeps_single_pin() {
        let mut map = view().selection_mode();
        map.mount();
        let first = LatLng::new(24.8607, 67.0011).unwrap();
        let second = LatLng::new(31.5204, 74.3587).unwrap();

        assert!(map.select(first));
        assert!(!map.select(first));
        assert!(map.select(second));

        let bootstrap = map.bootstrap().unwrap();
        let pins: Vec<_> = bootstrap
            .markers
            .iter()
            .filter(|m| m.color == MarkerColor::Blue)
            .collect();
        assert_eq!(pins.len(), 1);
        assert_eq!(pins[0].location, second);
        assert_eq!(bootstrap.selection, Some(second));
    }

    #[test]
    fn test_selection_popup_carries_six_decimal_coordinates() {
        let mut map = view().selection_mode();
        map.mount();
        map.select(LatLng::new(24.860_735_1, 67.001_136_9).unwrap());
        let bootstrap = map.bootstrap().unwrap();
        let pin = bootstrap.markers.last().unwrap();
        assert_eq!(pin.popup_lines[0], "24.860735, 67.001137");
    }
}
