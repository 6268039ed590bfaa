//! Store map presentation
//!
//! [`MapView`] decides which markers exist, how they look and where the
//! viewport goes. Drawing is left to a [`MapSurface`] implementation.

use std::collections::HashMap;

use ottica_storefront_core::{LatLng, MapConfig, Store, StoreId};
use tracing::debug;

/// Zoom level used when focusing a single store
pub const SELECTED_ZOOM: u8 = 15;

/// Fraction of the marker bounds added on each side when fitting the view
pub const BOUNDS_PADDING: f64 = 0.1;

const DIRECTIONS_URL: &str = "https://www.google.com/maps/dir/?api=1&destination=";

/// Marker appearance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerIcon {
    /// Width and height in pixels
    pub size: (f64, f64),
    /// Point of the icon placed on the coordinate
    pub anchor: (f64, f64),
    pub color: &'static str,
}

impl MarkerIcon {
    pub const DEFAULT: MarkerIcon = MarkerIcon {
        size: (30.0, 30.0),
        anchor: (15.0, 30.0),
        color: "#dc2626",
    };

    pub const SELECTED: MarkerIcon = MarkerIcon {
        size: (35.0, 35.0),
        anchor: (17.5, 35.0),
        color: "#2563eb",
    };

    fn for_selection(selected: bool) -> Self {
        if selected {
            Self::SELECTED
        } else {
            Self::DEFAULT
        }
    }
}

/// Content of the popup attached to a store marker
#[derive(Debug, Clone, PartialEq)]
pub struct StorePopup {
    pub name: String,
    pub address: String,
    pub optician_name: Option<String>,
    pub phone: Option<String>,
    pub directions_url: String,
}

impl StorePopup {
    /// Returns `None` for stores without coordinates.
    pub fn for_store(store: &Store) -> Option<Self> {
        let (lat, lng) = (store.latitude?, store.longitude?);
        Some(Self {
            name: store.name.clone(),
            address: store.address.clone(),
            optician_name: store.optician_name.clone(),
            phone: store.phone.clone(),
            directions_url: format!("{}{},{}", DIRECTIONS_URL, lat, lng),
        })
    }
}

/// Rectangular geographic area
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    pub fn from_points(points: impl IntoIterator<Item = LatLng>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut bounds = Self {
            south_west: first,
            north_east: first,
        };
        for p in points {
            bounds.south_west.lat = bounds.south_west.lat.min(p.lat);
            bounds.south_west.lng = bounds.south_west.lng.min(p.lng);
            bounds.north_east.lat = bounds.north_east.lat.max(p.lat);
            bounds.north_east.lng = bounds.north_east.lng.max(p.lng);
        }
        Some(bounds)
    }

    /// Grow the bounds by `ratio` of their height and width on every side.
    pub fn pad(self, ratio: f64) -> Self {
        let lat_buffer = (self.north_east.lat - self.south_west.lat).abs() * ratio;
        let lng_buffer = (self.north_east.lng - self.south_west.lng).abs() * ratio;
        Self {
            south_west: LatLng {
                lat: self.south_west.lat - lat_buffer,
                lng: self.south_west.lng - lng_buffer,
            },
            north_east: LatLng {
                lat: self.north_east.lat + lat_buffer,
                lng: self.north_east.lng + lng_buffer,
            },
        }
    }
}

/// Rendering backend for the store map
pub trait MapSurface {
    fn set_view(&mut self, center: LatLng, zoom: u8);

    fn add_marker(&mut self, id: StoreId, position: LatLng, icon: MarkerIcon, popup: StorePopup);

    fn remove_marker(&mut self, id: StoreId);

    fn set_marker_icon(&mut self, id: StoreId, icon: MarkerIcon);

    fn fit_bounds(&mut self, bounds: LatLngBounds);

    fn open_popup(&mut self, id: StoreId);
}

struct Marker {
    position: LatLng,
    store: Store,
}

/// Markers and viewport for a set of stores
pub struct MapView<S: MapSurface> {
    surface: S,
    markers: HashMap<StoreId, Marker>,
    /// Marker ids in insertion order
    order: Vec<StoreId>,
    selected: Option<StoreId>,
}

impl<S: MapSurface> MapView<S> {
    pub fn new(mut surface: S, config: Option<MapConfig>) -> Self {
        let config = config.unwrap_or_default();
        surface.set_view(config.center, config.zoom);
        Self {
            surface,
            markers: HashMap::new(),
            order: Vec::new(),
            selected: None,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn selected(&self) -> Option<StoreId> {
        self.selected
    }

    pub fn marker_count(&self) -> usize {
        self.order.len()
    }

    /// Replace all markers. Stores without both coordinates get no marker;
    /// a repeated store id keeps its first marker.
    pub fn set_stores(&mut self, stores: &[Store]) {
        for id in self.order.drain(..) {
            self.surface.remove_marker(id);
        }
        self.markers.clear();

        for store in stores {
            if self.markers.contains_key(&store.id) {
                debug!(store_id = store.id, "duplicate store id");
                continue;
            }
            let (Some(position), Some(popup)) = (store.position(), StorePopup::for_store(store))
            else {
                debug!(store_id = store.id, "store without coordinates");
                continue;
            };
            let icon = MarkerIcon::for_selection(self.selected == Some(store.id));
            self.surface.add_marker(store.id, position, icon, popup);
            self.order.push(store.id);
            self.markers.insert(
                store.id,
                Marker {
                    position,
                    store: store.clone(),
                },
            );
        }

        let positions = self.order.iter().filter_map(|id| self.markers.get(id));
        if let Some(bounds) = LatLngBounds::from_points(positions.map(|m| m.position)) {
            self.surface.fit_bounds(bounds.pad(BOUNDS_PADDING));
        }
    }

    /// Highlight a store and focus the view on it. `None` only resets icons.
    pub fn set_selected(&mut self, selected: Option<StoreId>) {
        if self.selected == selected {
            return;
        }
        self.selected = selected;

        for id in &self.order {
            let icon = MarkerIcon::for_selection(selected == Some(*id));
            self.surface.set_marker_icon(*id, icon);
        }

        if let Some(marker) = selected.and_then(|id| self.markers.get(&id)) {
            self.surface.set_view(marker.position, SELECTED_ZOOM);
            self.surface.open_popup(marker.store.id);
        }
    }

    /// Store behind a clicked marker. Selection stays with the caller.
    pub fn handle_marker_click(&self, id: StoreId) -> Option<&Store> {
        self.markers.get(&id).map(|m| &m.store)
    }
}
