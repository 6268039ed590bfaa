use ottica_storefront::prelude::*;
use ottica_storefront::stores::{LatLngBounds, MarkerIcon, StorePopup};
use ottica_storefront_core::{LatLng, MapConfig, StoreId};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn setup_storefront(server: &MockServer) -> Storefront {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let options = ClientOptions::default().with_api_url(&format!("{}/api/v1", server.uri()));
    Storefront::new(options).unwrap()
}

fn stores_json() -> Value {
    json!([
        {
            "id": 1,
            "name": "Ottica Censuales Centro",
            "address": "Via Maqueda 100, Palermo",
            "latitude": "38.115700",
            "longitude": "13.361300",
            "optician_name": "Giuseppe Censuales",
            "phone": "091 111111"
        },
        {
            "id": 2,
            "name": "Ottica Censuales Mondello",
            "address": "Viale Regina Elena 5, Palermo",
            "latitude": null,
            "longitude": null
        }
    ])
}

#[derive(Default)]
struct Canvas {
    markers: Vec<StoreId>,
    popups_opened: Vec<StoreId>,
    view: Option<(LatLng, u8)>,
}

impl MapSurface for Canvas {
    fn set_view(&mut self, center: LatLng, zoom: u8) {
        self.view = Some((center, zoom));
    }

    fn add_marker(&mut self, id: StoreId, _: LatLng, _: MarkerIcon, _: StorePopup) {
        self.markers.push(id);
    }

    fn remove_marker(&mut self, id: StoreId) {
        self.markers.retain(|m| *m != id);
    }

    fn set_marker_icon(&mut self, _: StoreId, _: MarkerIcon) {}

    fn fit_bounds(&mut self, _: LatLngBounds) {}

    fn open_popup(&mut self, id: StoreId) {
        self.popups_opened.push(id);
    }
}

#[tokio::test]
async fn test_load_uses_server_map_config() {
    let server = MockServer::start().await;
    let storefront = setup_storefront(&server);

    Mock::given(method("GET"))
        .and(path("/api/v1/stores/map-data/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "stores": [],
            "map_config": { "center": { "lat": 38.2, "lng": 13.3 }, "zoom": 11 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/stores/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 2,
            "results": stores_json()
        })))
        .expect(1)
        .mount(&server)
        .await;

    let stores = storefront.locator().load().await.unwrap();
    assert_eq!(stores.len(), 2);

    let state = storefront.locator().state();
    assert_eq!(state.map_config.zoom, 11);
    assert_eq!(state.stores.data.len(), 2);
    assert!(!state.stores.loading);
}

#[tokio::test]
async fn test_fetch_stores_failure() {
    let server = MockServer::start().await;
    let storefront = setup_storefront(&server);

    Mock::given(method("GET"))
        .and(path("/api/v1/stores/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    storefront.locator().fetch_stores().await.unwrap_err();
    let state = storefront.locator().state();
    assert_eq!(
        state.stores.error.as_deref(),
        Some("Errore nel caricamento dei negozi")
    );
    assert_eq!(state.map_config, MapConfig::default());
}

#[tokio::test]
async fn test_selection_drives_map_view() {
    let server = MockServer::start().await;
    let storefront = setup_storefront(&server);
    let locator = storefront.locator();

    Mock::given(method("GET"))
        .and(path("/api/v1/stores/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stores_json()))
        .mount(&server)
        .await;

    let stores = locator.fetch_stores().await.unwrap();
    let mut view = MapView::new(Canvas::default(), Some(locator.state().map_config));
    view.set_stores(&stores);
    assert_eq!(view.surface().markers, vec![1]);

    let clicked = view.handle_marker_click(1).map(|s| s.id);
    locator.select_store(clicked);
    view.set_selected(locator.state().selected);

    assert_eq!(locator.selected_store().map(|s| s.name).as_deref(), Some("Ottica Censuales Centro"));
    assert_eq!(view.surface().popups_opened, vec![1]);
    assert_eq!(view.surface().view.map(|(_, zoom)| zoom), Some(15));

    // A store without coordinates can be selected from the list but has no
    // marker to focus.
    locator.select_store(Some(2));
    view.set_selected(Some(2));
    assert_eq!(view.surface().popups_opened, vec![1]);
}
