//! Store locator

mod map;

use std::sync::Arc;

use ottica_storefront_core::{MapConfig, MapData, Paginated, Reducer, Resource, Store, StoreId};
use ottica_storefront_gateway::Gateway;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::Error;
use crate::store::StateStore;

pub use map::{
    LatLngBounds, MapSurface, MapView, MarkerIcon, StorePopup, BOUNDS_PADDING, SELECTED_ZOOM,
};

const STORES_PATH: &str = "/stores/";
const MAP_DATA_PATH: &str = "/stores/map-data/";
const LOAD_ERROR: &str = "Errore nel caricamento dei negozi";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocatorState {
    pub stores: Resource<Vec<Store>>,
    pub map_config: MapConfig,
    pub selected: Option<StoreId>,
}

impl LocatorState {
    pub fn selected_store(&self) -> Option<&Store> {
        let id = self.selected?;
        self.stores.data.iter().find(|s| s.id == id)
    }
}

#[derive(Debug, Clone)]
pub enum LocatorAction {
    StoresRequested,
    StoresLoaded(Vec<Store>),
    MapConfigLoaded(MapConfig),
    StoresFailed(String),
    Select(Option<StoreId>),
}

impl Reducer for LocatorState {
    type Action = LocatorAction;

    fn reduce(&mut self, action: LocatorAction) {
        match action {
            LocatorAction::StoresRequested => self.stores.start(),
            LocatorAction::StoresLoaded(stores) => self.stores.resolve(stores),
            LocatorAction::MapConfigLoaded(config) => self.map_config = config,
            LocatorAction::StoresFailed(message) => self.stores.reject(message),
            LocatorAction::Select(id) => self.selected = id,
        }
    }
}

/// Loads the shop list and map viewport and tracks the selected shop
pub struct StoreLocator {
    gateway: Arc<Gateway>,
    state: StateStore<LocatorState>,
}

impl StoreLocator {
    pub fn new(gateway: Arc<Gateway>, map_config: MapConfig) -> Self {
        Self {
            gateway,
            state: StateStore::new(LocatorState {
                map_config,
                ..Default::default()
            }),
        }
    }

    pub fn state(&self) -> LocatorState {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<LocatorState> {
        self.state.subscribe()
    }

    /// `GET /stores/`, paginated or bare list
    pub async fn fetch_stores(&self) -> Result<Vec<Store>, Error> {
        self.state.dispatch(LocatorAction::StoresRequested);

        match self.gateway.get::<Paginated<Store>>(STORES_PATH, &[]).await {
            Ok(page) => {
                let stores = page.into_items();
                debug!(count = stores.len(), "stores loaded");
                self.state
                    .dispatch(LocatorAction::StoresLoaded(stores.clone()));
                Ok(stores)
            }
            Err(err) => {
                warn!(error = %err, "{}", LOAD_ERROR);
                self.state
                    .dispatch(LocatorAction::StoresFailed(err.describe(LOAD_ERROR)));
                Err(err.into())
            }
        }
    }

    /// `GET /stores/map-data/`: map markers plus the initial viewport
    pub async fn fetch_map_data(&self) -> Result<MapData, Error> {
        self.state.dispatch(LocatorAction::StoresRequested);

        match self.gateway.get::<MapData>(MAP_DATA_PATH, &[]).await {
            Ok(data) => {
                self.state
                    .dispatch(LocatorAction::MapConfigLoaded(data.map_config));
                self.state
                    .dispatch(LocatorAction::StoresLoaded(data.stores.clone()));
                Ok(data)
            }
            Err(err) => {
                warn!(error = %err, "map data failed");
                self.state
                    .dispatch(LocatorAction::StoresFailed(err.describe(LOAD_ERROR)));
                Err(err.into())
            }
        }
    }

    /// Map viewport then the full store list, as the locator page does on
    /// entry.
    pub async fn load(&self) -> Result<Vec<Store>, Error> {
        self.fetch_map_data().await?;
        self.fetch_stores().await
    }

    pub fn select_store(&self, id: Option<StoreId>) {
        self.state.dispatch(LocatorAction::Select(id));
    }

    pub fn selected_store(&self) -> Option<Store> {
        self.state.read(|s| s.selected_store().cloned())
    }
}

impl std::fmt::Debug for StoreLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreLocator")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
