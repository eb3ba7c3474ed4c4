pub mod ai;
pub mod config;
pub mod db;
pub mod export;
pub mod leads;
pub mod routes;
pub mod views;

use ai::DynMessageGenerator;
use config::Config;
use leads::DynLeadStore;

/// Shared handler state: the store, the generator and the loaded config.
#[derive(Clone)]
pub struct AppState {
    pub store: DynLeadStore,
    pub generator: DynMessageGenerator,
    pub config: Config,
}
