use crate::config::Settings;
use crate::storage::TableStore;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TableStore>,
    pub settings: Arc<Settings>,
    /// Held for a whole load/mutate/persist cycle so cycles never overlap.
    pub cycle: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(store: Arc<dyn TableStore>, settings: Settings) -> Self {
        Self {
            store,
            settings: Arc::new(settings),
            cycle: Arc::new(Mutex::new(())),
        }
    }
}
