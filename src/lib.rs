pub mod app;
pub mod config;
pub mod errors;
pub mod gate;
pub mod handlers;
pub mod intake;
pub mod loader;
pub mod models;
pub mod stats;
pub mod storage;
pub mod ui;
pub mod state;
pub mod workflow;

pub use app::router;
pub use config::Settings;
pub use state::AppState;
pub use storage::{FileStore, MemoryStore, SheetStore, TableStore};
