pub mod app;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod handlers;
pub mod logger;
pub mod models;
pub mod state;
pub mod storage;
pub mod timers;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::{ActivityCache, FileActivityCache};
