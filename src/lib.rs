pub mod api;
pub mod app;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod gateway;
pub mod handlers;
pub mod manage;
pub mod models;
pub mod navigation;
pub mod notify;
pub mod state;
pub mod storage;
pub mod ui;
pub mod view;

pub use api::TaskApi;
pub use app::router;
pub use config::ClientConfig;
pub use errors::ClientError;
pub use gateway::{ApiRequest, Gateway, Outcome};
pub use state::AppState;
pub use storage::{FileStore, MemoryStore, Session, resolve_data_path};
