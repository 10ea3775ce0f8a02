pub mod board;
pub mod cli;
pub mod config;
pub mod error;
pub mod event;
pub mod model;
pub mod oplog;
pub mod service;
pub mod store;
pub mod webhook;

pub use config::Config;
pub use error::TaskError;
pub use service::TaskService;
pub use store::TaskStore;
