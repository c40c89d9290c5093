pub mod analytics;
pub mod api;
pub mod calendar;
pub mod config;
pub mod error;
pub mod forms;
pub mod pages;
pub mod render;
pub mod session;

pub use api::ApiClient;
pub use error::{ClientError, Result};
pub use session::{Session, SessionStore};
