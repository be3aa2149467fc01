pub mod client;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod reports;
pub mod store;
pub mod util;

pub use client::{App, Client, Remote};
pub use config::ClientConfig;
pub use error::FinanceError;
