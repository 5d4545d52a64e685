pub mod config;
pub mod error;
pub mod kite_client;
pub mod models;

pub use error::KiteError;
pub use kite_client::{KiteClient, KiteCredentials};
