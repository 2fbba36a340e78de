//! HTTP service exposing row operations on a single worksheet.
//!
//! Requests pass the access gate and parameter validation before any
//! worksheet is opened.
pub mod config;
pub mod envelope;
pub mod errors;
pub mod gate;
pub mod handlers;
pub mod params;
pub mod server;

pub use config::ServiceConfig;
pub use errors::{ServiceError, ServiceResult};
pub use server::{ServerState, SheetsProxyServer, router};
