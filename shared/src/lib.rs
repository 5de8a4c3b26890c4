//! Shared library for the weekly schedule event Lambda.
//!
//! A Google Sheets tab is used as a row store: the first row names the
//! columns and every later row is one event. This crate maps between that
//! grid and typed events, and serves the `/event` CRUD routes on top of it.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod mapper;
pub mod memory;
pub mod models;
pub mod range;
pub mod secrets;
pub mod sheets;
pub mod store;

pub use auth::{ServiceAccountCredentials, ServiceAccountTokenProvider, SHEETS_SCOPE};
pub use config::{Config, CredentialSource};
pub use error::{Error, Result};
pub use memory::MemoryGrid;
pub use models::{Event, EventPayload, EventRecord, Field};
pub use range::{RangeSpec, RowOffset};
pub use secrets::{get_secret, get_service_account_credentials};
pub use sheets::{GridBackend, SheetsClient};
pub use store::{Created, Deleted, EventStore, Updated};
