//! Changelog Service Library
//!
//! Change event log, release generation and the public changelog.
//! Re-exports modules for integration testing and the server binary.

pub mod api;
pub mod clock;
pub mod config;
pub mod db;
pub mod domain;
pub mod event_store;
pub mod handlers;
pub mod jobs;
pub mod producers;
pub mod release;
pub mod store;

mod error;

pub use config::{Config, Settings, TrackingSettings};
pub use domain::{DomainError, Event, NewEvent, OperationContext, Release, Section, Sections};
pub use error::{AppError, AppResult, ErrorResponse};
