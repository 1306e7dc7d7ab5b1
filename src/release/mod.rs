//! Release module
//!
//! Turns change events into draft releases and manages stored releases.

mod error;
mod generator;
mod repository;

pub use error::ReleaseError;
pub use generator::{default_title, group_events_by_section, ReleaseGenerator};
pub use repository::ReleaseRepository;
