//! Domain module
//!
//! Core domain types: change events, releases and their sections.

pub mod context;
pub mod error;
pub mod event;
pub mod release;
pub mod section;

pub use context::OperationContext;
pub use error::DomainError;
pub use event::{Event, NewEvent};
pub use release::{LabelType, NewRelease, Release, ReleaseOptions, ReleaseQuery, ReleaseUpdate};
pub use section::{Section, SectionItem, Sections};
