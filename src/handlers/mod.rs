//! Command Handlers module
//!
//! Handlers that orchestrate release operations on behalf of the admin API.

mod commands;
mod create_release_handler;
mod generate_release_handler;
mod update_release_handler;


pub use commands::*;
pub use create_release_handler::CreateReleaseHandler;
pub use generate_release_handler::GenerateReleaseHandler;
pub use update_release_handler::UpdateReleaseHandler;
