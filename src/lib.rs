//! publish_listeners Library
//!
//! Model listeners for a content-publishing backend: last-seen tracking,
//! credential revocation and scheduled-post reconciliation.
//! Re-exports modules for integration testing and the service binary.

pub mod bus;
pub mod clock;
pub mod domain;
pub mod listeners;
pub mod reporting;
pub mod runtime;
pub mod store;
pub mod timezone;

pub mod config;
pub mod db;
mod error;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use domain::{DomainEvent, EventName, OperationContext, DomainError};
pub use listeners::{ListenerDeps, ListenerError};
