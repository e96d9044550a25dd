//! Domain module
//!
//! Core domain types shared by the listeners, the bus and the record store.

pub mod context;
pub mod error;
pub mod events;
pub mod models;

pub use context::OperationContext;
pub use error::DomainError;
pub use events::{DomainEvent, EventName};
pub use models::{
    Credential, CredentialKind, Post, PostChanges, PostFilter, PostStatus, User, UserChanges,
    UserStatus,
};
