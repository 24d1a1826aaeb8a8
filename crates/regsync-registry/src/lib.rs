//! Typed accessor for the identity registry REST API.
//!
//! A thin layer over [`regsync_client::ApiClient`]: each read extracts a
//! named list field from the registry's response envelope (absent response
//! or field means an empty list), each write builds the minimal
//! `RequestType`/`Version`/singleton-list envelope the registry expects.
//! Writes are fire-and-confirm; callers re-read when idempotence matters.

pub mod accessor;
pub mod error;
pub mod models;

pub use accessor::RegistryAccessor;
pub use error::{RegistryError, RegistryResult};
pub use models::{
    identifier_matches, identifier_of_type, identifier_value, CoGroup, GroupMember, Identifier,
    IdentifierType, PersonRef, UnixClusterGroup,
};
