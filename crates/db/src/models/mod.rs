//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `Serialize` entity struct in the camelCase API shape, with a
//!   [`MapRow`](crate::mappers::MapRow) implementation
//! - A `Deserialize` DTO for inserts
//! - A `Deserialize` update DTO (`Option`/`Patch` fields) for partial updates
//! - A list filter and, where the entity is sortable, a sort-key enum

pub mod client;
pub mod donation;
pub mod donation_campaign;
pub mod event;
pub mod event_attendance;
pub mod household;
pub mod milestone;
pub mod ministry;
pub mod ministry_delegation;
pub mod person;
pub mod record;
