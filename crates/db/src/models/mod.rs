//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` + `Validate` submission DTOs for inserts
//! - Plain structs describing the column values a write touches

pub mod application;
pub mod case;
pub mod event;
pub mod registry;
pub mod treasury;
