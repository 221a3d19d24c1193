//! Row models.
//!
//! Each submodule contains a `FromRow` entity struct matching the database
//! row. DTOs are not needed here: writes go through targeted repository
//! methods rather than generic create/update patches.

pub mod canvas_session;
pub mod user;
