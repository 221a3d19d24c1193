//! Core domain types for the Easel collaborative whiteboard.
//!
//! Everything here is transport- and storage-agnostic: the drawing
//! vocabulary ([`canvas`]), resolved identities and room rosters
//! ([`identity`]), the WebSocket wire protocol ([`protocol`]), and the
//! shared error taxonomy ([`error`]).

pub mod canvas;
pub mod error;
pub mod identity;
pub mod protocol;
pub mod types;
