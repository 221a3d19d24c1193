//! Room presence: the live roster of who is viewing/editing each room.

mod presence;

pub use presence::PresenceRegistry;
