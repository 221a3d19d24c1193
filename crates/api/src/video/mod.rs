//! Video call membership, tracked separately from room presence.

mod registry;

pub use registry::VideoRegistry;
