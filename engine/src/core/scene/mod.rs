//! Scene model for tour authoring
//!
//! States are entities carrying a [`Name`] (the state title), a [`Transform`],
//! a [`Panorama`] and their outgoing [`Connections`]. The exporter never reads
//! the world directly; it works on [`SceneState`] snapshots.

pub mod components;
pub mod graph;
pub mod snapshot;

pub use components::{Connection, Connections, Name, Panorama, PanoramaSource, Transform};
pub use graph::{ConnectionChange, SceneGraphError, TourScene};
pub use snapshot::{SceneConnection, SceneState};

// Re-export hecs types that users will need
pub use hecs::Entity;
