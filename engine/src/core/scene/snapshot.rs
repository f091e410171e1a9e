//! Plain-data view of scene states handed to the exporter

use super::components::PanoramaSource;
use crate::core::math;
use glam::{Quat, Vec3};

/// One state as the exporter sees it
#[derive(Debug, Clone, PartialEq)]
pub struct SceneState {
    pub title: String,
    /// World rotation of the state
    pub rotation: Quat,
    pub panorama: PanoramaSource,
    /// Outgoing connections in the order they were created
    pub connections: Vec<SceneConnection>,
}

/// One outgoing connection of a [`SceneState`]
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConnection {
    /// Title of the destination state, `None` if the destination is gone
    pub destination: Option<String>,
    pub orientation: Quat,
}

impl SceneState {
    pub fn new(title: impl Into<String>, panorama: PanoramaSource) -> Self {
        Self {
            title: title.into(),
            rotation: Quat::IDENTITY,
            panorama,
            connections: Vec::new(),
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_euler_degrees(self, degrees: Vec3) -> Self {
        self.with_rotation(math::from_euler_degrees(degrees))
    }

    /// Add a connection towards `destination` whose hotspot points along `direction`
    pub fn with_link(mut self, destination: impl Into<String>, direction: Vec3) -> Self {
        self.connections.push(SceneConnection {
            destination: Some(destination.into()),
            orientation: math::orientation_towards(direction),
        });
        self
    }

    pub fn with_connection(mut self, connection: SceneConnection) -> Self {
        self.connections.push(connection);
        self
    }
}
