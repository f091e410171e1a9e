//! Components attached to tour state entities

use crate::core::math;
use crate::utils::paths::normalize_path;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Transform component: where a state sits in the scene and how it is turned
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Transform {
    /// Position in world space
    pub position: Vec3,
    /// Rotation in world space as a quaternion
    pub rotation: Quat,
    /// Scale in world space
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Create a new transform with the given position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Replace the rotation using Euler angles in degrees
    pub fn with_euler_degrees(mut self, degrees: Vec3) -> Self {
        self.rotation = math::from_euler_degrees(degrees);
        self
    }

    /// Rotation as Euler angles in degrees, each in `[0, 360)`
    pub fn euler_degrees(&self) -> Vec3 {
        math::euler_degrees(self.rotation)
    }
}

/// Name component holding the state title
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Name(pub String);

impl Name {
    /// Create a new name component
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// Where a state's panoramic image comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PanoramaSource {
    /// Media file on disk, copied into the exported package
    File(PathBuf),
    /// Remote image the viewer downloads itself; never copied
    Remote(String),
}

impl PanoramaSource {
    /// Local file source with normalized separators
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(normalize_path(path.into()))
    }

    /// Remote URL source
    pub fn remote(url: impl Into<String>) -> Self {
        Self::Remote(url.into())
    }
}

/// Panorama component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Panorama(pub PanoramaSource);

/// A directed edge from the owning state to `destination`
///
/// `orientation` applied to [`math::FORWARD`] gives the direction the viewer
/// shows the hotspot in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    pub destination: hecs::Entity,
    pub orientation: Quat,
}

impl Connection {
    pub fn direction(&self) -> Vec3 {
        math::orientation_direction(self.orientation)
    }
}

/// All outgoing connections of a state, in creation order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Connections(pub Vec<Connection>);

impl Connections {
    /// Connection pointing at `destination`, if any
    pub fn to(&self, destination: hecs::Entity) -> Option<&Connection> {
        self.0.iter().find(|c| c.destination == destination)
    }

    /// Remove every connection pointing at `destination`, returning whether any existed
    pub fn remove_to(&mut self, destination: hecs::Entity) -> bool {
        let before = self.0.len();
        self.0.retain(|c| c.destination != destination);
        before != self.0.len()
    }
}
