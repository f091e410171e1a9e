//! Tour descriptor written next to the exported media
//!
//! Field names follow the viewer's JSON schema (`firstStateId`,
//! `viewDirection`, ...), so this module owns the wire format.

use crate::core::math;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use tracing::info;

/// Errors from reading or writing a descriptor file
#[derive(Debug, thiserror::Error)]
pub enum TourFileError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Exported tour graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tour {
    /// Id of the state the viewer opens with; empty when unresolved
    #[serde(default)]
    pub first_state_id: String,
    #[serde(default)]
    pub states: Vec<ExportedState>,
}

/// One state of the exported tour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedState {
    pub id: String,
    pub title: String,
    /// Media location, relative to the descriptor for copied files
    pub url: String,
    #[serde(rename = "type", default)]
    pub kind: StateKind,
    #[serde(default)]
    pub view_direction: SphericalDirection,
    #[serde(default)]
    pub rotation: EulerRotation,
    #[serde(default)]
    pub links: Vec<ExportedLink>,
}

/// Media type of a state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateKind {
    #[default]
    Image,
}

/// Direction in spherical coordinates, radians
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SphericalDirection {
    /// Azimuth, `atan2(y, x)`
    pub f: f32,
    /// Polar angle from +Z, `acos(z)`
    pub o: f32,
}

/// Hotspot pointing at another state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedLink {
    /// Id of the destination state
    pub id: String,
    pub f: f32,
    pub o: f32,
}

/// Euler angles in degrees
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EulerRotation {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl SphericalDirection {
    /// Encode a direction; it does not need to be normalized
    pub fn from_direction(direction: Vec3) -> Self {
        let (f, o) = math::spherical_angles(direction.try_normalize().unwrap_or(math::FORWARD));
        Self { f, o }
    }

    /// Encode the direction a connection orientation points at
    pub fn from_orientation(orientation: Quat) -> Self {
        let (f, o) = math::spherical_angles(math::orientation_direction(orientation));
        Self { f, o }
    }

    /// Unit vector this direction encodes
    pub fn to_direction(self) -> Vec3 {
        let (sin_o, cos_o) = self.o.sin_cos();
        let (sin_f, cos_f) = self.f.sin_cos();
        Vec3::new(sin_o * cos_f, sin_o * sin_f, cos_o)
    }
}

impl ExportedLink {
    pub fn new(id: impl Into<String>, direction: SphericalDirection) -> Self {
        Self {
            id: id.into(),
            f: direction.f,
            o: direction.o,
        }
    }
}

impl From<Quat> for EulerRotation {
    fn from(rotation: Quat) -> Self {
        let degrees = math::euler_degrees(rotation);
        Self {
            x: degrees.x,
            y: degrees.y,
            z: degrees.z,
        }
    }
}

impl From<EulerRotation> for Vec3 {
    fn from(rotation: EulerRotation) -> Self {
        Vec3::new(rotation.x, rotation.y, rotation.z)
    }
}

impl ExportedState {
    pub fn new(id: impl Into<String>, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            url: url.into(),
            kind: StateKind::Image,
            view_direction: SphericalDirection::default(),
            rotation: EulerRotation::default(),
            links: Vec::new(),
        }
    }
}

impl Tour {
    /// Create a new empty tour
    pub fn new() -> Self {
        Self::default()
    }

    /// State with the given id
    pub fn state(&self, id: &str) -> Option<&ExportedState> {
        self.states.iter().find(|s| s.id == id)
    }

    /// Total number of links over all states
    pub fn link_count(&self) -> usize {
        self.states.iter().map(|s| s.links.len()).sum()
    }

    /// Serialize to JSON bytes, compact unless `pretty`
    pub fn to_json_bytes(&self, pretty: bool) -> Result<Vec<u8>, serde_json::Error> {
        if pretty {
            serde_json::to_vec_pretty(self)
        } else {
            serde_json::to_vec(self)
        }
    }

    /// Save this tour to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), TourFileError> {
        let path = path.as_ref();
        info!(path = ?path, "Saving tour to file");

        fs::write(path, self.to_json_bytes(false)?)?;

        info!(path = ?path, "Tour saved successfully");
        Ok(())
    }

    /// Load a tour from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, TourFileError> {
        let path = path.as_ref();
        info!(path = ?path, "Loading tour from file");

        let json = fs::read_to_string(path)?;
        let tour = serde_json::from_str(&json)?;

        info!(path = ?path, "Tour loaded successfully");
        Ok(tour)
    }
}
