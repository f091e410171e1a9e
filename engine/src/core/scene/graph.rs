//! Tour scene: states and their connections stored in a hecs world

use super::components::{Connection, Connections, Name, Panorama, PanoramaSource, Transform};
use super::snapshot::{SceneConnection, SceneState};
use crate::core::math;
use glam::{Quat, Vec3};
use hecs::Entity;
use tracing::{debug, info};

/// Errors from editing the scene graph
#[derive(Debug, thiserror::Error)]
pub enum SceneGraphError {
    #[error("State {0:?} does not exist in the scene")]
    NoSuchState(Entity),

    #[error("A state cannot be connected to itself")]
    SelfConnection,
}

/// What [`TourScene::toggle_connection`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionChange {
    Created,
    Removed,
}

/// Wrapper around hecs::World holding the tour states
///
/// States are enumerated in creation order, which is the order ids are
/// assigned in on export. Keeping ids stable across exports is therefore a
/// matter of creating states in a stable order.
pub struct TourScene {
    inner: hecs::World,
    order: Vec<Entity>,
}

impl Default for TourScene {
    fn default() -> Self {
        Self::new()
    }
}

impl TourScene {
    /// Create a new empty scene
    pub fn new() -> Self {
        Self {
            inner: hecs::World::new(),
            order: Vec::new(),
        }
    }

    /// Spawn a new state at `position`
    pub fn spawn_state(
        &mut self,
        title: impl Into<String>,
        position: Vec3,
        panorama: PanoramaSource,
    ) -> Entity {
        let name = Name::new(title);
        debug!(title = %name.0, position = ?position, "Spawning state");
        let entity = self.inner.spawn((
            name,
            Transform::from_position(position),
            Panorama(panorama),
            Connections::default(),
        ));
        self.order.push(entity);
        entity
    }

    /// Despawn a state
    ///
    /// Connections on other states pointing at it are left in place.
    pub fn remove_state(&mut self, entity: Entity) -> Result<(), SceneGraphError> {
        self.inner
            .despawn(entity)
            .map_err(|_| SceneGraphError::NoSuchState(entity))?;
        self.order.retain(|&e| e != entity);
        debug!(entity = ?entity, "Removed state");
        Ok(())
    }

    /// Check if a state exists
    pub fn contains(&self, entity: Entity) -> bool {
        self.inner.contains(entity)
    }

    /// Number of states in the scene
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// States in creation order
    pub fn states(&self) -> impl Iterator<Item = Entity> + '_ {
        self.order.iter().copied()
    }

    /// First state carrying `title`
    pub fn find_by_title(&self, title: &str) -> Option<Entity> {
        self.states()
            .find(|&e| self.title(e).is_some_and(|t| t == title))
    }

    pub fn title(&self, entity: Entity) -> Option<String> {
        self.inner.get::<&Name>(entity).ok().map(|name| name.0.clone())
    }

    pub fn transform(&self, entity: Entity) -> Option<Transform> {
        self.inner.get::<&Transform>(entity).ok().map(|t| *t)
    }

    pub fn set_title(&mut self, entity: Entity, title: impl Into<String>) -> Result<(), SceneGraphError> {
        let name = self.component_mut::<Name>(entity)?;
        name.0 = title.into();
        Ok(())
    }

    pub fn set_position(&mut self, entity: Entity, position: Vec3) -> Result<(), SceneGraphError> {
        self.component_mut::<Transform>(entity)?.position = position;
        Ok(())
    }

    pub fn set_rotation(&mut self, entity: Entity, rotation: Quat) -> Result<(), SceneGraphError> {
        self.component_mut::<Transform>(entity)?.rotation = rotation;
        Ok(())
    }

    pub fn set_panorama(
        &mut self,
        entity: Entity,
        panorama: PanoramaSource,
    ) -> Result<(), SceneGraphError> {
        self.component_mut::<Panorama>(entity)?.0 = panorama;
        Ok(())
    }

    /// Outgoing connections of a state
    pub fn connections(&self, entity: Entity) -> Vec<Connection> {
        self.inner
            .get::<&Connections>(entity)
            .map(|c| c.0.clone())
            .unwrap_or_default()
    }

    /// Connect two states in both directions, or disconnect them if already linked
    ///
    /// New connections point from each state towards the other one's position.
    pub fn toggle_connection(
        &mut self,
        first: Entity,
        second: Entity,
    ) -> Result<ConnectionChange, SceneGraphError> {
        if first == second {
            return Err(SceneGraphError::SelfConnection);
        }

        let first_position = self
            .transform(first)
            .ok_or(SceneGraphError::NoSuchState(first))?
            .position;
        let second_position = self
            .transform(second)
            .ok_or(SceneGraphError::NoSuchState(second))?
            .position;

        let linked = self.connection_exists(first, second) || self.connection_exists(second, first);

        if linked {
            self.component_mut::<Connections>(first)?.remove_to(second);
            self.component_mut::<Connections>(second)?.remove_to(first);
            debug!(first = ?first, second = ?second, "Removed connection");
            return Ok(ConnectionChange::Removed);
        }

        let towards_second = second_position - first_position;
        self.component_mut::<Connections>(first)?.0.push(Connection {
            destination: second,
            orientation: math::orientation_towards(towards_second),
        });
        self.component_mut::<Connections>(second)?.0.push(Connection {
            destination: first,
            orientation: math::orientation_towards(-towards_second),
        });
        debug!(first = ?first, second = ?second, "Created connection");
        Ok(ConnectionChange::Created)
    }

    /// Snapshot of one state with connection destinations resolved to titles
    pub fn snapshot(&self, entity: Entity) -> Option<SceneState> {
        let title = self.title(entity)?;
        let transform = self.transform(entity)?;
        let panorama = self.inner.get::<&Panorama>(entity).ok()?.0.clone();

        let connections = self
            .connections(entity)
            .into_iter()
            .map(|connection| SceneConnection {
                destination: self.title(connection.destination),
                orientation: connection.orientation,
            })
            .collect();

        Some(SceneState {
            title,
            rotation: transform.rotation,
            panorama,
            connections,
        })
    }

    /// Snapshots of all states in creation order
    pub fn collect_states(&self) -> Vec<SceneState> {
        let states: Vec<SceneState> = self.states().filter_map(|e| self.snapshot(e)).collect();
        info!(state_count = states.len(), "Collected scene states");
        states
    }

    fn connection_exists(&self, from: Entity, to: Entity) -> bool {
        self.inner
            .get::<&Connections>(from)
            .map(|c| c.to(to).is_some())
            .unwrap_or(false)
    }

    fn component_mut<T: hecs::Component>(
        &mut self,
        entity: Entity,
    ) -> Result<&mut T, SceneGraphError> {
        self.inner
            .query_one_mut::<&mut T>(entity)
            .map_err(|_| SceneGraphError::NoSuchState(entity))
    }
}
