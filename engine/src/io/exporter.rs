//! Tour export pipeline
//!
//! Turns an ordered list of [`SceneState`]s into a self-contained package: one
//! media file per state, named after the state's generated id, plus the tour
//! descriptor. The pipeline runs in four passes:
//!
//! 1. assign ids and copy media, reporting progress after every state
//! 2. resolve the initial state by title
//! 3. resolve connections by title and encode their directions
//! 4. write the descriptor through a temp file in the destination
//!
//! Failures in pass 1 and 4 abort the export. Media copied before a failure
//! stays on disk. Unresolved titles in pass 2 and 3 are not errors: the
//! initial state id is left empty and dangling links are dropped.

use super::id_map::StateIdMap;
use super::tour::{ExportedLink, ExportedState, EulerRotation, SphericalDirection, Tour};
use crate::config::{ConfigError, ExportConfig};
use crate::core::scene::{Entity, PanoramaSource, SceneState, TourScene};
use crate::utils::paths::media_file_name;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Errors that abort an export
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("There are no states to export")]
    NoStates,

    #[error("Failed to copy panorama of state {index} from {path:?}: {source}")]
    AssetCopy {
        index: usize,
        path: PathBuf,
        source: io::Error,
    },

    #[error("Failed to write tour descriptor {path:?}: {source}")]
    SerializationWrite { path: PathBuf, source: io::Error },

    #[error("Export cancelled after {completed} states")]
    Cancelled { completed: usize },

    #[error("Invalid export settings: {0}")]
    Config(#[from] ConfigError),
}

/// Progress notifications sent while exporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportProgress {
    /// Export began; `total` states will be processed
    Started { total: usize },
    /// The media of `completed` states is in place
    Copied { completed: usize, total: usize },
    /// The descriptor was written; the export succeeded
    Finished,
}

/// Callback receiving [`ExportProgress`] updates
///
/// Errors returned by the callback are logged and otherwise ignored.
pub type ProgressCallback = Box<
    dyn FnMut(ExportProgress) -> Result<(), Box<dyn std::error::Error + Send + Sync>> + Send,
>;

/// Exports tours with a fixed set of settings
#[derive(Default)]
pub struct TourExporter {
    config: ExportConfig,
    progress: Option<ProgressCallback>,
    cancel_flag: Option<Arc<AtomicBool>>,
}

impl TourExporter {
    pub fn new(config: ExportConfig) -> Self {
        Self {
            config,
            progress: None,
            cancel_flag: None,
        }
    }

    /// Report progress to `callback`
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Stop before the next state's media once `flag` is set
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel_flag = Some(flag);
        self
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Export `states` into `destination`
    ///
    /// State ids follow the order of `states`, so callers wanting stable ids
    /// across exports must pass states in a stable order. `initial_state` is
    /// matched by title.
    pub fn export(
        &mut self,
        states: &[SceneState],
        initial_state: &SceneState,
        destination: &Path,
    ) -> Result<Tour, ExportError> {
        self.export_states(states, Some(&initial_state.title), destination)
    }

    /// Export every state of `scene` in creation order
    pub fn export_scene(
        &mut self,
        scene: &TourScene,
        initial_state: Entity,
        destination: &Path,
    ) -> Result<Tour, ExportError> {
        let initial_title = scene.title(initial_state);
        if initial_title.is_none() {
            warn!(entity = ?initial_state, "Initial state is not part of the scene");
        }
        self.export_states(&scene.collect_states(), initial_title.as_deref(), destination)
    }

    fn export_states(
        &mut self,
        states: &[SceneState],
        initial_title: Option<&str>,
        destination: &Path,
    ) -> Result<Tour, ExportError> {
        if states.is_empty() {
            warn!("There are no states to export");
            return Err(ExportError::NoStates);
        }
        self.config.validate()?;

        let total = states.len();
        info!(state_count = total, destination = ?destination, "Exporting tour");
        self.report(ExportProgress::Started { total });

        let mut ids = StateIdMap::new();
        let mut tour = Tour::new();

        for (index, state) in states.iter().enumerate() {
            self.check_cancelled(index)?;

            let id = self.config.state_id(index);
            ids.register(&state.title, &id);

            let url = self.materialize_panorama(index, &id, &state.panorama, destination)?;
            let mut exported = ExportedState::new(id, state.title.as_str(), url);
            exported.rotation = EulerRotation::from(state.rotation);
            tour.states.push(exported);

            self.report(ExportProgress::Copied {
                completed: index + 1,
                total,
            });
        }

        tour.first_state_id = match initial_title.and_then(|title| ids.resolve(title)) {
            Some(id) => id.to_string(),
            None => {
                warn!(title = ?initial_title, "Initial state not found, first state id left empty");
                String::new()
            }
        };

        for (state, exported) in states.iter().zip(tour.states.iter_mut()) {
            exported.links = resolve_links(state, &ids);
        }

        self.write_descriptor(&tour, destination)?;
        self.report(ExportProgress::Finished);

        info!(
            state_count = tour.states.len(),
            link_count = tour.link_count(),
            first_state = %tour.first_state_id,
            "Tour exported successfully"
        );
        Ok(tour)
    }

    /// Put a state's panorama in place and return the url the viewer loads it from
    fn materialize_panorama(
        &self,
        index: usize,
        id: &str,
        panorama: &PanoramaSource,
        destination: &Path,
    ) -> Result<String, ExportError> {
        let source = match panorama {
            PanoramaSource::Remote(url) => {
                debug!(index = index, url = %url, "Panorama is remote, nothing to copy");
                return Ok(url.clone());
            }
            PanoramaSource::File(source) => source,
        };

        let url = media_file_name(id, source);
        let target = destination.join(&url);
        let copy_error = |error: io::Error| ExportError::AssetCopy {
            index,
            path: source.clone(),
            source: error,
        };

        // Copying a file onto itself truncates it
        if target.exists() && is_same_file(source, &target) {
            debug!(index = index, target = ?target, "Panorama already in place");
            return Ok(url);
        }

        if !self.config.overwrite_assets && target.exists() {
            return Err(copy_error(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", target.display()),
            )));
        }

        let bytes = fs::copy(source, &target).map_err(copy_error)?;
        debug!(index = index, source = ?source, target = ?target, bytes = bytes, "Copied panorama");
        Ok(url)
    }

    /// Write the descriptor so that a failed write never leaves a partial file
    fn write_descriptor(&self, tour: &Tour, destination: &Path) -> Result<(), ExportError> {
        let path = self.config.manifest_path(destination);
        let write_error = |source: io::Error| ExportError::SerializationWrite {
            path: path.clone(),
            source,
        };

        let bytes = tour
            .to_json_bytes(self.config.pretty_json)
            .map_err(|e| write_error(e.into()))?;

        let mut file = NamedTempFile::new_in(destination).map_err(write_error)?;
        file.write_all(&bytes).map_err(write_error)?;
        file.as_file().sync_all().map_err(write_error)?;
        file.persist(&path).map_err(|e| write_error(e.error))?;

        debug!(path = ?path, bytes = bytes.len(), "Wrote tour descriptor");
        Ok(())
    }

    fn check_cancelled(&self, completed: usize) -> Result<(), ExportError> {
        match &self.cancel_flag {
            Some(flag) if flag.load(Ordering::Relaxed) => {
                warn!(completed = completed, "Export cancelled");
                Err(ExportError::Cancelled { completed })
            }
            _ => Ok(()),
        }
    }

    fn report(&mut self, progress: ExportProgress) {
        if let Some(callback) = self.progress.as_mut() {
            if let Err(e) = callback(progress) {
                warn!(error = %e, progress = ?progress, "Progress callback failed");
            }
        }
    }
}

/// Links of one state, in connection order, skipping unresolved destinations
fn resolve_links(state: &SceneState, ids: &StateIdMap) -> Vec<ExportedLink> {
    state
        .connections
        .iter()
        .filter_map(|connection| {
            let Some(title) = connection.destination.as_deref() else {
                debug!(state = %state.title, "Dropping connection to a removed state");
                return None;
            };
            let Some(id) = ids.resolve(title) else {
                debug!(state = %state.title, destination = title, "Dropping connection to unknown state");
                return None;
            };
            Some(ExportedLink::new(
                id,
                SphericalDirection::from_orientation(connection.orientation),
            ))
        })
        .collect()
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Export `states` into `destination` with default settings
pub fn export_tour(
    states: &[SceneState],
    initial_state: &SceneState,
    destination: &Path,
) -> Result<Tour, ExportError> {
    TourExporter::default().export(states, initial_state, destination)
}
