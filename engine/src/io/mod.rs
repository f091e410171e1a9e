//! Tour export, descriptor serialization and validation

pub mod exporter;
mod id_map;
pub mod tour;
pub mod validator;

#[cfg(test)]
mod tests;

pub use exporter::{export_tour, ExportError, ExportProgress, ProgressCallback, TourExporter};
pub use id_map::StateIdMap;
pub use tour::{
    EulerRotation, ExportedLink, ExportedState, SphericalDirection, StateKind, Tour,
    TourFileError,
};
pub use validator::{validate_tour, IssueKind, TourIssue, TourValidationResult};
