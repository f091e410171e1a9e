//! Tour engine for panoramic virtual tours
//!
//! This crate provides the scene model used while authoring a tour (states
//! placed in 3D space and linked by directed connections) and the exporter
//! that turns it into a package for the tour viewer: copied panoramas plus a
//! JSON descriptor.

pub mod config;
pub mod core;
pub mod io;
pub mod utils;

// Re-export commonly used types
pub mod prelude {
    // Scene types
    pub use crate::core::scene::{
        ConnectionChange, Entity, PanoramaSource, SceneConnection, SceneState, TourScene,
    };

    // Math types
    pub use glam::{Quat, Vec3};

    // Export types
    pub use crate::io::{
        export_tour, validate_tour, ExportError, ExportProgress, Tour, TourExporter,
    };

    // Config types
    pub use crate::config::ExportConfig;
}

/// Initialize logging for the exporter
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
