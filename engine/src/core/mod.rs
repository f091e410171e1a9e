//! Scene model and math shared by the exporter

pub mod math;
pub mod scene;
