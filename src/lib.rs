// fitboard - virtual try-on generation pipeline
// Composes try-on requests, runs them against a multimodal generation service,
// and exports badge-stamped results

pub mod config;
pub mod tryon;

pub use config::FitboardConfig;
pub use tryon::{
    Asset, Exporter, GenerationRun, Orchestrator, RealismEnhancer, ResultBoard, RunEvent,
    TryOnError, TryOnSession,
};
