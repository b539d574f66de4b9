// Try-on pipeline: analysis, prompt assembly, generation runs, editing and export

pub mod analyzer;
pub mod board;
pub mod composer;
pub mod editor;
pub mod enhancer;
pub mod error;
pub mod export;
pub mod orchestrator;
pub mod storyboard;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use analyzer::{AnalysisRole, AssetAnalyzer, NO_GARMENTS, NO_HAIRSTYLE};
pub use board::ResultBoard;
pub use composer::{assemble_parts, scene_for, PromptComposer, DEFAULT_SCENE, POSE_TEMPLATES};
pub use enhancer::RealismEnhancer;
pub use error::{Result, TryOnError};
pub use export::{collage_file_name, single_file_name, ExportedFile, Exporter};
pub use orchestrator::{
    FallbackReason, GenerationRun, JobResult, Orchestrator, PoseOutcome, RunEvent, RunReport,
    RunState, TryOnSettings,
};
pub use storyboard::StoryboardElement;
pub use types::{
    Asset, EditHistory, Editable, Garment, GeneratedImage, GenerationJob, Hairstyle, ImageRef,
    JobSummary, Outfit, TryOnSession,
};
