// Generation orchestrator - sequences analysis and per-pose synthesis for each job

use super::analyzer::AssetAnalyzer;
use super::composer::{assemble_parts, PromptComposer, POSE_TEMPLATES};
use super::error::{Result, TryOnError};
use super::types::{GeneratedImage, GenerationJob, ImageRef, JobSummary, TryOnSession};
use chrono::{DateTime, Utc};
use gemini::{GenerateRequest, GenerationService, InlineImage, Modality};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image-preview";

/// Models the pipeline talks to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TryOnSettings {
    pub text_model: String,
    pub image_model: String,
}

impl Default for TryOnSettings {
    fn default() -> Self {
        Self {
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
        }
    }
}

/// Where a run currently is
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunState {
    Idle,
    AnalyzingShared,
    AnalyzingGarments { job_id: String },
    Synthesizing { job_id: String, pose: usize },
    Published { job_id: String },
}

/// Progress notifications emitted during a run
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    RunStarted { jobs: Vec<JobSummary> },
    StateChanged(RunState),
    JobPublished {
        job_id: String,
        job_name: String,
        images: Vec<GeneratedImage>,
    },
    RunFinished,
}

/// Why a pose produced no image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// The service answered, but without an image part
    NoImage,
    /// The call itself failed
    CallFailed(String),
}

/// Result of one synthesis call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoseOutcome {
    Image(InlineImage),
    Fallback(FallbackReason),
}

impl PoseOutcome {
    pub fn into_image_ref(self, job_id: &str, pose: usize) -> ImageRef {
        match self {
            PoseOutcome::Image(image) => ImageRef::Inline(image),
            PoseOutcome::Fallback(FallbackReason::NoImage) => {
                ImageRef::Placeholder(placeholder_url(job_id, pose))
            }
            PoseOutcome::Fallback(FallbackReason::CallFailed(_)) => {
                ImageRef::Placeholder(error_placeholder_url(job_id, pose))
            }
        }
    }
}

/// Stand-in for a pose the service answered without an image
pub fn placeholder_url(job_id: &str, pose: usize) -> String {
    format!(
        "https://picsum.photos/seed/{}-{}/512/768?text=Generation+Failed",
        job_id, pose
    )
}

/// Stand-in for a pose whose call failed
pub fn error_placeholder_url(job_id: &str, pose: usize) -> String {
    format!(
        "https://picsum.photos/seed/error-{}-{}/512/768?text=Error",
        job_id, pose
    )
}

/// The five images of one job, in pose order
#[derive(Debug, Clone, PartialEq)]
pub struct JobResult {
    pub job: JobSummary,
    pub images: Vec<GeneratedImage>,
}

impl JobResult {
    pub fn placeholder_count(&self) -> usize {
        self.images.iter().filter(|i| i.image.is_placeholder()).count()
    }
}

/// Outcome of a whole `generate` call
#[derive(Debug, Clone)]
pub struct GenerationRun {
    pub jobs: Vec<JobResult>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl GenerationRun {
    pub fn job(&self, job_id: &str) -> Option<&JobResult> {
        self.jobs.iter().find(|j| j.job.id == job_id)
    }

    pub fn image_count(&self) -> usize {
        self.jobs.iter().map(|j| j.images.len()).sum()
    }

    pub fn report(&self) -> RunReport {
        RunReport {
            started_at: self.started_at,
            finished_at: self.finished_at,
            jobs: self
                .jobs
                .iter()
                .map(|j| JobReport {
                    id: j.job.id.clone(),
                    name: j.job.name.clone(),
                    images: j
                        .images
                        .iter()
                        .map(|i| ImageReport {
                            id: i.id.clone(),
                            pose: POSE_TEMPLATES[i.pose_index].to_string(),
                            placeholder: match &i.image {
                                ImageRef::Placeholder(url) => Some(url.clone()),
                                ImageRef::Inline(_) => None,
                            },
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

/// Serializable summary of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub jobs: Vec<JobReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobReport {
    pub id: String,
    pub name: String,
    pub images: Vec<ImageReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageReport {
    pub id: String,
    pub pose: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

/// Runs try-on generation against a [`GenerationService`]
pub struct Orchestrator {
    service: Arc<dyn GenerationService>,
    settings: TryOnSettings,
    events: Option<UnboundedSender<RunEvent>>,
}

impl Orchestrator {
    pub fn new(service: Arc<dyn GenerationService>, settings: TryOnSettings) -> Self {
        Self {
            service,
            settings,
            events: None,
        }
    }

    /// Send progress events to `sender`
    pub fn with_events(mut self, sender: UnboundedSender<RunEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    pub fn settings(&self) -> &TryOnSettings {
        &self.settings
    }

    /// Validate the session and derive its jobs. No network calls.
    pub fn plan_jobs(&self, session: &TryOnSession) -> Result<Vec<GenerationJob>> {
        if session.model.is_none() {
            return Err(TryOnError::MissingModel);
        }
        if !self.service.is_configured() {
            return Err(TryOnError::MissingCredential);
        }

        let jobs: Vec<GenerationJob> = session
            .outfits()
            .iter()
            .filter(|o| o.has_garments())
            .map(GenerationJob::from_outfit)
            .collect();

        if !jobs.is_empty() {
            return Ok(jobs);
        }
        if session.hairstyle.is_some() {
            return Ok(vec![GenerationJob::hairstyle_only()]);
        }
        Err(TryOnError::NothingToGenerate)
    }

    /// Run every job of the session, publishing each as it completes
    pub async fn generate(&self, session: &TryOnSession) -> Result<GenerationRun> {
        let jobs = self.plan_jobs(session)?;
        let model = session.model.as_ref().ok_or(TryOnError::MissingModel)?;
        let hairstyle = session.hairstyle.as_ref().map(|h| h.current());
        let instructions = session.instructions();
        let started_at = Utc::now();

        info!(jobs = jobs.len(), face_lock = session.face_lock, "Starting generation run");
        self.emit(RunEvent::RunStarted {
            jobs: jobs.iter().map(JobSummary::from).collect(),
        });

        self.set_state(RunState::AnalyzingShared);
        let analyzer = AssetAnalyzer::new(self.service.as_ref(), &self.settings.text_model);
        let model_analysis = analyzer.analyze_model(model).await;
        let hairstyle_analysis = analyzer.analyze_hairstyle(hairstyle).await;

        let mut results = Vec::with_capacity(jobs.len());
        for job in &jobs {
            info!(job = %job.id, name = %job.name, garments = job.garments.len(), "Processing job");

            self.set_state(RunState::AnalyzingGarments {
                job_id: job.id.clone(),
            });
            let garment_analysis = analyzer.analyze_garments(&job.garments).await;

            let composer = PromptComposer {
                model_analysis: &model_analysis,
                garment_analysis: &garment_analysis,
                hairstyle_analysis: &hairstyle_analysis,
                instructions: &instructions,
                has_hairstyle: hairstyle.is_some(),
                face_lock: session.face_lock,
            };

            let mut images = Vec::with_capacity(POSE_TEMPLATES.len());
            for (pose, template) in POSE_TEMPLATES.iter().enumerate() {
                self.set_state(RunState::Synthesizing {
                    job_id: job.id.clone(),
                    pose,
                });
                let request = GenerateRequest::new(&self.settings.image_model)
                    .with_parts(assemble_parts(model, hairstyle, job, composer.compose(template)))
                    .with_modalities(&[Modality::Image, Modality::Text]);

                let outcome = self.synthesize(&request, &job.id, pose).await;
                images.push(GeneratedImage::new(
                    &job.id,
                    pose,
                    outcome.into_image_ref(&job.id, pose),
                ));
            }

            let result = JobResult {
                job: JobSummary::from(job),
                images,
            };
            info!(
                job = %job.id,
                placeholders = result.placeholder_count(),
                "Job complete"
            );

            self.emit(RunEvent::JobPublished {
                job_id: job.id.clone(),
                job_name: job.name.clone(),
                images: result.images.clone(),
            });
            self.set_state(RunState::Published {
                job_id: job.id.clone(),
            });
            results.push(result);
        }

        self.set_state(RunState::Idle);
        self.emit(RunEvent::RunFinished);

        Ok(GenerationRun {
            jobs: results,
            started_at,
            finished_at: Utc::now(),
        })
    }

    async fn synthesize(
        &self,
        request: &GenerateRequest,
        job_id: &str,
        pose: usize,
    ) -> PoseOutcome {
        debug!(job = job_id, pose, images = request.image_count(), "Synthesizing");

        match self.service.generate(request).await {
            Ok(response) => match response.first_image() {
                Some(image) => PoseOutcome::Image(image.clone()),
                None => {
                    warn!(
                        job = job_id,
                        pose,
                        text = response.text().as_deref().unwrap_or(""),
                        "No image in response; the request may have been refused"
                    );
                    PoseOutcome::Fallback(FallbackReason::NoImage)
                }
            },
            Err(e) => {
                warn!(job = job_id, pose, error = %e, "Synthesis call failed");
                PoseOutcome::Fallback(FallbackReason::CallFailed(e.to_string()))
            }
        }
    }

    fn set_state(&self, state: RunState) {
        debug!(?state, "Run state");
        self.emit(RunEvent::StateChanged(state));
    }

    fn emit(&self, event: RunEvent) {
        if let Some(sender) = &self.events {
            // A closed receiver only means nobody is watching
            let _ = sender.send(event);
        }
    }
}
