// Result board - consumer-side view of a run, fed by RunEvents

use super::orchestrator::{RunEvent, RunState};
use super::types::{GeneratedImage, JobSummary};
use std::collections::HashMap;

/// Results keyed by job id plus the currently shown job
#[derive(Debug, Default)]
pub struct ResultBoard {
    jobs: Vec<JobSummary>,
    results: HashMap<String, Vec<GeneratedImage>>,
    active: Option<String>,
    running: bool,
}

impl ResultBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into the board
    pub fn apply(&mut self, event: &RunEvent) {
        match event {
            RunEvent::RunStarted { jobs } => {
                self.jobs = jobs.clone();
                self.results.clear();
                self.active = None;
                self.running = true;
            }
            RunEvent::StateChanged(RunState::AnalyzingGarments { job_id }) => {
                self.active = Some(job_id.clone());
            }
            RunEvent::JobPublished { job_id, images, .. } => {
                self.results.insert(job_id.clone(), images.clone());
                self.active = Some(job_id.clone());
            }
            RunEvent::RunFinished => {
                self.running = false;
                self.active = self.jobs.first().map(|j| j.id.clone());
            }
            RunEvent::StateChanged(_) => {}
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn jobs(&self) -> &[JobSummary] {
        &self.jobs
    }

    pub fn results(&self, job_id: &str) -> Option<&[GeneratedImage]> {
        self.results.get(job_id).map(Vec::as_slice)
    }

    pub fn active_job(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Show another job's results; ignored for unknown ids
    pub fn select(&mut self, job_id: &str) -> bool {
        if self.jobs.iter().any(|j| j.id == job_id) {
            self.active = Some(job_id.to_string());
            true
        } else {
            false
        }
    }

    pub fn active_images(&self) -> &[GeneratedImage] {
        self.active
            .as_deref()
            .and_then(|id| self.results(id))
            .unwrap_or(&[])
    }

    /// Display name of the active job, including the hairstyle-only job
    pub fn active_outfit_name(&self) -> Option<&str> {
        let active = self.active.as_deref()?;
        self.jobs
            .iter()
            .find(|j| j.id == active)
            .map(|j| j.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tryon::types::{GenerationJob, ImageRef};

    fn summary(id: &str, name: &str) -> JobSummary {
        JobSummary {
            id: id.into(),
            name: name.into(),
        }
    }

    fn started(job_id: &str) -> RunEvent {
        RunEvent::StateChanged(RunState::AnalyzingGarments {
            job_id: job_id.into(),
        })
    }

    fn published(job_id: &str) -> RunEvent {
        RunEvent::JobPublished {
            job_id: job_id.into(),
            job_name: job_id.into(),
            images: (0..5)
                .map(|p| GeneratedImage::new(job_id, p, ImageRef::Placeholder(format!("u{p}"))))
                .collect(),
        }
    }

    #[test]
    fn test_run_lifecycle() {
        let mut board = ResultBoard::new();
        board.apply(&RunEvent::RunStarted {
            jobs: vec![summary("o1", "Outfit 1"), summary("o2", "Outfit 2")],
        });
        assert!(board.is_running());
        assert!(board.active_images().is_empty());

        board.apply(&started("o1"));
        assert_eq!(board.active_job(), Some("o1"));
        assert!(board.active_images().is_empty());
        board.apply(&published("o1"));
        assert_eq!(board.active_job(), Some("o1"));

        board.apply(&started("o2"));
        assert_eq!(board.active_job(), Some("o2"));
        assert_eq!(board.active_outfit_name(), Some("Outfit 2"));
        assert!(board.active_images().is_empty());
        assert!(board.results("o1").is_some());

        board.apply(&published("o2"));
        assert_eq!(board.active_images().len(), 5);

        board.apply(&RunEvent::RunFinished);
        assert!(!board.is_running());
        assert_eq!(board.active_job(), Some("o1"));
        assert_eq!(board.active_images()[0].id, "o1-0");
    }

    #[test]
    fn test_new_run_clears_results() {
        let mut board = ResultBoard::new();
        board.apply(&RunEvent::RunStarted {
            jobs: vec![summary("o1", "Outfit 1")],
        });
        board.apply(&published("o1"));
        board.apply(&RunEvent::RunFinished);

        board.apply(&RunEvent::RunStarted {
            jobs: vec![summary("o9", "Outfit 9")],
        });
        assert!(board.results("o1").is_none());
        assert_eq!(board.active_job(), None);
        assert_eq!(board.active_outfit_name(), None);
    }

    #[test]
    fn test_hairstyle_only_name_and_select() {
        let job = GenerationJob::hairstyle_only();
        let mut board = ResultBoard::new();
        board.apply(&RunEvent::RunStarted {
            jobs: vec![JobSummary::from(&job)],
        });
        board.apply(&published(&job.id));
        board.apply(&RunEvent::RunFinished);

        assert_eq!(board.active_outfit_name(), Some("Hairstyle Try-On"));
        assert!(!board.select("missing"));
        assert!(board.select(&job.id));
    }
}
