//! Onboarding tutorial flow.
//!
//! # Invariants
//! - The overlay is hidden only when `tutorialShown` is stored as `"true"`.
//! - Finishing or skipping persists the flag; the step index is in-memory.

use crate::model::tutorial::{TutorialStep, TUTORIAL_STEPS};
use crate::repo::kv_store::RepoResult;
use crate::repo::profile_repo::ProfileRepository;
use log::{info, warn};

/// Tutorial state machine over the persisted "shown" flag.
pub struct TutorialService<R: ProfileRepository> {
    repo: R,
    visible: bool,
    step: usize,
}

impl<R: ProfileRepository> TutorialService<R> {
    /// Loads the flag; an unreadable flag shows the tutorial.
    pub fn new(repo: R) -> Self {
        let visible = match repo.tutorial_shown() {
            Ok(shown) => !shown,
            Err(err) => {
                warn!("event=tutorial_load module=tutorial status=error error={err}");
                true
            }
        };
        Self {
            repo,
            visible,
            step: 0,
        }
    }

    /// Like `new`, but continues from `step` (clamped to the last step).
    pub fn resume_at(repo: R, step: usize) -> Self {
        let mut service = Self::new(repo);
        service.step = step.min(TUTORIAL_STEPS.len().saturating_sub(1));
        service
    }

    pub fn should_show(&self) -> bool {
        self.visible
    }

    pub fn step_index(&self) -> usize {
        self.step
    }

    /// Current step while the tutorial is visible.
    pub fn current_step(&self) -> Option<&'static TutorialStep> {
        if self.visible {
            TUTORIAL_STEPS.get(self.step)
        } else {
            None
        }
    }

    /// Advances one step; moving past the last step completes the tutorial.
    pub fn next_step(&mut self) -> RepoResult<Option<&'static TutorialStep>> {
        if !self.visible {
            return Ok(None);
        }
        if self.step + 1 < TUTORIAL_STEPS.len() {
            self.step += 1;
            return Ok(self.current_step());
        }
        self.complete()?;
        Ok(None)
    }

    pub fn skip(&mut self) -> RepoResult<()> {
        self.finish("skip")
    }

    pub fn complete(&mut self) -> RepoResult<()> {
        self.finish("complete")
    }

    /// Clears the flag and rewinds to the first step.
    pub fn reset(&mut self) -> RepoResult<()> {
        self.repo.set_tutorial_shown(false)?;
        self.visible = true;
        self.step = 0;
        info!("event=tutorial_reset module=tutorial status=ok");
        Ok(())
    }

    fn finish(&mut self, event: &str) -> RepoResult<()> {
        self.repo.set_tutorial_shown(true)?;
        self.visible = false;
        self.step = 0;
        info!("event=tutorial_{event} module=tutorial status=ok");
        Ok(())
    }
}
