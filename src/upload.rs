// src/upload.rs
//
// State of the upload page, kept free of DOM types so the whole sequence
// (stage -> decode -> process -> hand off) can be driven from tests.

use crate::config::UploadTiming;
use crate::error::UploadError;
use crate::image_ref::ImageReference;
use crate::utils::format_megabytes;

#[derive(Debug, Clone, PartialEq)]
pub struct UploadCandidate {
    pub name: String,
    pub size: u64,
    pub mime: String,
    /// Filled in once the asynchronous decode finishes.
    pub preview: Option<ImageReference>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    Empty,
    Staged,
    Processing { progress: u8 },
    /// Progress reached 100%; waiting for the hand-off delay.
    Finishing,
    HandedOff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Advanced(u8),
    Finished,
    Idle,
}

/// Token identifying one staged candidate. Decodes that report back with a
/// stale token belong to a file that was replaced or removed.
pub type StageToken = u64;

impl UploadCandidate {
    pub fn new(name: String, size: u64, mime: String) -> Self {
        Self {
            name,
            size,
            mime,
            preview: None,
        }
    }

    pub fn is_image_type(mime: &str) -> bool {
        mime.starts_with("image/")
    }

    pub fn size_label(&self) -> String {
        format_megabytes(self.size)
    }
}

#[derive(Debug, Clone)]
pub struct UploadState {
    phase: UploadPhase,
    candidate: Option<UploadCandidate>,
    token: StageToken,
    timing: UploadTiming,
}

impl UploadState {
    pub fn new(timing: UploadTiming) -> Self {
        Self {
            phase: UploadPhase::Empty,
            candidate: None,
            token: 0,
            timing,
        }
    }

    pub fn phase(&self) -> UploadPhase {
        self.phase
    }

    pub fn candidate(&self) -> Option<&UploadCandidate> {
        self.candidate.as_ref()
    }

    pub fn preview(&self) -> Option<&ImageReference> {
        self.candidate.as_ref().and_then(|c| c.preview.as_ref())
    }

    pub fn timing(&self) -> &UploadTiming {
        &self.timing
    }

    pub fn progress(&self) -> u8 {
        match self.phase {
            UploadPhase::Empty | UploadPhase::Staged => 0,
            UploadPhase::Processing { progress } => progress,
            UploadPhase::Finishing | UploadPhase::HandedOff => 100,
        }
    }

    pub fn is_processing(&self) -> bool {
        matches!(
            self.phase,
            UploadPhase::Processing { .. } | UploadPhase::Finishing
        )
    }

    pub fn can_remove(&self) -> bool {
        matches!(self.phase, UploadPhase::Empty | UploadPhase::Staged)
    }

    /// Whether `token` belongs to the candidate currently staged.
    pub fn is_current(&self, token: StageToken) -> bool {
        token == self.token && self.candidate.is_some()
    }

    /// Swap in new pacing. A running sequence keeps the pace it started with,
    /// so this is refused while processing.
    pub fn set_timing(&mut self, timing: UploadTiming) -> bool {
        if self.is_processing() {
            return false;
        }
        self.timing = timing;
        true
    }

    /// Stage a file chosen through the picker. The picker only suggests image
    /// types, so nothing is enforced here.
    pub fn stage(&mut self, name: String, size: u64, mime: String) -> Result<StageToken, UploadError> {
        match self.phase {
            UploadPhase::Processing { .. } | UploadPhase::Finishing => {
                return Err(UploadError::AlreadyProcessing)
            }
            UploadPhase::HandedOff => return Err(UploadError::AlreadyHandedOff),
            UploadPhase::Empty | UploadPhase::Staged => {}
        }
        self.token += 1;
        self.candidate = Some(UploadCandidate::new(name, size, mime));
        self.phase = UploadPhase::Staged;
        Ok(self.token)
    }

    /// Stage a dropped file; anything not declared as an image is refused
    /// without touching the current state.
    pub fn accept_drop(&mut self, name: String, size: u64, mime: String) -> Result<StageToken, UploadError> {
        if !UploadCandidate::is_image_type(&mime) {
            return Err(UploadError::InvalidDrop { mime });
        }
        self.stage(name, size, mime)
    }

    /// Record the decoded preview. Returns `Ok(false)` when the token is stale.
    pub fn preview_ready(&mut self, token: StageToken, data_url: String) -> Result<bool, UploadError> {
        if token != self.token {
            return Ok(false);
        }
        let Some(candidate) = self.candidate.as_mut() else {
            return Ok(false);
        };
        match ImageReference::parse(data_url) {
            Some(reference) => {
                candidate.preview = Some(reference);
                Ok(true)
            }
            None => Err(UploadError::FileRead {
                name: candidate.name.clone(),
                reason: "decoded preview is empty".to_string(),
            }),
        }
    }

    /// A decode failed. The current candidate is dropped; stale failures are ignored.
    pub fn preview_failed(&mut self, token: StageToken, reason: String) -> Option<UploadError> {
        if token != self.token || self.phase != UploadPhase::Staged {
            return None;
        }
        let candidate = self.candidate.take()?;
        self.phase = UploadPhase::Empty;
        Some(UploadError::FileRead {
            name: candidate.name,
            reason,
        })
    }

    pub fn process(&mut self) -> Result<(), UploadError> {
        match self.phase {
            UploadPhase::Empty => Err(UploadError::NothingStaged),
            UploadPhase::Processing { .. } | UploadPhase::Finishing => {
                Err(UploadError::AlreadyProcessing)
            }
            UploadPhase::HandedOff => Err(UploadError::AlreadyHandedOff),
            UploadPhase::Staged => match self.candidate.as_ref() {
                None => Err(UploadError::NothingStaged),
                Some(c) if c.preview.is_none() => Err(UploadError::PreviewPending(c.name.clone())),
                Some(_) => {
                    self.phase = UploadPhase::Processing { progress: 0 };
                    Ok(())
                }
            },
        }
    }

    /// Advance the simulated progress by one step. `Finished` is reported
    /// exactly once, on the tick that reaches 100%.
    pub fn tick(&mut self) -> TickOutcome {
        let UploadPhase::Processing { progress } = self.phase else {
            return TickOutcome::Idle;
        };
        let next = progress.saturating_add(self.timing.progress_step).min(100);
        if next >= 100 {
            self.phase = UploadPhase::Finishing;
            TickOutcome::Finished
        } else {
            self.phase = UploadPhase::Processing { progress: next };
            TickOutcome::Advanced(next)
        }
    }

    /// Release the staged reference to the viewer. Only valid once progress
    /// has reached 100%, and only once.
    pub fn hand_off(&mut self) -> Result<ImageReference, UploadError> {
        match self.phase {
            UploadPhase::Finishing => {}
            UploadPhase::Processing { progress } => {
                return Err(UploadError::ProgressIncomplete(progress))
            }
            UploadPhase::HandedOff => return Err(UploadError::AlreadyHandedOff),
            UploadPhase::Empty | UploadPhase::Staged => return Err(UploadError::NothingStaged),
        }
        let reference = self
            .candidate
            .take()
            .and_then(|c| c.preview)
            .ok_or(UploadError::NothingStaged)?;
        self.phase = UploadPhase::HandedOff;
        Ok(reference)
    }

    pub fn remove(&mut self) -> Result<(), UploadError> {
        match self.phase {
            UploadPhase::Processing { .. } | UploadPhase::Finishing => {
                Err(UploadError::RemoveWhileProcessing)
            }
            UploadPhase::HandedOff => Err(UploadError::AlreadyHandedOff),
            UploadPhase::Empty | UploadPhase::Staged => {
                // Bumping the token orphans any decode still in flight.
                self.token += 1;
                self.candidate = None;
                self.phase = UploadPhase::Empty;
                Ok(())
            }
        }
    }
}
