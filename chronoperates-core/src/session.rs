//! The extraction session state machine.
//!
//! ```text
//! Idle -> ImageSelected -> Processing -> Completed | Failed
//!   ^                                                   |
//!   +------------------- reset (from any state) --------+
//! ```
//!
//! Uploads are split in two steps so no borrow of the session is held while
//! the request is in flight: [`Session::begin_upload`] hands out an
//! [`UploadTicket`] tagged with the current generation, and
//! [`Session::complete_upload`] only applies the outcome if the session has
//! not been reset in the meantime.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ExtractError, ExtractResult};
use crate::image::{SelectedImage, validate_image};
use crate::protocol::ExtractionResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Idle,
    ImageSelected,
    Processing,
    Completed,
    Failed,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionStatus::Idle => "idle",
            SessionStatus::ImageSelected => "image selected",
            SessionStatus::Processing => "processing",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// One state per status; result and error can't coexist.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    ImageSelected {
        image: SelectedImage,
    },
    Processing {
        image: SelectedImage,
    },
    Completed {
        image: SelectedImage,
        result: ExtractionResult,
    },
    Failed {
        image: SelectedImage,
        error: String,
    },
}

impl SessionState {
    pub fn status(&self) -> SessionStatus {
        match self {
            SessionState::Idle => SessionStatus::Idle,
            SessionState::ImageSelected { .. } => SessionStatus::ImageSelected,
            SessionState::Processing { .. } => SessionStatus::Processing,
            SessionState::Completed { .. } => SessionStatus::Completed,
            SessionState::Failed { .. } => SessionStatus::Failed,
        }
    }
}

/// Permission to run one upload, tied to the session generation it was
/// issued for.
#[derive(Debug)]
pub struct UploadTicket {
    generation: u64,
    image: SelectedImage,
}

impl UploadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn image(&self) -> &SelectedImage {
        &self.image
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The outcome was applied; the session is now in this status.
    Applied(SessionStatus),
    /// The ticket belonged to an abandoned session and was ignored.
    Discarded,
}

/// Flat view of a session, the shape front-ends render from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub image: Option<String>,
    pub error: Option<String>,
    pub result: Option<ExtractionResult>,
}

#[derive(Debug, Default)]
pub struct Session {
    state: SessionState,
    generation: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> SessionStatus {
        self.state.status()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Bumped on every reset.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn image(&self) -> Option<&SelectedImage> {
        match &self.state {
            SessionState::Idle => None,
            SessionState::ImageSelected { image }
            | SessionState::Processing { image }
            | SessionState::Completed { image, .. }
            | SessionState::Failed { image, .. } => Some(image),
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            SessionState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&ExtractionResult> {
        match &self.state {
            SessionState::Completed { result, .. } => Some(result),
            _ => None,
        }
    }

    /// Validate and select an image.
    ///
    /// Only allowed while idle or when replacing a previous selection.
    /// Rejections leave the session untouched.
    pub fn select_image(&mut self, image: SelectedImage) -> ExtractResult<()> {
        match self.state {
            SessionState::Idle | SessionState::ImageSelected { .. } => {}
            _ => return Err(self.invalid("select an image")),
        }

        if let Err(e) = validate_image(&image) {
            info!(reason = e.reason(), image = %image.describe(), "image_rejected");
            return Err(e.into());
        }

        debug!(image = %image.describe(), size = ?image.size(), "image_selected");
        self.state = SessionState::ImageSelected { image };
        Ok(())
    }

    /// Move to `Processing` and hand out a ticket for the upload.
    pub fn begin_upload(&mut self) -> ExtractResult<UploadTicket> {
        let image = match &self.state {
            SessionState::ImageSelected { image } => image.clone(),
            _ => return Err(self.invalid("process an image")),
        };

        self.state = SessionState::Processing {
            image: image.clone(),
        };
        Ok(UploadTicket {
            generation: self.generation,
            image,
        })
    }

    /// Apply the upload outcome, unless the ticket is stale.
    pub fn complete_upload(
        &mut self,
        ticket: UploadTicket,
        outcome: ExtractResult<ExtractionResult>,
    ) -> Completion {
        if ticket.generation != self.generation {
            info!(
                ticket_generation = ticket.generation,
                generation = self.generation,
                "upload_discarded_stale"
            );
            return Completion::Discarded;
        }

        let image = match std::mem::take(&mut self.state) {
            SessionState::Processing { image } => image,
            other => {
                // Same generation but no longer processing: nothing to apply to.
                self.state = other;
                return Completion::Discarded;
            }
        };

        self.state = match outcome {
            Ok(result) => {
                info!(events_found = result.events_found, "upload_completed");
                SessionState::Completed { image, result }
            }
            Err(e) => {
                warn!(error = %e, "upload_failed");
                SessionState::Failed {
                    image,
                    error: e.to_string(),
                }
            }
        };

        Completion::Applied(self.status())
    }

    /// Go back from `Failed` to `ImageSelected`, keeping the image.
    pub fn retry(&mut self) -> ExtractResult<()> {
        match std::mem::take(&mut self.state) {
            SessionState::Failed { image, .. } => {
                self.state = SessionState::ImageSelected { image };
                Ok(())
            }
            other => {
                self.state = other;
                Err(self.invalid("retry"))
            }
        }
    }

    /// Back to `Idle` from anywhere. Outstanding tickets become stale.
    pub fn reset(&mut self) {
        self.state = SessionState::Idle;
        self.generation += 1;
    }

    /// The result a retrieval should use; errors unless `Completed`.
    pub fn completed_result(&self) -> ExtractResult<&ExtractionResult> {
        self.result()
            .ok_or_else(|| self.invalid("retrieve the calendar file"))
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status(),
            image: self.image().map(SelectedImage::describe),
            error: self.error().map(str::to_string),
            result: self.result().cloned(),
        }
    }

    fn invalid(&self, operation: &'static str) -> ExtractError {
        ExtractError::InvalidState {
            operation,
            status: self.status(),
        }
    }
}
