//! The extraction session client: one [`Session`] plus the backend it talks to.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use crate::api::ApiClient;
use crate::error::ExtractResult;
use crate::image::SelectedImage;
use crate::protocol::ExtractionResult;
use crate::retrieval::{self, CalendarHandoff, RetrievalOutcome};
use crate::session::{Completion, Session, SessionSnapshot, SessionStatus};

/// What a call to [`ExtractionSessionClient::process`] ended with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    Completed(ExtractionResult),
    /// The session is now `Failed` with this message.
    Failed(String),
    /// The session was reset while the upload was in flight; its response
    /// was dropped.
    Discarded,
}

/// Drives one extraction attempt at a time.
///
/// Cloning is cheap and clones share the same session, so a UI can keep one
/// handle to reset while another awaits [`process`](Self::process).
#[derive(Clone)]
pub struct ExtractionSessionClient {
    api: Arc<ApiClient>,
    session: Arc<Mutex<Session>>,
}

impl ExtractionSessionClient {
    pub fn new(api: ApiClient) -> Self {
        ExtractionSessionClient {
            api: Arc::new(api),
            session: Arc::new(Mutex::new(Session::new())),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub async fn status(&self) -> SessionStatus {
        self.session.lock().await.status()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.session.lock().await.snapshot()
    }

    pub async fn select(&self, image: SelectedImage) -> ExtractResult<()> {
        self.session.lock().await.select_image(image)
    }

    /// Upload the selected image and apply the response.
    ///
    /// The session lock is released while the request is in flight. If the
    /// session is reset before the response arrives, the response is dropped.
    pub async fn process(&self) -> ExtractResult<ProcessOutcome> {
        let ticket = self.session.lock().await.begin_upload()?;
        info!(
            generation = ticket.generation(),
            image = %ticket.image().describe(),
            "upload_started"
        );

        let outcome = self.api.upload_image(ticket.image()).await;
        let report = match &outcome {
            Ok(result) => ProcessOutcome::Completed(result.clone()),
            Err(e) => ProcessOutcome::Failed(e.to_string()),
        };

        match self.session.lock().await.complete_upload(ticket, outcome) {
            Completion::Applied(_) => Ok(report),
            Completion::Discarded => Ok(ProcessOutcome::Discarded),
        }
    }

    pub async fn retry(&self) -> ExtractResult<()> {
        self.session.lock().await.retry()
    }

    pub async fn reset(&self) {
        self.session.lock().await.reset();
    }

    /// Fetch the calendar file for the completed session and persist it.
    ///
    /// At most one retrieval should be outstanding per session. Callers gate
    /// this themselves; concurrent calls are not serialized here.
    pub async fn download(&self, handoff: &dyn CalendarHandoff) -> ExtractResult<PathBuf> {
        let result = self.completed_result().await?;
        retrieval::fetch_and_persist(&self.api, &result, handoff).await
    }

    /// Fetch the calendar file and open it externally, saving it instead if
    /// that fails. Same one-outstanding-retrieval contract as [`Self::download`].
    pub async fn open_in_calendar(
        &self,
        handoff: &dyn CalendarHandoff,
    ) -> ExtractResult<RetrievalOutcome> {
        let result = self.completed_result().await?;
        retrieval::open_in_external_app(&self.api, &result, handoff).await
    }

    async fn completed_result(&self) -> ExtractResult<ExtractionResult> {
        self.session.lock().await.completed_result().cloned()
    }
}
