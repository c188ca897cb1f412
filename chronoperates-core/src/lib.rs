//! Client library for the chronoperates extraction backend.
//!
//! A user picks an image containing event text, the backend extracts the
//! events and generates an ICS file, and the client fetches that file so the
//! platform can save, share or open it.
//!
//! - [`config`] resolves the API base URL once per process
//! - [`image`] validates selections before anything hits the network
//! - [`session`] is the state machine for one extraction attempt
//! - [`api`] speaks the backend's HTTP protocol
//! - [`retrieval`] turns a finished result into a file on the user's side
//! - [`client`] ties a session to the backend

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod ics;
pub mod image;
pub mod protocol;
pub mod retrieval;
pub mod session;

pub use api::ApiClient;
pub use client::{ExtractionSessionClient, ProcessOutcome};
pub use error::{ExtractError, ExtractResult, ValidationError};
pub use image::SelectedImage;
pub use protocol::ExtractionResult;
pub use retrieval::{CalendarHandoff, RetrievalOutcome};
pub use session::{Session, SessionSnapshot, SessionStatus};
