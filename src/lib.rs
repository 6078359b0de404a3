//! `hairscan-http` is the request layer of the hair-loss self-assessment
//! client.
//!
//! [`ResilientClient::send`] executes one logical request and hides transient
//! backend instability from the caller:
//! - 2xx/3xx and 4xx responses are returned on the first attempt that sees them
//! - 5xx responses and transport errors are retried with exponential backoff
//! - once [`RetryPolicy::max_attempts`] is reached, the last transient outcome
//!   is returned unchanged
//!
//! On top of it sit [`ImageAnalyzer`] (multi-stage photo analysis) and
//! [`ChatClient`], plus the [`RequestState`] and [`OverlayBus`] helpers used
//! by display code.

mod analysis;
mod chat;
mod client;
mod decode;
mod error;
mod events;
mod options;
mod policy;
mod request;
mod retry;
mod sleeper;
mod state;
mod types;
mod wire;

pub use analysis::{join_url, AnalysisStage, ImageAnalyzer, ImageUpload};
pub use chat::ChatClient;
pub use client::ResilientClient;
pub use error::HairscanError;
pub use events::{OverlayBus, OverlayEvent, OverlaySubscriber};
pub use options::ClientOptions;
pub use policy::RetryPolicy;
pub use request::{Body, FormPart, Request};
pub use reqwest::Method;
pub use retry::{classify_status, Disposition};
pub use sleeper::{InstantSleeper, Sleeper, TokioSleeper, TrackingSleeper};
pub use state::{track, Failure, RequestState, GENERIC_FAILURE_MESSAGE};
pub use types::{AnalysisOutcome, ChatMessage, ChatReply, Role, StageVerdict};

pub type Result<T> = std::result::Result<T, HairscanError>;
