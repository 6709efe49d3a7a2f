// Session lifecycle: the upload / analyze / display state machine, the
// orchestration that drives it, the registry of live sessions, and the HTTP
// handlers over them.

pub mod handlers;
pub mod machine;
pub mod orchestrator;
pub mod store;

use thiserror::Error;

use crate::advisory::AdvisoryError;
use crate::lifecycle::machine::{InvalidTransition, Phase};

pub use orchestrator::{ChatExchange, Pipeline, ScanSession};
pub use store::SessionStore;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),

    #[error("no completed analysis to discuss (session is {0:?})")]
    NotComplete(Phase),

    #[error(transparent)]
    Advisory(#[from] AdvisoryError),
}
