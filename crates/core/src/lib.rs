//! # nback
//!
//! Stimulus and scoring engine for the N-back working-memory test.
//!
//! Every round presents one stimulus carrying a value for each modality
//! (grid position, color, letter, number, shape, audio note). The player
//! declares, per active modality, whether the current value matches the one
//! shown `n` rounds earlier. When the next round starts, the declarations are
//! judged and tallied as correct, wrong or missed.
//!
//! ## Quick Start
//!
//! ```
//! use nback::prelude::*;
//!
//! let config = SessionConfig::new(3, 2, [Modality::Position, Modality::Audio], 500)
//!     .with_seed(7);
//! let mut session = NBackSession::configure(config).unwrap();
//!
//! session.advance();
//! session.advance();
//! session.advance();
//! assert!(session.accepts_responses());
//!
//! session.declare_response(Modality::Position, true).unwrap();
//! session.advance();
//!
//! let position = session.score(Modality::Position).unwrap();
//! assert_eq!(position.rounds(), 1);
//! ```
//!
//! ## Feature Flags
//!
//! - `scheduler` (default): [`Trainer`], a tokio-driven round timer around a session.
//!
//! ## Modules
//!
//! - [`catalog`]: fixed value lists per modality
//! - [`stimulus`]: stimulus snapshots and their sources
//! - [`history`]: presented stimuli and n-back lookup
//! - [`response`]: per-round declarations
//! - [`score`]: round evaluation and tallies
//! - [`session`]: the session object tying it all together
//! - [`scheduler`]: cancellable repeating round timer

pub mod catalog;
pub mod error;
pub mod history;
pub mod modality;
pub mod prng;
pub mod response;
#[cfg(feature = "scheduler")]
pub mod scheduler;
pub mod score;
pub mod session;
pub mod stimulus;

pub use error::{ConfigError, NBackError};
pub use modality::{Modality, ModalitySet, PerModality};
#[cfg(feature = "scheduler")]
pub use scheduler::Trainer;
pub use session::{NBackSession, SessionConfig, SessionSnapshot};
pub use stimulus::{Feature, Stimulus};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::catalog::{Color, Note, Shape};
    pub use crate::error::{ConfigError, NBackError};
    pub use crate::modality::{Modality, ModalitySet};
    #[cfg(feature = "scheduler")]
    pub use crate::scheduler::Trainer;
    pub use crate::score::{ModalityScore, Verdict};
    pub use crate::session::{NBackSession, SessionConfig, SessionSnapshot};
    pub use crate::stimulus::{RandomSource, ScriptedSource, Stimulus, StimulusSource};
}
