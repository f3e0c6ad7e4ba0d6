//! FlashMind - flashcard sets with a self-graded study loop.
//!
//! The core is three independent values the caller owns and passes around:
//! a [`SetRepository`] holding every set, a [`SetEditor`] holding at most one
//! draft, and a [`StudySession`] running one quiz. None of them log or touch
//! the disk; [`SetStorage`] and [`AiClient`] do that.

pub mod ai;
pub mod config;
pub mod editor;
pub mod error;
pub mod exchange;
pub mod models;
pub mod repository;
pub mod session;
pub mod storage;

pub use ai::{AiClient, GenerationRequest};
pub use config::Config;
pub use editor::{Draft, SetEditor};
pub use error::FlashError;
pub use models::{Card, CardField, CardId, CardSet, ExchangeCard, ExchangeSet, SetId};
pub use repository::{SetRepository, SortKey};
pub use session::{ExitOutcome, SessionState, Step, StudySession};
pub use storage::SetStorage;
