//! Recoverable errors reported by the flashcard core.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlashError {
    #[error("There is no set being edited")]
    NoDraft,

    #[error("The set has no name")]
    EmptyName,

    #[error("The set has no valid cards")]
    NoValidCards,

    #[error("Invalid set file format: {0}")]
    MalformedImport(String),

    #[error("Card generation failed: {0}")]
    Generation(String),
}

pub type Result<T> = std::result::Result<T, FlashError>;
