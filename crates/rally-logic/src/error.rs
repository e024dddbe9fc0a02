//! Error kinds for match setup, choice submission and rally resolution

use thiserror::Error;

use crate::catalog::ChoiceSlot;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RallyError {
    /// Index outside the catalog for this slot. Nothing was changed.
    #[error("invalid {slot} index {index}: expected 0..{len}")]
    InvalidActionIndex { slot: ChoiceSlot, index: usize, len: usize },

    #[error("both players are named {0:?}; names must differ")]
    DuplicateName(String),

    /// Resolution attempted while a choice was still unset
    #[error("rally cannot be resolved: {0} not chosen")]
    InvalidChoice(ChoiceSlot),

    #[error("operation requires match state {expected}, but match is {actual}")]
    InvalidState { expected: &'static str, actual: &'static str },

    #[error("unknown choice slot {0:?}: expected attack, block, defense1 or defense2")]
    UnknownSlot(String),

    #[error("invalid match config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = core::result::Result<T, RallyError>;
