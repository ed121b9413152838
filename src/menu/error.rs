use thiserror::Error;

/// Invalid menu parameters, rejected when the menu is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MenuError {
    #[error("A choice menu needs at least one choice")]
    EmptyChoices,

    #[error("Menu prompt must not be empty")]
    EmptyPrompt,
}
