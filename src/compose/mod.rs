//! Composition pipeline: variable maps, block assembly, and the batch
//! driver.

pub mod composer;
pub mod contact;
pub mod variables;

pub use composer::{BatchResult, BlocksUsed, ComposeOptions, ComposedEmail, Composer, EmailMetadata};
pub use contact::Contact;
pub use variables::{SubstitutionError, SubstitutionOptions, VariableMap};

/// Errors from the composition pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    /// Compose was called before [`Composer::initialize`].
    #[error("composer not initialized: call initialize() first")]
    NotInitialized,

    /// The contact's audience type has no configuration. The one hard
    /// precondition of the pipeline.
    #[error("unknown audience type: {0}")]
    UnknownAudience(String),

    /// Strict-mode substitution found an unresolved placeholder.
    #[error(transparent)]
    Substitution(#[from] variables::SubstitutionError),

    /// The block repository failed to load during initialization.
    #[error(transparent)]
    Blocks(#[from] crate::blocks::BlockError),
}
