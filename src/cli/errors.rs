use thiserror::Error;

/// Application-specific errors for the CLI
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing required argument: {arg}")]
    MissingArgument { arg: String },

    #[error("Conflicting arguments: {first} and {second}")]
    ConflictingArguments { first: String, second: String },

    #[error("Batch finished with {errors} error(s)")]
    BatchFailed { errors: usize },

    #[error(transparent)]
    Transform(#[from] stac_sentinel::Error),
}
