use thiserror::Error;

use sentinel_api::ApiError;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// Session expired; the pipeline has shut down and the caller must
    /// re-authenticate.
    #[error("Session expired or unauthorized")]
    Unauthorized,

    /// The directory lookup matched no known user.  Recoverable; the
    /// session and active channel are unaffected.
    #[error("No user matches identifier {identifier:?}")]
    ResolutionNotFound { identifier: String },

    /// The draft has neither text nor an attachment.
    #[error("Nothing to send")]
    EmptyDraft,

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// The pipeline task is no longer running.
    #[error("Pipeline is shut down")]
    Closed,
}
