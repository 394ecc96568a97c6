use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("no Google Drive URL given")]
    EmptyUrl,

    #[error("invalid Google Drive URL: {0}")]
    InvalidUrl(String),

    #[error("no URL to refresh, explore a Google Drive URL first")]
    NoRefreshTarget,

    #[error("no destination email address given")]
    EmptyDestination,

    #[error("no selected files owned by {owner}")]
    NothingToTransfer { owner: String },

    #[error("failed to fetch {id}: {reason}")]
    Fetch { id: String, reason: String },

    #[error("folder {id} is nested deeper than {max_depth} levels")]
    DepthExceeded { id: String, max_depth: usize },

    #[error("{failed} of {total} ownership transfers failed")]
    Transfer { failed: usize, total: usize },

    #[error("Drive API error: {0}")]
    Api(String),

    #[error("credentials error: {0}")]
    Credentials(String),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl Error {
    /// Short message suitable for showing to the operator.
    pub fn user_message(&self) -> String {
        match self {
            Error::Fetch { .. } | Error::DepthExceeded { .. } | Error::Api(_) => {
                "Failed to fetch files".to_string()
            }
            Error::Transfer { .. } => "Failed to transfer ownership. Please try again.".to_string(),
            other => other.to_string(),
        }
    }

    pub(crate) fn fetch(id: &str, source: Error) -> Self {
        match source {
            Error::Api(reason) => Error::Fetch {
                id: id.to_string(),
                reason,
            },
            other => other,
        }
    }
}
