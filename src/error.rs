use std::path::PathBuf;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("Missing access token. Set the ESA_TOKEN environment variable.")]
    CredentialMissing,

    #[error("Missing team name.\nUse --team, or set team in config.toml.")]
    TeamMissing,

    #[error("Failed to fetch posts (page {page})")]
    UpstreamFetch {
        page: u32,
        #[source]
        source: BoxError,
    },

    #[error("Failed to {action}: {}", path.display())]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to download attachment: {url}")]
    AttachmentDownload {
        url: String,
        #[source]
        source: BoxError,
    },
}

impl ArchiveError {
    pub(crate) fn fs(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            action,
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = ArchiveError> = std::result::Result<T, E>;
