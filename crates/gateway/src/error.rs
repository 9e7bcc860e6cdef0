#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("LoadConfigFailed: {0}")]
    LoadConfigFailed(#[from] envy::Error),

    #[error("MissingCredentials: neither FCM_API_KEY nor FCM_API_KEY_FILE is set")]
    MissingCredentials,

    #[error("CredentialsFileError: {0}: {1}")]
    CredentialsFile(String, std::io::Error),

    #[error("FcmUpstreamError: {0}")]
    FcmUpstreamError(#[from] fcm::FcmError),

    #[error("FcmRejected: {0}")]
    FcmRejected(String),

    #[error("SerdeJsonError: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}
