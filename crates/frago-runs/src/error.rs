#[derive(thiserror::Error, Debug)]
pub enum RunError {
    #[error("run '{0}' not found")]
    NotFound(String),

    #[error("invalid run_id '{id}': {reason}")]
    InvalidRunId { id: String, reason: String },

    #[error("current run context not set")]
    ContextNotSet,

    #[error("another run '{existing}' is currently active")]
    ContextAlreadySet { existing: String },

    #[error("corrupted log entry at {path}:{line}: {reason}")]
    CorruptedLog { path: String, line: usize, reason: String },

    #[error("failed to {op} '{path}': {reason}")]
    FileSystem { op: String, path: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Cdp(#[from] frago_cdp::CdpError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_context_already_set() {
        let err = RunError::ContextAlreadySet {
            existing: "20260730-upwork-jobs".into(),
        };
        assert_eq!(
            err.to_string(),
            "another run '20260730-upwork-jobs' is currently active"
        );
    }

    #[test]
    fn is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RunError>();
    }
}
