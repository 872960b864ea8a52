#[derive(thiserror::Error, Debug)]
pub enum CdpError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("command timed out")]
    Timeout,

    #[error("CDP protocol error {code}: {message}")]
    Protocol { code: i64, message: String },

    #[error("target not found: {0}")]
    TargetNotFound(String),

    #[error("proxy connection failed: {0}")]
    ProxyConnection(String),

    #[error("proxy configuration error: {0}")]
    ProxyConfig(String),

    #[error("failed to {op} '{path}': {reason}")]
    FileSystem { op: String, path: String, reason: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Ws(#[from] tokio_tungstenite::tungstenite::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_protocol_error() {
        let err = CdpError::Protocol {
            code: -32000,
            message: "Node not found".into(),
        };
        assert_eq!(err.to_string(), "CDP protocol error -32000: Node not found");
    }

    #[test]
    fn displays_target_not_found() {
        let err = CdpError::TargetNotFound("T1".into());
        assert_eq!(err.to_string(), "target not found: T1");
    }

    #[test]
    fn displays_file_system_error() {
        let err = CdpError::FileSystem {
            op: "rename".into(),
            path: "/tmp/001_foo.png".into(),
            reason: "permission denied".into(),
        };
        assert_eq!(err.to_string(), "failed to rename '/tmp/001_foo.png': permission denied");
    }

    #[test]
    fn is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CdpError>();
    }
}
