#[derive(thiserror::Error, Debug)]
pub enum EnvError {
    #[error("missing required environment variable(s): {0:?}")]
    MissingRequired(Vec<String>),

    #[error("invalid env var name '{0}'")]
    InvalidName(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_missing_required() {
        let err = EnvError::MissingRequired(vec!["TOKEN".into(), "API_KEY".into()]);
        assert_eq!(
            err.to_string(),
            "missing required environment variable(s): [\"TOKEN\", \"API_KEY\"]"
        );
    }

    #[test]
    fn is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EnvError>();
    }
}
