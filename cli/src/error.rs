use pagestate_core::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("config error: {0}")]
    Config(String),
    #[error("{0}")]
    Usage(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        // 0: success
        // 2: usage (unknown action, malformed key=value)
        // 11: config error
        // 20: IO / storage error
        // 50: internal/uncategorized
        match self {
            CliError::Usage(_) => 2,
            CliError::Config(_) => 11,
            CliError::Io(_) | CliError::Storage(_) => 20,
            CliError::Anyhow(_) => 50,
        }
    }
}
