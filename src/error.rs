use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("CliError: {0}")]
    Cli(#[from] CliError),
    #[error("ConfigError: {0}")]
    Config(#[from] ConfigError),
    #[error("StorageError: {0}")]
    Storage(#[from] StorageError),
    #[error("FlattenError: {0}")]
    Flatten(#[from] FlattenError),
    #[error("InputError: {0}")]
    Input(#[from] InputError),
    #[error("OpenerError: {0}")]
    Opener(#[from] OpenerError),
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("Output error: {0}")]
    Output(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("File I/O error at {path}: {source}")]
    FileIo {
        path: String,
        source: std::io::Error,
    },
    #[error("Configuration save failed: {message}")]
    ConfigSaveFailed { message: String },
    #[error("Configuration parse error: {message}")]
    ConfigParseError { message: String },
    #[error("Configuration directory not found")]
    ConfigDirNotFound,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown configuration key '{key}'")]
    UnknownKey { key: String },
    #[error("Invalid configuration value for '{field}': {value}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlattenError {
    #[error("Cyclic structure detected at depth {depth}")]
    Cyclic { depth: usize },
    #[error("Nesting depth exceeds the limit of {limit}")]
    DepthExceeded { limit: usize },
}

#[derive(Error, Debug)]
pub enum InputError {
    #[error("Cannot open {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Invalid file mode '{mode}'")]
    InvalidMode { mode: String },
    #[error("Invalid JSON in {path}: {message}")]
    Json { path: String, message: String },
    #[error("Invalid number '{value}'")]
    InvalidNumber { value: String },
    #[error("Cumulative sum overflows at index {index}")]
    Overflow { index: usize },
}

#[derive(Error, Debug)]
pub enum OpenerError {
    #[error("No default opener is known for platform '{platform}'")]
    UnsupportedPlatform { platform: String },
    #[error("Opener command is empty")]
    EmptyCommand,
    #[error("File not found: {path}")]
    NotFound { path: String },
    #[error("Failed to launch {program}: {source}")]
    Launch {
        program: String,
        source: std::io::Error,
    },
    #[error("{program} exited with status {code:?}")]
    ExitStatus { program: String, code: Option<i32> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorSeverity {
    Critical,
    High,
    Medium,
    Low,
}

impl ErrorSeverity {
    pub fn emoji(&self) -> &'static str {
        match self {
            ErrorSeverity::Critical => "🚨",
            ErrorSeverity::High => "❌",
            ErrorSeverity::Medium => "⚠️",
            ErrorSeverity::Low => "ℹ️",
        }
    }
}

impl AppError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AppError::Cli(_) => ErrorSeverity::Medium,
            AppError::Config(_) => ErrorSeverity::High,
            AppError::Storage(_) => ErrorSeverity::Medium,
            AppError::Flatten(flatten_error) => match flatten_error {
                FlattenError::Cyclic { .. } => ErrorSeverity::High,
                FlattenError::DepthExceeded { .. } => ErrorSeverity::Medium,
            },
            AppError::Input(input_error) => match input_error {
                InputError::Overflow { .. } => ErrorSeverity::High,
                _ => ErrorSeverity::Medium,
            },
            AppError::Opener(_) => ErrorSeverity::Low,
        }
    }

    pub fn display_friendly(&self) -> String {
        match self {
            AppError::Flatten(FlattenError::Cyclic { .. }) => {
                "Input refers back to itself and cannot be flattened".to_string()
            }
            AppError::Input(InputError::Open { path, .. }) => format!("Cannot open {}", path),
            AppError::Opener(OpenerError::NotFound { path }) => format!("{} does not exist", path),
            _ => format!("{}", self),
        }
    }

    pub fn troubleshooting_hint(&self) -> Option<String> {
        match self {
            AppError::Flatten(FlattenError::DepthExceeded { .. }) => Some(
                "'nxmisc config set flatten.max_depth <n>' to raise the limit".to_string(),
            ),
            AppError::Input(InputError::InvalidMode { .. }) => {
                Some("Valid modes are r, rb, rt, w, wb, wt, a, ab and at".to_string())
            }
            AppError::Input(InputError::Overflow { .. }) => Some(
                "Totals must fit in a 64-bit integer, or stay finite for decimal input"
                    .to_string(),
            ),
            AppError::Opener(OpenerError::UnsupportedPlatform { .. }) => Some(
                "'nxmisc config set opener.command \"<program> [args]\"' to configure one"
                    .to_string(),
            ),
            _ => None,
        }
    }
}
