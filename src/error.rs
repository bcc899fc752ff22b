use thiserror::Error;

/// Application-level error carrying the process exit code.
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<NormalizeError> for AppError {
    fn from(err: NormalizeError) -> Self {
        AppError::new(2, err.to_string())
    }
}

/// Structural mismatch between a raw table and what its source kind needs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("{source_name}: missing required column(s) [{}]. Available columns: [{}]", quote_all(.missing), quote_all(.available))]
    MissingColumns {
        source_name: &'static str,
        missing: Vec<String>,
        available: Vec<String>,
    },

    #[error("Could not find a label column (expected a name containing 'default'). Available columns: [{}]", quote_all(.available))]
    LabelNotFound { available: Vec<String> },
}

impl SchemaError {
    /// Every column name the raw table offered, for operator diagnosis.
    pub fn available_columns(&self) -> &[String] {
        match self {
            SchemaError::MissingColumns { available, .. } | SchemaError::LabelNotFound { available } => available,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Unsupported source kind '{0}' (expected one of: taiwan, lendingclub, custom)")]
    UnsupportedKind(String),
}

/// The only failures the normalization core raises.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

fn quote_all(names: &[String]) -> String {
    names.iter().map(|n| format!("{n:?}")).collect::<Vec<_>>().join(", ")
}
