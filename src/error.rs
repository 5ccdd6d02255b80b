use miette::Diagnostic;
use thiserror::Error;

/// Main error type for realpx operations
#[derive(Error, Diagnostic, Debug)]
pub enum PxError {
    #[error("IO error: {0}")]
    #[diagnostic(code(realpx::io))]
    IoError(#[from] std::io::Error),

    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(realpx::io))]
    Io {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Parse error: {message}")]
    #[diagnostic(code(realpx::parse))]
    Parse {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Config error: {message}")]
    #[diagnostic(code(realpx::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Invalid region: {message}")]
    #[diagnostic(code(realpx::region))]
    InvalidRegion {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Invalid grid: {message}")]
    #[diagnostic(code(realpx::grid))]
    InvalidGrid {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Empty output: {message}")]
    #[diagnostic(
        code(realpx::empty_output),
        help("Reduce the cell size or offset, or select a larger region")
    )]
    EmptyOutput { message: String },

    #[error("Unsupported bit depth: {depth}")]
    #[diagnostic(
        code(realpx::bit_depth),
        help("Supported bit depths are 1, 2, 4 and 8 bits per channel")
    )]
    UnsupportedBitDepth { depth: u32 },

    #[error("Failed to decode {path}: {message}")]
    #[diagnostic(code(realpx::decode))]
    Decode {
        path: std::path::PathBuf,
        message: String,
    },
}

impl PxError {
    /// Process exit code for this error kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            PxError::IoError(_) | PxError::Io { .. } => 1,
            PxError::Parse { .. } | PxError::Config { .. } => 2,
            PxError::InvalidRegion { .. } => 3,
            PxError::InvalidGrid { .. } => 4,
            PxError::EmptyOutput { .. } => 5,
            PxError::UnsupportedBitDepth { .. } => 6,
            PxError::Decode { .. } => 7,
        }
    }

    pub(crate) fn region(message: impl Into<String>) -> Self {
        PxError::InvalidRegion {
            message: message.into(),
            help: None,
        }
    }

    pub(crate) fn grid(message: impl Into<String>) -> Self {
        PxError::InvalidGrid {
            message: message.into(),
            help: None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PxError>;
