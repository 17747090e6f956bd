//! Error types for the OREP launcher.
//!
//! Every variant is fatal to the pipeline that raised it. The CLI maps each
//! kind to a distinct process exit code via [`LauncherError::exit_code`].

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the launcher.
#[derive(Debug, Error)]
pub enum LauncherError {
    // Pipeline errors
    #[error("could not find {}. Have you compiled?", .path.display())]
    Precondition { path: PathBuf },

    #[error(
        "cannot automatically determine whether {token} is running: \
         {count} candidate processes found"
    )]
    AmbiguousRegistryState {
        token: String,
        count: usize,
        /// Command lines of the matching processes.
        candidates: Vec<String>,
    },

    #[error("Process listing with {program} failed ({status}): {stderr}")]
    ProcessListing {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("Stub generation failed for {class_name}: {message}")]
    StubGeneration { class_name: String, message: String },

    #[error("Executable not found: {name}")]
    ExecutableNotFound { name: String },

    #[error("Failed to launch {}: {source}", .program.display())]
    Launch {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Input validation
    #[error("Invalid class name {name:?}: {reason}")]
    InvalidClassName { name: String, reason: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },
}

/// Result type alias for launcher operations.
pub type Result<T> = std::result::Result<T, LauncherError>;

impl From<std::io::Error> for LauncherError {
    fn from(err: std::io::Error) -> Self {
        LauncherError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for LauncherError {
    fn from(err: serde_json::Error) -> Self {
        LauncherError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl LauncherError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        LauncherError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Process exit code the orchestrator reports for this error.
    ///
    /// - 2: missing build artifact
    /// - 3: ambiguous registry state
    /// - 4: stub generation failed
    /// - 5: executable not resolvable
    /// - 6: child process could not be spawned
    /// - 7: process listing tool failed
    /// - 64: invalid input (class name, configuration)
    /// - 74: IO or settings file errors
    pub fn exit_code(&self) -> i32 {
        match self {
            LauncherError::Precondition { .. } => 2,
            LauncherError::AmbiguousRegistryState { .. } => 3,
            LauncherError::StubGeneration { .. } => 4,
            LauncherError::ExecutableNotFound { .. } => 5,
            LauncherError::Launch { .. } => 6,
            LauncherError::ProcessListing { .. } => 7,
            LauncherError::InvalidClassName { .. } | LauncherError::Config { .. } => 64,
            LauncherError::Io { .. } | LauncherError::Json { .. } => 74,
        }
    }
}
