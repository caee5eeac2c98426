use std::path::PathBuf;
use thiserror::Error;

/// Result type returned by script lifecycle hooks.
pub type ScriptResult = Result<(), ScriptError>;

/// Failure raised by a script implementation.
///
/// The dispatcher logs it as `kind: message` and carries on.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("{0}")]
    InvalidState(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ScriptError {
    pub fn invalid_state(message: impl Into<String>) -> Self {
        ScriptError::InvalidState(message.into())
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        ScriptError::InvalidArgument(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ScriptError::NotFound(message.into())
    }

    /// Short failure category used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            ScriptError::InvalidState(_) => "InvalidState",
            ScriptError::InvalidArgument(_) => "InvalidArgument",
            ScriptError::NotFound(_) => "NotFound",
            ScriptError::Other(_) => "Error",
        }
    }
}

/// Errors produced while resolving, loading, or instantiating script types.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("missing create arguments")]
    MissingArgs,

    #[error("missing type name")]
    MissingTypeName,

    #[error("type '{type_name}' not found")]
    TypeNotFound { type_name: String },

    #[error("type '{type_name}' is not a ScriptComponent")]
    NotAComponent { type_name: String },

    #[error("constructing '{type_name}' failed: {kind}: {message}")]
    Construction {
        type_name: String,
        kind: String,
        message: String,
    },

    #[error("failed to load module '{}': {message}", .path.display())]
    ModuleLoad { path: PathBuf, message: String },

    #[error("module '{}' does not export the script module entry point", .path.display())]
    MissingEntryPoint { path: PathBuf },

    #[error(
        "module '{}' targets script ABI v{found}, bridge expects v{expected}",
        .path.display()
    )]
    AbiMismatch {
        path: PathBuf,
        expected: u32,
        found: u32,
    },

    #[error("module '{}' exported an invalid type table", .path.display())]
    InvalidTypeTable { path: PathBuf },
}

impl BridgeError {
    /// Short failure category used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            BridgeError::MissingArgs | BridgeError::MissingTypeName => "InvalidArgument",
            BridgeError::TypeNotFound { .. } => "TypeNotFound",
            BridgeError::NotAComponent { .. } => "InvalidCast",
            BridgeError::Construction { .. } => "Construction",
            BridgeError::ModuleLoad { .. } => "ModuleLoad",
            BridgeError::MissingEntryPoint { .. } => "EntryPointNotFound",
            BridgeError::AbiMismatch { .. } => "AbiMismatch",
            BridgeError::InvalidTypeTable { .. } => "InvalidTypeTable",
        }
    }
}
