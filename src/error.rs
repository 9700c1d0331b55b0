use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while declaring parameters, loading the input surface or
/// building the volume mesh.
#[derive(Debug, Error)]
pub enum RemeshError {
    /// Input surface is missing, unreadable or not a triangulation.
    #[error("input error on `{}`: {reason}", path.display())]
    Input { path: PathBuf, reason: String },
    /// Output location cannot be written.
    #[error("output error on `{}`: {reason}", path.display())]
    Output { path: PathBuf, reason: String },
    /// Parameter was never declared.
    #[error("parameter `{name}` is not declared")]
    NotFound { name: String },
    /// Parameter declared twice.
    #[error("parameter `{name}` is already declared")]
    AlreadyDeclared { name: String },
    /// Value rejected by the parameter's kind or constraints.
    #[error("invalid value for parameter `{name}`: {reason}")]
    Validation { name: String, reason: String },
    /// Classification, geometry or mesh generation failed.
    #[error("meshing error: {0}")]
    Meshing(String),
}

pub type Result<T> = std::result::Result<T, RemeshError>;

impl RemeshError {
    pub(crate) fn input(path: impl Into<PathBuf>, reason: impl ToString) -> RemeshError {
        RemeshError::Input {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn output(path: impl Into<PathBuf>, reason: impl ToString) -> RemeshError {
        RemeshError::Output {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn validation(name: &str, reason: impl ToString) -> RemeshError {
        RemeshError::Validation {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }
}
