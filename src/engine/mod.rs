use thiserror::Error;

use crate::error::RemeshError;

/// gmsh backend
pub mod gmsh;
/// Written mesh summary
pub mod msh;
/// Model session
pub mod session;
/// Size fields
pub mod size_field;
pub use gmsh::GmshEngine;
pub use msh::MeshSummary;
pub use session::{ClassifyOptions, EntitySet, Operation, Session};
pub use size_field::{SizeField, SizeStrategy};

/// Failure reported by a meshing engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("meshing engine `{program}` is unavailable: {source}")]
    Unavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("meshing engine failed ({status}): {}", messages.join("; "))]
    Failed { status: String, messages: Vec<String> },
    #[error("session cannot be executed: {0}")]
    Session(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<EngineError> for RemeshError {
    fn from(e: EngineError) -> RemeshError {
        RemeshError::Meshing(e.to_string())
    }
}

/// External geometry and meshing engine
///
/// Executing a session performs every recorded operation in order,
/// including writing the mesh to the session's output path.
pub trait Engine {
    fn name(&self) -> &str;

    fn execute(&mut self, session: &Session) -> Result<(), EngineError>;
}

impl<E: Engine + ?Sized> Engine for &mut E {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn execute(&mut self, session: &Session) -> Result<(), EngineError> {
        (**self).execute(session)
    }
}
