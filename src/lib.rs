/// Remeshing algorithm
pub mod algorithm;
/// Command line front end
pub mod cli;
/// Meshing engine, session and mesh files
pub mod engine;
/// Error types
pub mod error;
/// Interactive rebuild loop
pub mod interactive;
/// Tunable parameters
pub mod params;
/// Triangulated input surface
pub mod surface3d;
pub use error::{RemeshError, Result};
