/// Input functions
pub mod io;
/// Triangulated input surface
pub mod triangle_surface;
pub use triangle_surface::TriangleSurface;
