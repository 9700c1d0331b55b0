/// Remeshing of a triangulated surface into a volume mesh
pub mod remesh_alg;
