use nalgebra::base::*;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{RemeshError, Result};
use crate::surface3d::TriangleSurface;

/// Vertex merge distance, relative to the bounding box diagonal
const WELD_TOLERANCE: f64 = 1e-8;

/// Loads an STL file (ASCII or binary) as a triangulated surface
///
/// Vertices closer than a tolerance scaled to the bounding box are welded,
/// `stl_io` only merges bit-identical coordinates.
pub fn load_stl(path: &Path) -> Result<TriangleSurface> {
    let file = File::open(path).map_err(|e| RemeshError::input(path, e))?;
    let mut reader = BufReader::new(file);

    let stl = stl_io::read_stl(&mut reader)
        .map_err(|e| RemeshError::input(path, format!("not a readable STL triangulation ({})", e)))?;

    log::debug!(
        "{}: {} vertices, {} triangles",
        path.display(),
        stl.vertices.len(),
        stl.faces.len()
    );

    let mut surface = TriangleSurface::new();
    for v in stl.vertices.iter() {
        surface.add_vertex(&Vector3::new(v.0[0] as f64, v.0[1] as f64, v.0[2] as f64));
    }

    let mut nb_degenerate = 0;
    for face in stl.faces.iter() {
        let [a, b, c] = face.vertices;
        if surface.add_face(a, b, c).is_err() {
            nb_degenerate += 1;
        }
    }
    if nb_degenerate > 0 {
        log::warn!(
            "{}: dropped {} degenerate triangle(s)",
            path.display(),
            nb_degenerate
        );
    }

    if let Some((lo, hi)) = surface.bounding_box() {
        log::debug!(
            "{}: bounding box [{}, {}, {}] - [{}, {}, {}]",
            path.display(),
            lo[0],
            lo[1],
            lo[2],
            hi[0],
            hi[1],
            hi[2]
        );
        let nb_welded = surface.weld_vertices(WELD_TOLERANCE * (hi - lo).norm());
        if nb_welded > 0 {
            log::info!("{}: welded {} duplicate vertices", path.display(), nb_welded);
        }
    }

    if surface.get_nb_faces() == 0 {
        return Err(RemeshError::input(path, "no usable triangles"));
    }

    Ok(surface)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface3d::triangle_surface::tests::unit_cube;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn ascii_stl(surface: &TriangleSurface) -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(".stl").unwrap();
        writeln!(file, "solid cube").unwrap();
        for f in 0..surface.get_nb_faces() {
            let face = surface.get_face(f).unwrap();
            writeln!(file, "  facet normal 0 0 0").unwrap();
            writeln!(file, "    outer loop").unwrap();
            for &v in face.iter() {
                let p = surface.get_vertex(v).unwrap();
                writeln!(file, "      vertex {} {} {}", p[0], p[1], p[2]).unwrap();
            }
            writeln!(file, "    endloop").unwrap();
            writeln!(file, "  endfacet").unwrap();
        }
        writeln!(file, "endsolid cube").unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn load_cube_merges_vertices() {
        let file = ascii_stl(&unit_cube());
        let surface = load_stl(file.path()).unwrap();
        assert_eq!(surface.get_nb_vertices(), 8);
        assert_eq!(surface.get_nb_faces(), 12);
        assert!(surface.check_closed().is_ok());
    }

    #[test]
    fn negative_zero_vertices_are_welded() {
        let cube = ascii_stl(&unit_cube());
        // first corner written as -0 once
        let text = std::fs::read_to_string(cube.path())
            .unwrap()
            .replacen("vertex 0 0 0", "vertex -0 0 0", 1);
        let mut file = NamedTempFile::with_suffix(".stl").unwrap();
        write!(file, "{}", text).unwrap();
        file.flush().unwrap();

        let surface = load_stl(file.path()).unwrap();
        assert_eq!(surface.get_nb_vertices(), 8);
        assert_eq!(surface.get_nb_faces(), 12);
        assert!(surface.check_closed().is_ok());
    }

    #[test]
    fn missing_file_is_an_input_error() {
        let err = load_stl(Path::new("/nonexistent/surface.stl")).unwrap_err();
        assert!(matches!(err, RemeshError::Input { .. }));
    }

    #[test]
    fn garbage_is_an_input_error() {
        let mut file = NamedTempFile::with_suffix(".stl").unwrap();
        writeln!(file, "this is not a triangulation").unwrap();
        file.flush().unwrap();
        let err = load_stl(file.path()).unwrap_err();
        assert!(matches!(err, RemeshError::Input { .. }));
    }
}
