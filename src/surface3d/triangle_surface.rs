use nalgebra::base::*;
use std::collections::HashMap;

use crate::error::{RemeshError, Result};

/// Surface vertex
pub type Vertex = Vector3<f64>;
/// Undirected edge, smallest index first
pub type Edge = [usize; 2];
/// Surface face (array of vertex indices)
pub type Face = [usize; 3];

#[derive(Clone, Debug, Default)]
/// Unstructured triangulated surface, as read from an STL file
pub struct TriangleSurface {
    pub(super) vertices: Vec<Vertex>,
    pub(super) faces: Vec<Face>,
}

/// Edge incidence counts of a surface
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EdgeReport {
    pub nb_edges: usize,
    pub nb_boundary: usize,
    pub nb_non_manifold: usize,
}

impl EdgeReport {
    pub fn is_closed(&self) -> bool {
        self.nb_boundary == 0 && self.nb_non_manifold == 0
    }
}

impl TriangleSurface {
    /// Empty surface constructor
    pub fn new() -> TriangleSurface {
        TriangleSurface {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Adds a vertex to the surface
    pub fn add_vertex(&mut self, point: &Vector3<f64>) -> usize {
        self.vertices.push(*point);
        self.vertices.len() - 1
    }

    /// Vertex getter
    pub fn get_vertex(&self, ind_vertex: usize) -> Result<Vertex> {
        self.vertices
            .get(ind_vertex)
            .copied()
            .ok_or_else(|| RemeshError::Meshing("get_vertex(): Index out of bounds".to_string()))
    }

    /// Iterates over vertex coordinates
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.iter()
    }

    /// Gets number of vertices
    pub fn get_nb_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Adds a face, rejecting out of range or repeated vertex indices
    pub fn add_face(&mut self, ind_vertex1: usize, ind_vertex2: usize, ind_vertex3: usize) -> Result<usize> {
        let face = [ind_vertex1, ind_vertex2, ind_vertex3];
        if face.iter().any(|&v| v >= self.vertices.len()) {
            return Err(RemeshError::Meshing(
                "add_face(): Vertex index out of bounds".to_string(),
            ));
        }
        if ind_vertex1 == ind_vertex2 || ind_vertex2 == ind_vertex3 || ind_vertex1 == ind_vertex3 {
            return Err(RemeshError::Meshing(format!(
                "add_face(): Degenerate face {:?}",
                face
            )));
        }
        self.faces.push(face);
        Ok(self.faces.len() - 1)
    }

    /// Face getter
    pub fn get_face(&self, ind_face: usize) -> Result<Face> {
        self.faces
            .get(ind_face)
            .copied()
            .ok_or_else(|| RemeshError::Meshing("get_face(): Index out of bounds".to_string()))
    }

    /// Gets number of faces
    pub fn get_nb_faces(&self) -> usize {
        self.faces.len()
    }

    /// Axis aligned bounding box, None for an empty surface
    pub fn bounding_box(&self) -> Option<(Vertex, Vertex)> {
        let first = self.vertices.first()?;
        Some(self.vertices.iter().fold((*first, *first), |(lo, hi), v| {
            (lo.inf(v), hi.sup(v))
        }))
    }

    /// Merges vertices closer than `epsilon`, returns the number of merged vertices
    ///
    /// Faces collapsed by the merge are dropped and unreferenced vertices
    /// removed. Vertices are bucketed in a grid of cell size `2 * epsilon`.
    pub fn weld_vertices(&mut self, epsilon: f64) -> usize {
        if self.vertices.is_empty() || !(epsilon > 0.0) {
            return 0;
        }

        let cell_size = 2.0 * epsilon;
        let cell = |v: &Vertex| {
            (
                (v[0] / cell_size).floor() as i64,
                (v[1] / cell_size).floor() as i64,
                (v[2] / cell_size).floor() as i64,
            )
        };
        let mut grid: HashMap<(i64, i64, i64), Vec<usize>> = HashMap::new();
        for (ind, v) in self.vertices.iter().enumerate() {
            grid.entry(cell(v)).or_default().push(ind);
        }

        // each vertex points to the smallest index of its cluster
        let mut remap: Vec<usize> = (0..self.vertices.len()).collect();
        let mut nb_merged = 0;
        for (ind, v) in self.vertices.iter().enumerate() {
            if remap[ind] != ind {
                continue;
            }
            let (cx, cy, cz) = cell(v);
            for dx in -1..=1 {
                for dy in -1..=1 {
                    for dz in -1..=1 {
                        let Some(candidates) = grid.get(&(cx + dx, cy + dy, cz + dz)) else {
                            continue;
                        };
                        for &other in candidates {
                            if other <= ind || remap[other] != other {
                                continue;
                            }
                            if (v - self.vertices[other]).norm() < epsilon {
                                remap[other] = ind;
                                nb_merged += 1;
                            }
                        }
                    }
                }
            }
        }
        if nb_merged == 0 {
            return 0;
        }

        let mut new_index = vec![usize::MAX; self.vertices.len()];
        let mut vertices = Vec::with_capacity(self.vertices.len() - nb_merged);
        for (ind, v) in self.vertices.iter().enumerate() {
            if remap[ind] == ind {
                new_index[ind] = vertices.len();
                vertices.push(*v);
            }
        }
        let faces = self
            .faces
            .iter()
            .map(|f| f.map(|ind| new_index[remap[ind]]))
            .filter(|&[a, b, c]| a != b && b != c && a != c)
            .collect();

        self.vertices = vertices;
        self.faces = faces;
        nb_merged
    }

    /// Counts how many faces share each undirected edge
    pub fn edge_report(&self) -> EdgeReport {
        let mut counts: HashMap<Edge, usize> = HashMap::new();
        for face in self.faces.iter() {
            for i in 0..3 {
                let (a, b) = (face[i], face[(i + 1) % 3]);
                let edge = if a < b { [a, b] } else { [b, a] };
                *counts.entry(edge).or_insert(0) += 1;
            }
        }

        counts.values().fold(
            EdgeReport {
                nb_edges: counts.len(),
                nb_boundary: 0,
                nb_non_manifold: 0,
            },
            |mut rep, &c| {
                if c == 1 {
                    rep.nb_boundary += 1;
                } else if c > 2 {
                    rep.nb_non_manifold += 1;
                }
                rep
            },
        )
    }

    /// Checks that the surface can bound a volume
    pub fn check_closed(&self) -> Result<()> {
        if self.faces.is_empty() {
            return Err(RemeshError::Meshing("surface has no triangles".to_string()));
        }
        let report = self.edge_report();
        if !report.is_closed() {
            return Err(RemeshError::Meshing(format!(
                "surface is not closed: {} boundary edge(s) and {} non-manifold edge(s) out of {}",
                report.nb_boundary, report.nb_non_manifold, report.nb_edges
            )));
        }
        Ok(())
    }
}
