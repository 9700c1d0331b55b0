#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use stl_remesh::engine::{Engine, EngineError, Session};

/// Unit cube corners, corner `i` at (bit 0, bit 1, bit 2) of `i`
pub fn cube_corner(i: usize, scale: f64) -> [f64; 3] {
    [
        (i & 1) as f64 * scale,
        ((i >> 1) & 1) as f64 * scale,
        ((i >> 2) & 1) as f64 * scale,
    ]
}

/// Outward oriented triangles of the cube, two per side
pub const CUBE_FACES: [[usize; 3]; 12] = [
    [0, 2, 1],
    [1, 2, 3],
    [4, 5, 6],
    [5, 7, 6],
    [0, 1, 4],
    [1, 5, 4],
    [2, 6, 3],
    [3, 6, 7],
    [0, 4, 2],
    [2, 4, 6],
    [1, 3, 5],
    [3, 7, 5],
];

pub fn write_ascii_stl(path: &Path, faces: &[[usize; 3]], scale: f64) {
    let mut text = String::from("solid cube\n");
    for face in faces {
        text.push_str("  facet normal 0 0 0\n    outer loop\n");
        for &v in face {
            let p = cube_corner(v, scale);
            text.push_str(&format!("      vertex {} {} {}\n", p[0], p[1], p[2]));
        }
        text.push_str("    endloop\n  endfacet\n");
    }
    text.push_str("endsolid cube\n");
    fs::write(path, text).unwrap();
}

/// Writes the closed unit cube and returns its path
pub fn cube_stl(dir: &Path) -> PathBuf {
    let path = dir.join("cube.stl");
    write_ascii_stl(&path, &CUBE_FACES, 1.0);
    path
}

/// Cube with one missing triangle
pub fn open_cube_stl(dir: &Path) -> PathBuf {
    let path = dir.join("open.stl");
    write_ascii_stl(&path, &CUBE_FACES[..11], 1.0);
    path
}

/// Unit cube split into 6 tetrahedra along the 1-8 diagonal, 6 surfaces
pub const CUBE_MESH: &str = "$MeshFormat
2.2 0 8
$EndMeshFormat
$Nodes
8
1 0 0 0
2 1 0 0
3 0 1 0
4 1 1 0
5 0 0 1
6 1 0 1
7 0 1 1
8 1 1 1
$EndNodes
$Elements
18
1 2 2 0 1 1 3 2
2 2 2 0 1 2 3 4
3 2 2 0 2 5 6 7
4 2 2 0 2 6 8 7
5 2 2 0 3 1 2 5
6 2 2 0 3 2 6 5
7 2 2 0 4 3 7 4
8 2 2 0 4 4 7 8
9 2 2 0 5 1 5 3
10 2 2 0 5 3 5 7
11 2 2 0 6 2 4 6
12 2 2 0 6 4 8 6
13 4 2 0 1 1 2 4 8
14 4 2 0 1 1 4 3 8
15 4 2 0 1 1 3 7 8
16 4 2 0 1 1 7 5 8
17 4 2 0 1 1 5 6 8
18 4 2 0 1 1 6 2 8
$EndElements
";

/// Same cube, surfaces only
pub fn surface_only_mesh() -> String {
    let mut lines: Vec<&str> = CUBE_MESH
        .lines()
        .filter(|l| !(l.split_whitespace().nth(1) == Some("4") && l.split_whitespace().count() == 9))
        .collect();
    let count = lines.iter().position(|l| *l == "18").unwrap();
    lines[count] = "12";
    lines.join("\n") + "\n"
}

/// Engine writing a canned mesh instead of running a mesher
pub struct FakeEngine {
    pub runs: Vec<Session>,
    pub mesh: String,
    pub fail: bool,
}

impl FakeEngine {
    pub fn new() -> FakeEngine {
        FakeEngine {
            runs: Vec::new(),
            mesh: CUBE_MESH.to_string(),
            fail: false,
        }
    }

    pub fn failing() -> FakeEngine {
        FakeEngine {
            fail: true,
            ..FakeEngine::new()
        }
    }
}

impl Engine for FakeEngine {
    fn name(&self) -> &str {
        "fake"
    }

    fn execute(&mut self, session: &Session) -> Result<(), EngineError> {
        self.runs.push(session.clone());
        let output = session
            .output()
            .ok_or_else(|| EngineError::Session("no output".to_string()))?;
        if self.fail {
            // half written file, as a crashing mesher would leave it
            fs::write(output, "$MeshFormat\n2.2 0 8\n")?;
            return Err(EngineError::Failed {
                status: "exit status: 1".to_string(),
                messages: vec!["No tetrahedra in region 1".to_string()],
            });
        }
        fs::write(output, &self.mesh)?;
        Ok(())
    }
}

/// Names of the entries of a directory, sorted
pub fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
