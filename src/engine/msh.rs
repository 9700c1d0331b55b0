//! Summary reader for the `.msh` files written by the engine.
//!
//! Only ASCII version 2.2 is read; the gmsh backend forces that format.
//! Node coordinates and connectivity are checked for shape, not kept.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use crate::error::{RemeshError, Result};

/// Counts read back from a written mesh
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MeshSummary {
    pub version: String,
    pub nb_nodes: usize,
    /// Element count per gmsh element type
    pub elements_by_type: BTreeMap<u32, usize>,
    /// Geometric entity tags carrying elements, per dimension
    pub entities: [BTreeSet<i64>; 4],
}

/// Dimension and node count of a gmsh element type
fn element_info(elem_type: u32) -> Option<(usize, usize)> {
    match elem_type {
        1 => Some((1, 2)),   // line
        2 => Some((2, 3)),   // triangle
        3 => Some((2, 4)),   // quad
        4 => Some((3, 4)),   // tet
        5 => Some((3, 8)),   // hex
        6 => Some((3, 6)),   // prism
        7 => Some((3, 5)),   // pyramid
        8 => Some((1, 3)),   // second order line
        9 => Some((2, 6)),   // second order triangle
        10 => Some((2, 9)),  // second order quad
        11 => Some((3, 10)), // second order tet
        15 => Some((0, 1)),  // point
        16 => Some((2, 8)),  // serendipity quad
        _ => None,
    }
}

fn parse_err(msg: impl Into<String>) -> RemeshError {
    RemeshError::Meshing(format!("malformed mesh file: {}", msg.into()))
}

fn parse_count(line: Option<&str>, what: &str) -> Result<usize> {
    let line = line.ok_or_else(|| parse_err(format!("missing {} count", what)))?;
    line.trim()
        .parse::<usize>()
        .map_err(|_| parse_err(format!("invalid {} count: {}", what, line)))
}

fn expect_end<'a, I: Iterator<Item = &'a str>>(lines: &mut I, tag: &str) -> Result<()> {
    match lines.next() {
        Some(l) if l.trim() == tag => Ok(()),
        _ => Err(parse_err(format!("missing {}", tag))),
    }
}

impl MeshSummary {
    pub fn nb_elements(&self) -> usize {
        self.elements_by_type.values().sum()
    }

    pub fn nb_elements_of_dim(&self, dim: usize) -> usize {
        self.elements_by_type
            .iter()
            .filter(|(t, _)| element_info(**t).map(|(d, _)| d) == Some(dim))
            .map(|(_, &n)| n)
            .sum()
    }

    pub fn nb_tetrahedra(&self) -> usize {
        [4u32, 11u32]
            .iter()
            .map(|t| self.elements_by_type.get(t).copied().unwrap_or(0))
            .sum()
    }

    /// Highest dimension carrying elements
    pub fn dimension(&self) -> Option<usize> {
        (0..4).rev().find(|&d| self.nb_elements_of_dim(d) > 0)
    }

    /// Number of geometric entities of a dimension that carry elements
    pub fn nb_entities(&self, dim: usize) -> usize {
        self.entities.get(dim).map(BTreeSet::len).unwrap_or(0)
    }

    /// Parses the text of an ASCII 2.2 mesh file
    pub fn parse(contents: &str) -> Result<MeshSummary> {
        let mut lines = contents.lines();
        let mut summary = MeshSummary::default();
        let mut version: Option<String> = None;

        while let Some(line) = lines.next() {
            match line.trim() {
                "$MeshFormat" => {
                    let format_line = lines.next().ok_or_else(|| parse_err("missing MeshFormat"))?;
                    let mut parts = format_line.split_whitespace();
                    let v = parts.next().ok_or_else(|| parse_err("missing mesh format version"))?;
                    let file_type = parts.next().ok_or_else(|| parse_err("missing mesh format type"))?;
                    if file_type != "0" {
                        return Err(parse_err("binary .msh files are not supported"));
                    }
                    version = Some(v.to_string());
                    expect_end(&mut lines, "$EndMeshFormat")?;
                }
                "$Nodes" => {
                    let nb_nodes = parse_count(lines.next(), "node")?;
                    for _ in 0..nb_nodes {
                        let node_line = lines.next().ok_or_else(|| parse_err("unexpected end of node list"))?;
                        let nb_fields = node_line.split_whitespace().count();
                        if nb_fields != 4 {
                            return Err(parse_err(format!("invalid node line: {}", node_line)));
                        }
                    }
                    summary.nb_nodes = nb_nodes;
                    expect_end(&mut lines, "$EndNodes")?;
                }
                "$Elements" => {
                    let nb_elements = parse_count(lines.next(), "element")?;
                    for _ in 0..nb_elements {
                        let elem_line = lines
                            .next()
                            .ok_or_else(|| parse_err("unexpected end of element list"))?;
                        let fields: Vec<&str> = elem_line.split_whitespace().collect();
                        if fields.len() < 3 {
                            return Err(parse_err(format!("invalid element line: {}", elem_line)));
                        }
                        let elem_type = fields[1]
                            .parse::<u32>()
                            .map_err(|_| parse_err(format!("invalid element type: {}", fields[1])))?;
                        let (dim, nb_elem_nodes) = element_info(elem_type)
                            .ok_or_else(|| parse_err(format!("unsupported element type: {}", elem_type)))?;
                        let nb_tags = fields[2]
                            .parse::<usize>()
                            .map_err(|_| parse_err(format!("invalid tag count: {}", fields[2])))?;
                        if fields.len() != 3 + nb_tags + nb_elem_nodes {
                            return Err(parse_err(format!("invalid element line: {}", elem_line)));
                        }
                        // tags are (physical, elementary, ...)
                        let entity = match nb_tags {
                            0 => None,
                            1 => Some(fields[3]),
                            _ => Some(fields[4]),
                        };
                        if let Some(entity) = entity {
                            let tag = entity
                                .parse::<i64>()
                                .map_err(|_| parse_err(format!("invalid entity tag: {}", entity)))?;
                            summary.entities[dim].insert(tag);
                        }
                        *summary.elements_by_type.entry(elem_type).or_insert(0) += 1;
                    }
                    expect_end(&mut lines, "$EndElements")?;
                }
                _ => {}
            }
        }

        let version = version.ok_or_else(|| parse_err("missing $MeshFormat"))?;
        if version != "2.2" {
            return Err(parse_err(format!("unsupported gmsh version: {}", version)));
        }
        summary.version = version;
        Ok(summary)
    }
}

/// Reads the summary of a mesh file on disk
pub fn read_summary(path: &Path) -> Result<MeshSummary> {
    let contents = fs::read_to_string(path)
        .map_err(|e| RemeshError::Meshing(format!("cannot read mesh `{}`: {}", path.display(), e)))?;
    MeshSummary::parse(&contents)
}
