use std::path::{Path, PathBuf};

use crate::engine::size_field::{SizeField, SizeStrategy};
use crate::error::{RemeshError, Result};

/// Every entity of one dimension in the model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntitySet {
    pub dim: u8,
}

/// Arguments of surface classification, angles in radians
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifyOptions {
    pub angle: f64,
    pub include_boundary: bool,
    pub force_parametrizable: bool,
    pub curve_angle: f64,
}

/// One operation recorded for the meshing engine
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Merge(PathBuf),
    Recombine(EntitySet),
    ClassifySurfaces(ClassifyOptions),
    CreateGeometry,
    AddSurfaceLoop { tag: i32, surfaces: EntitySet },
    AddVolume { tag: i32, loops: Vec<i32> },
    Synchronize,
    AddField { tag: i32, field: SizeField },
    SetBackgroundField(i32),
    SetSize { points: EntitySet, size: f64 },
    Generate(u8),
    Write(PathBuf),
}

/// Model session: the ordered operations describing one geometry and mesh
///
/// Owned by the builder and replaced before each build, so nothing from a
/// previous parameter set survives. Operations are checked for order as
/// they are recorded.
#[derive(Debug, Clone, Default)]
pub struct Session {
    operations: Vec<Operation>,
    loops: Vec<i32>,
    volumes: Vec<i32>,
    fields: Vec<i32>,
    has_input: bool,
    classified: bool,
    has_geometry: bool,
    synchronized: bool,
    generated: Option<u8>,
}

fn out_of_order(what: &str, needs: &str) -> RemeshError {
    RemeshError::Meshing(format!("{} requires {}", what, needs))
}

impl Session {
    pub fn new() -> Session {
        Session::default()
    }

    /// Drops every recorded entity and operation
    pub fn clear(&mut self) {
        *self = Session::new();
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn volumes(&self) -> &[i32] {
        &self.volumes
    }

    /// Loads a triangulation into the model
    pub fn merge(&mut self, path: &Path) {
        self.operations.push(Operation::Merge(path.to_path_buf()));
        self.has_input = true;
    }

    /// All entities of dimension `dim`
    pub fn entities(&self, dim: u8) -> Result<EntitySet> {
        if dim > 3 {
            return Err(RemeshError::Meshing(format!("no entities of dimension {}", dim)));
        }
        Ok(EntitySet { dim })
    }

    /// Requests recombined (quad-dominant) triangulation of surfaces
    pub fn recombine(&mut self, surfaces: EntitySet) -> Result<()> {
        if !self.has_input {
            return Err(out_of_order("recombine", "a merged triangulation"));
        }
        if surfaces.dim != 2 {
            return Err(RemeshError::Meshing("only surfaces can be recombined".to_string()));
        }
        self.operations.push(Operation::Recombine(surfaces));
        Ok(())
    }

    pub fn classify_surfaces(&mut self, options: ClassifyOptions) -> Result<()> {
        if !self.has_input {
            return Err(out_of_order("surface classification", "a merged triangulation"));
        }
        if !options.angle.is_finite() || options.angle <= 0.0 || !options.curve_angle.is_finite() {
            return Err(RemeshError::Meshing(format!(
                "invalid classification angles {} / {}",
                options.angle, options.curve_angle
            )));
        }
        self.operations.push(Operation::ClassifySurfaces(options));
        self.classified = true;
        Ok(())
    }

    /// Reconstructs curves and surfaces from the classified patches
    pub fn create_geometry(&mut self) -> Result<()> {
        if !self.classified {
            return Err(out_of_order("geometry creation", "classified surfaces"));
        }
        self.operations.push(Operation::CreateGeometry);
        self.has_geometry = true;
        Ok(())
    }

    pub fn add_surface_loop(&mut self, surfaces: EntitySet) -> Result<i32> {
        if !self.has_geometry {
            return Err(out_of_order("a surface loop", "reconstructed geometry"));
        }
        if surfaces.dim != 2 {
            return Err(RemeshError::Meshing("a surface loop is made of surfaces".to_string()));
        }
        let tag = self.loops.len() as i32 + 1;
        self.operations.push(Operation::AddSurfaceLoop { tag, surfaces });
        self.loops.push(tag);
        self.synchronized = false;
        Ok(tag)
    }

    pub fn add_volume(&mut self, loops: &[i32]) -> Result<i32> {
        if loops.is_empty() {
            return Err(out_of_order("a volume", "at least one surface loop"));
        }
        if let Some(missing) = loops.iter().find(|l| !self.loops.contains(*l)) {
            return Err(RemeshError::Meshing(format!("unknown surface loop {}", missing)));
        }
        let tag = self.volumes.len() as i32 + 1;
        self.operations.push(Operation::AddVolume {
            tag,
            loops: loops.to_vec(),
        });
        self.volumes.push(tag);
        self.synchronized = false;
        Ok(tag)
    }

    /// Makes the geometric entities visible to the mesher
    pub fn synchronize(&mut self) {
        self.operations.push(Operation::Synchronize);
        self.synchronized = true;
    }

    pub fn add_field(&mut self, field: SizeField) -> Result<i32> {
        if let SizeField::Constant(v) = field {
            if !(v.is_finite() && v > 0.0) {
                return Err(RemeshError::Meshing(format!("constant size field must be positive, got {}", v)));
            }
        }
        let tag = self.fields.len() as i32 + 1;
        self.operations.push(Operation::AddField { tag, field });
        self.fields.push(tag);
        Ok(tag)
    }

    /// Uses a field as the background size; replaces any earlier sizing
    pub fn set_background_field(&mut self, tag: i32) -> Result<()> {
        if !self.fields.contains(&tag) {
            return Err(RemeshError::Meshing(format!("unknown field {}", tag)));
        }
        self.drop_sizing();
        self.operations.push(Operation::SetBackgroundField(tag));
        Ok(())
    }

    /// Prescribes one size on points; replaces any earlier sizing
    pub fn set_size(&mut self, points: EntitySet, size: f64) -> Result<()> {
        if points.dim != 0 {
            return Err(RemeshError::Meshing("sizes are prescribed on points".to_string()));
        }
        if !(size.is_finite() && size > 0.0) {
            return Err(RemeshError::Meshing(format!("element size must be positive, got {}", size)));
        }
        self.drop_sizing();
        self.operations.push(Operation::SetSize { points, size });
        Ok(())
    }

    fn drop_sizing(&mut self) {
        let before = self.operations.len();
        self.operations
            .retain(|op| !matches!(op, Operation::SetBackgroundField(_) | Operation::SetSize { .. }));
        if self.operations.len() != before {
            log::debug!("previous sizing replaced");
        }
    }

    /// Sizing currently in effect
    pub fn size_strategy(&self) -> Option<SizeStrategy> {
        self.operations.iter().find_map(|op| match op {
            Operation::SetSize { size, .. } => Some(SizeStrategy::Explicit(*size)),
            Operation::SetBackgroundField(tag) => self.operations.iter().find_map(|o| match o {
                Operation::AddField { tag: t, field } if t == tag => Some(SizeStrategy::Background(*field)),
                _ => None,
            }),
            _ => None,
        })
    }

    pub fn generate(&mut self, dim: u8) -> Result<()> {
        if !self.synchronized {
            return Err(out_of_order("mesh generation", "a synchronized model"));
        }
        if dim == 3 && self.volumes.is_empty() {
            return Err(out_of_order("volume meshing", "a defined volume"));
        }
        if dim == 0 || dim > 3 {
            return Err(RemeshError::Meshing(format!("cannot generate a mesh of dimension {}", dim)));
        }
        self.operations.push(Operation::Generate(dim));
        self.generated = Some(dim);
        Ok(())
    }

    pub fn write(&mut self, path: &Path) -> Result<()> {
        if self.generated.is_none() {
            return Err(out_of_order("writing", "a generated mesh"));
        }
        self.operations.push(Operation::Write(path.to_path_buf()));
        Ok(())
    }

    /// Path of the last write operation
    pub fn output(&self) -> Option<&Path> {
        self.operations.iter().rev().find_map(|op| match op {
            Operation::Write(p) => Some(p.as_path()),
            _ => None,
        })
    }
}
