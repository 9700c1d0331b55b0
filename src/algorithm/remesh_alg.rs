use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::engine::{msh, ClassifyOptions, Engine, MeshSummary, Session, SizeField, SizeStrategy};
use crate::error::{RemeshError, Result};
use crate::params::{defaults, ParameterStore};
use crate::surface3d::io;

/// Curve splitting angle, effectively disabled
const CURVE_ANGLE_DEG: f64 = 180.0;
/// Size of the constant background field
const CONSTANT_SIZE: f64 = 4.0;

/// Size strategy of a remeshing program
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Variant {
    /// Background MathEval field, chosen from the parameters
    Field,
    /// One explicit size on every point, surfaces recombined first
    Sized { element_size: f64 },
}

impl Variant {
    /// Parameter store with this variant's declarations and defaults
    pub fn default_parameters(&self) -> Result<ParameterStore> {
        match self {
            Variant::Field => defaults::field_parameters(),
            Variant::Sized { .. } => defaults::sized_parameters(),
        }
    }

    fn force_parametrizable_param(&self) -> &'static str {
        match self {
            Variant::Field => defaults::FORCE_PARAMETRIZABLE,
            Variant::Sized { .. } => defaults::FORCE_PARAMETRIZABLE_SIZED,
        }
    }
}

/// Paths and variant of a remeshing run, fixed for the whole process
#[derive(Debug, Clone, PartialEq)]
pub struct RemeshJob {
    pub input: PathBuf,
    pub output_prefix: PathBuf,
    pub variant: Variant,
}

impl RemeshJob {
    pub fn new(input: impl Into<PathBuf>, output_prefix: impl Into<PathBuf>, variant: Variant) -> RemeshJob {
        RemeshJob {
            input: input.into(),
            output_prefix: output_prefix.into(),
            variant,
        }
    }

    /// `<output_prefix>.msh`
    pub fn output_path(&self) -> PathBuf {
        let mut path: OsString = self.output_prefix.clone().into_os_string();
        path.push(".msh");
        PathBuf::from(path)
    }
}

/// Outcome of a successful build
#[derive(Debug, Clone, PartialEq)]
pub struct BuildReport {
    pub output: PathBuf,
    pub summary: MeshSummary,
    pub size: SizeStrategy,
}

/// Geometry and mesh builder
///
/// Owns the engine and the single live model session. Each call to
/// [`Remesher::build`] starts from an empty session.
pub struct Remesher<E: Engine> {
    engine: E,
    job: RemeshJob,
    session: Session,
}

fn output_dir(output: &Path) -> Result<PathBuf> {
    let dir = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if !dir.is_dir() {
        return Err(RemeshError::output(output, format!("`{}` is not a directory", dir.display())));
    }
    Ok(dir)
}

impl<E: Engine> Remesher<E> {
    pub fn new(engine: E, job: RemeshJob) -> Remesher<E> {
        Remesher {
            engine,
            job,
            session: Session::new(),
        }
    }

    pub fn job(&self) -> &RemeshJob {
        &self.job
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Classifies, reconstructs and meshes the input, then writes `<prefix>.msh`
    ///
    /// The mesh is written to a temporary file next to the target and only
    /// renamed once it has been read back with volume elements, so a failed
    /// build leaves no file at the target path.
    pub fn build(&mut self, params: &ParameterStore) -> Result<BuildReport> {
        self.session.clear();
        let job = &self.job;

        if let Variant::Sized { element_size } = job.variant {
            if !(element_size.is_finite() && element_size > 0.0) {
                return Err(RemeshError::Meshing(format!(
                    "element size must be positive, got {}",
                    element_size
                )));
            }
        }

        let output = job.output_path();
        let dir = output_dir(&output)?;

        let surface = io::load_stl(&job.input)?;
        surface.check_closed()?;
        log::info!(
            "{}: {} vertices, {} triangles",
            job.input.display(),
            surface.get_nb_vertices(),
            surface.get_nb_faces()
        );

        let angle = params.get_number(defaults::ANGLE)?;
        let force_parametrizable = params.get_bool(job.variant.force_parametrizable_param())?;

        self.session.merge(&job.input);
        if let Variant::Sized { .. } = job.variant {
            let surfaces = self.session.entities(2)?;
            self.session.recombine(surfaces)?;
        }

        self.session.classify_surfaces(ClassifyOptions {
            angle: angle.to_radians(),
            include_boundary: true,
            force_parametrizable,
            curve_angle: CURVE_ANGLE_DEG.to_radians(),
        })?;
        self.session.create_geometry()?;

        let surfaces = self.session.entities(2)?;
        let surface_loop = self.session.add_surface_loop(surfaces)?;
        self.session.add_volume(&[surface_loop])?;
        self.session.synchronize();

        match job.variant {
            Variant::Field => {
                let field = if params.get_bool(defaults::FUNNY_FIELD)? {
                    SizeField::Sinusoidal
                } else {
                    SizeField::Constant(CONSTANT_SIZE)
                };
                if let Some((lo, hi)) = field.range(surface.vertices()) {
                    log::debug!("target size on input vertices in [{}, {}]", lo, hi);
                }
                let tag = self.session.add_field(field)?;
                self.session.set_background_field(tag)?;
            }
            Variant::Sized { element_size } => {
                let points = self.session.entities(0)?;
                self.session.set_size(points, element_size)?;
            }
        }

        self.session.generate(3)?;

        let tmp = tempfile::Builder::new()
            .prefix(".remesh")
            .suffix(".msh")
            .tempfile_in(&dir)
            .map_err(|e| RemeshError::output(&output, e))?;
        self.session.write(tmp.path())?;

        log::info!(
            "meshing with {} (angle {}°, parametrizable {})",
            self.engine.name(),
            angle,
            force_parametrizable
        );
        self.engine.execute(&self.session)?;

        let summary = msh::read_summary(tmp.path())?;
        if summary.nb_elements_of_dim(3) == 0 {
            return Err(RemeshError::Meshing(
                "engine produced no volume elements".to_string(),
            ));
        }

        tmp.persist(&output)
            .map_err(|e| RemeshError::output(&output, e.error))?;

        let size = self
            .session
            .size_strategy()
            .ok_or_else(|| RemeshError::Meshing("no element sizing".to_string()))?;
        log::info!(
            "wrote {}: {} nodes, {} elements ({} tetrahedra)",
            output.display(),
            summary.nb_nodes,
            summary.nb_elements(),
            summary.nb_tetrahedra()
        );

        Ok(BuildReport {
            output,
            summary,
            size,
        })
    }
}
