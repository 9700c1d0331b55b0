use std::ffi::OsString;
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::Path;
use std::process::Command;

use crate::engine::session::{Operation, Session};
use crate::engine::{Engine, EngineError};

/// Runs sessions through the `gmsh` executable as `.geo` scripts
#[derive(Debug, Clone)]
pub struct GmshEngine {
    executable: OsString,
}

impl Default for GmshEngine {
    fn default() -> GmshEngine {
        GmshEngine::new()
    }
}

/// Quoted string literal for the `.geo` language
///
/// Relative paths are resolved against the current directory, since gmsh
/// resolves them against the directory of the script.
fn geo_string(path: &Path) -> String {
    let path = match std::env::current_dir() {
        Ok(cwd) if path.is_relative() => cwd.join(path),
        _ => path.to_path_buf(),
    };
    let raw = path.to_string_lossy().replace('\\', "/");
    format!("\"{}\"", raw.replace('"', "\\\""))
}

fn entity_keyword(dim: u8) -> &'static str {
    match dim {
        0 => "Point",
        1 => "Curve",
        2 => "Surface",
        _ => "Volume",
    }
}

/// Translates a session into a `.geo` script
pub fn render_script(session: &Session) -> Result<String, EngineError> {
    if session.output().is_none() {
        return Err(EngineError::Session("nothing is written by this session".to_string()));
    }

    let mut script = String::new();
    // writes into a String cannot fail
    let _ = writeln!(script, "General.Terminal = 1;");
    let _ = writeln!(script, "Mesh.MshFileVersion = 2.2;");
    let _ = writeln!(script, "Mesh.Binary = 0;");

    for op in session.operations() {
        let _ = match op {
            Operation::Merge(path) => writeln!(script, "Merge {};", geo_string(path)),
            Operation::Recombine(set) => writeln!(script, "Recombine {}{{:}};", entity_keyword(set.dim)),
            Operation::ClassifySurfaces(o) => writeln!(
                script,
                "ClassifySurfaces{{{:.17}, {}, {}, {:.17}}};",
                o.angle, o.include_boundary as u8, o.force_parametrizable as u8, o.curve_angle
            ),
            Operation::CreateGeometry => writeln!(script, "CreateGeometry;"),
            Operation::AddSurfaceLoop { tag, surfaces } => writeln!(
                script,
                "Surface Loop({}) = {}{{:}};",
                tag,
                entity_keyword(surfaces.dim)
            ),
            Operation::AddVolume { tag, loops } => {
                let loops: Vec<String> = loops.iter().map(|l| l.to_string()).collect();
                writeln!(script, "Volume({}) = {{{}}};", tag, loops.join(", "))
            }
            // the .geo interpreter synchronizes implicitly
            Operation::Synchronize => writeln!(script, "// synchronize"),
            Operation::AddField { tag, field } => writeln!(
                script,
                "Field[{tag}] = MathEval;\nField[{tag}].F = \"{}\";",
                field.expression(),
                tag = tag
            ),
            Operation::SetBackgroundField(tag) => writeln!(script, "Background Field = {};", tag),
            // points of every volume, i.e. every point of the model
            Operation::SetSize { size, .. } => {
                writeln!(script, "MeshSize{{ PointsOf{{ Volume{{:}}; }} }} = {};", size)
            }
            Operation::Generate(dim) => writeln!(script, "Mesh {};", dim),
            Operation::Write(path) => writeln!(script, "Save {};", geo_string(path)),
        };
    }

    Ok(script)
}

impl GmshEngine {
    /// Uses `gmsh` from `PATH`
    pub fn new() -> GmshEngine {
        GmshEngine::with_executable("gmsh")
    }

    pub fn with_executable(executable: impl Into<OsString>) -> GmshEngine {
        GmshEngine {
            executable: executable.into(),
        }
    }

    fn program(&self) -> String {
        self.executable.to_string_lossy().into_owned()
    }
}

impl Engine for GmshEngine {
    fn name(&self) -> &str {
        "gmsh"
    }

    fn execute(&mut self, session: &Session) -> Result<(), EngineError> {
        let script = render_script(session)?;
        log::debug!("gmsh script:\n{}", script);

        let mut file = tempfile::Builder::new()
            .prefix("remesh")
            .suffix(".geo")
            .tempfile()?;
        file.write_all(script.as_bytes())?;
        file.flush()?;

        let output = Command::new(&self.executable)
            .arg(file.path())
            .arg("-parse_and_exit")
            .arg("-nopopup")
            .output()
            .map_err(|source| EngineError::Unavailable {
                program: self.program(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let mut errors = Vec::new();
        for line in stdout.lines().chain(stderr.lines()) {
            let line = line.trim();
            if let Some(msg) = line.strip_prefix("Error") {
                errors.push(msg.trim_start_matches(|c: char| c == ' ' || c == ':').to_string());
            } else if line.starts_with("Warning") {
                log::warn!("{}", line);
            } else if !line.is_empty() {
                log::debug!("{}", line);
            }
        }

        if !output.status.success() || !errors.is_empty() {
            return Err(EngineError::Failed {
                status: output.status.to_string(),
                messages: errors,
            });
        }
        Ok(())
    }
}
