use anyhow::{Context, Result};
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Instant;

use crate::algorithm::remesh_alg::{RemeshJob, Remesher, Variant};
use crate::engine::GmshEngine;
use crate::interactive::{ConsoleSource, EventLoop};

/// Remesh an STL surface into a volume mesh sized by a background field
#[derive(Parser, Debug)]
pub struct FieldCli {
    /// Triangulated surface to remesh
    pub stl_path: PathBuf,
    /// Output prefix, the mesh is written to <prefix>.msh
    pub output_prefix: PathBuf,
    /// Write the mesh and exit without the interactive session
    #[arg(long = "nopopup")]
    pub nopopup: bool,
}

/// Remesh an STL surface into a volume mesh with one explicit element size
#[derive(Parser, Debug)]
pub struct SizedCli {
    /// Triangulated surface to remesh
    pub stl_path: PathBuf,
    /// Output prefix, the mesh is written to <prefix>.msh
    pub output_prefix: PathBuf,
    /// Target element size on every point
    #[arg(allow_negative_numbers = true)]
    pub element_size: f64,
    /// Write the mesh and exit without the interactive session
    #[arg(long = "nopopup")]
    pub nopopup: bool,
}

/// Accepts the single dash `-nopopup` spelling
pub fn normalize_args<I: IntoIterator<Item = OsString>>(args: I) -> Vec<OsString> {
    args.into_iter()
        .map(|a| if a == "-nopopup" { OsString::from("--nopopup") } else { a })
        .collect()
}

/// Builds once, then serves rebuild requests from the terminal unless `nopopup`
pub fn run(job: RemeshJob, nopopup: bool) -> Result<()> {
    let mut params = job
        .variant
        .default_parameters()
        .context("declaring parameters")?;
    let mut remesher = Remesher::new(GmshEngine::new(), job);

    println!("Remeshing {}", remesher.job().input.display());
    let now = Instant::now();
    let report = remesher
        .build(&params)
        .with_context(|| format!("remeshing {}", remesher.job().input.display()))?;
    let duration = now.elapsed();
    println!(
        "Mesh computed in {}.{:03}s: {} nodes, {} elements",
        duration.as_secs(),
        duration.subsec_millis(),
        report.summary.nb_nodes,
        report.summary.nb_elements()
    );
    println!("Mesh saved to {}", report.output.display());

    if !nopopup {
        println!("Interactive session, type `help` for commands");
        let mut console = ConsoleSource::stdio();
        let stats = EventLoop::new(&mut remesher, &mut params, &mut console).run()?;
        println!(
            "Session closed: {} rebuild(s), {} failed",
            stats.rebuilds, stats.failures
        );
    }

    Ok(())
}

impl FieldCli {
    pub fn job(&self) -> RemeshJob {
        RemeshJob::new(&self.stl_path, &self.output_prefix, Variant::Field)
    }
}

impl SizedCli {
    pub fn job(&self) -> RemeshJob {
        RemeshJob::new(
            &self.stl_path,
            &self.output_prefix,
            Variant::Sized {
                element_size: self.element_size,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<OsString> {
        normalize_args(list.iter().map(OsString::from))
    }

    #[test]
    fn field_cli_accepts_single_dash_nopopup() {
        let cli = FieldCli::parse_from(args(&["soft_remesh", "part.stl", "out/part", "-nopopup"]));
        assert!(cli.nopopup);
        assert_eq!(cli.job().output_path(), PathBuf::from("out/part.msh"));
        assert_eq!(cli.job().variant, Variant::Field);

        let cli = FieldCli::parse_from(args(&["soft_remesh", "part.stl", "out/part"]));
        assert!(!cli.nopopup);
    }

    #[test]
    fn sized_cli_reads_element_size() {
        let cli = SizedCli::parse_from(args(&["soft_remesh_sized", "part.stl", "part", "2.5", "-nopopup"]));
        assert_eq!(cli.job().variant, Variant::Sized { element_size: 2.5 });

        let cli = SizedCli::parse_from(args(&["soft_remesh_sized", "part.stl", "part", "-1"]));
        assert_eq!(cli.element_size, -1.0);
        assert!(!cli.nopopup);
    }

    #[test]
    fn missing_arguments_are_rejected() {
        assert!(SizedCli::try_parse_from(args(&["soft_remesh_sized", "part.stl", "part"])).is_err());
        assert!(FieldCli::try_parse_from(args(&["soft_remesh", "part.stl", "part", "extra"])).is_err());
    }
}
