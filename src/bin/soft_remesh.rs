use anyhow::Result;
use clap::Parser;

use stl_remesh::cli::{self, FieldCli};

fn main() -> Result<()> {
    env_logger::init();
    let args = FieldCli::parse_from(cli::normalize_args(std::env::args_os()));

    cli::run(args.job(), args.nopopup)
}
