use anyhow::Result;
use clap::Parser;

use stl_remesh::cli::{self, SizedCli};

fn main() -> Result<()> {
    env_logger::init();
    let args = SizedCli::parse_from(cli::normalize_args(std::env::args_os()));

    println!("Element size {}", args.element_size);
    cli::run(args.job(), args.nopopup)
}
