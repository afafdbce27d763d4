use std::path::PathBuf;

use anyhow::Context;
use clap::{
    crate_authors, crate_description, crate_name, crate_version, value_parser, Arg, Command,
};

use utils::{
    cli::{add_job_args, existing_file, handle_job_args},
    existing_target, init_log, resolve_sample,
};

use crate::{command::TAG, config::Config};

/// Set up definition of command options for clap
fn cli_model() -> Command {
    add_job_args(
        Command::new(crate_name!())
            .about(crate_description!())
            .version(crate_version!())
            .author(crate_authors!()),
    )
    .arg(
        Arg::new("normal")
            .short('n')
            .long("normal")
            .value_parser(existing_file)
            .value_name("PATH")
            .required(true)
            .help("Normal BAM file, or .list file paired line by line with the input list"),
    )
    .arg(
        Arg::new("target")
            .short('t')
            .long("target")
            .value_parser(value_parser!(PathBuf))
            .value_name("PATH")
            .help("Target interval file"),
    )
    .arg(
        Arg::new("padding")
            .short('p')
            .long("interval-padding")
            .value_parser(value_parser!(u32))
            .value_name("INT")
            .requires("target")
            .help("Pad target intervals by this many bases"),
    )
}

/// Handle command line options.  Set up Config structure
pub fn handle_cli() -> anyhow::Result<Config> {
    // Get matches from command line
    let m = cli_model().get_matches();

    // Setup logging
    init_log(&m);

    debug!("Processing command line options");

    let mut job = handle_job_args(&m, TAG)?;

    // The normal is selected with the same array index as the tumour
    let nfile = m.get_one::<PathBuf>("normal").expect("Missing normal file");
    let normal = resolve_sample(nfile, job.index())
        .with_context(|| format!("Could not resolve normal sample from {}", nfile.display()))?;
    if !normal.exists() {
        return Err(anyhow!("Normal file {} not found", normal.display()));
    }
    if normal == job.sample() {
        warn!("Tumour and normal are the same file {}", normal.display());
    }

    job.set_target(existing_target(
        m.get_one::<PathBuf>("target").map(|p| p.as_path()),
    )?);
    job.set_interval_padding(m.get_one::<u32>("padding").copied());

    Ok(Config::new(job, normal))
}
