use std::path::PathBuf;

use clap::{
    crate_authors, crate_description, crate_name, crate_version, value_parser, Arg, Command,
};

use utils::{
    cli::{add_job_args, existing_file, handle_job_args},
    init_log,
    manifest::absolute_path,
    Job,
};

use crate::command::TAG;

/// Set up definition of command options for clap
fn cli_model() -> Command {
    add_job_args(
        Command::new(crate_name!())
            .about(crate_description!())
            .version(crate_version!())
            .author(crate_authors!()),
    )
    .arg(
        Arg::new("target")
            .short('t')
            .long("target")
            .value_parser(existing_file)
            .value_name("PATH")
            .required(true)
            .help("Target interval file"),
    )
    .arg(
        Arg::new("padding")
            .short('p')
            .long("interval-padding")
            .value_parser(value_parser!(u32))
            .value_name("INT")
            .help("Pad target intervals by this many bases"),
    )
}

/// Handle command line options.  Set up Job structure
pub fn handle_cli() -> anyhow::Result<Job> {
    // Get matches from command line
    let m = cli_model().get_matches();

    // Setup logging
    init_log(&m);

    debug!("Processing command line options");

    let mut job = handle_job_args(&m, TAG)?;

    let target = m
        .get_one::<PathBuf>("target")
        .expect("Missing target file");
    job.set_target(Some(absolute_path(target)?));
    job.set_interval_padding(m.get_one::<u32>("padding").copied());

    Ok(job)
}
