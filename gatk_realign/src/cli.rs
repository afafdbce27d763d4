use std::path::PathBuf;

use clap::{
    crate_authors, crate_description, crate_name, crate_version, value_parser, Arg, Command,
};

use utils::{
    cli::{add_job_args, handle_job_args},
    existing_target, init_log, Job,
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
            .value_parser(value_parser!(PathBuf))
            .value_name("PATH")
            .help("Target interval file"),
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
    job.set_target(existing_target(
        m.get_one::<PathBuf>("target").map(|p| p.as_path()),
    )?);

    Ok(job)
}
