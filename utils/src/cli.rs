//! Command line options shared by the job wrappers
use std::{num::NonZeroUsize, path::PathBuf};

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};

use crate::{
    job::{output_base, Job, JobFiles, JobSettings},
    manifest::{absolute_path, resolve_sample, JobIndex, ARRAY_TASK_VAR},
    ref_config::RefConfig,
    LogLevel,
};

/// Value parser for input files that must be present
pub fn existing_file(s: &str) -> Result<PathBuf, String> {
    let p = PathBuf::from(s);
    if p.exists() {
        Ok(p)
    } else {
        Err(format!("file {} not found", s))
    }
}

/// Add the options common to all job wrappers to a command definition
pub fn add_job_args(cmd: Command) -> Command {
    cmd.disable_help_flag(true)
        .arg(
            Arg::new("help")
                .short('H')
                .long("help")
                .action(ArgAction::Help)
                .help("Print help"),
        )
        .arg(
            Arg::new("timestamp")
                .short('X')
                .long("timestamp")
                .value_parser(value_parser!(stderrlog::Timestamp))
                .value_name("GRANULARITY")
                .default_value("none")
                .help("Prepend log entries with a timestamp"),
        )
        .arg(
            Arg::new("loglevel")
                .long("loglevel")
                .value_name("LOGLEVEL")
                .value_parser(value_parser!(LogLevel))
                .ignore_case(true)
                .default_value("info")
                .help("Set log level"),
        )
        .arg(
            Arg::new("quiet")
                .action(ArgAction::SetTrue)
                .long("quiet")
                .conflicts_with("loglevel")
                .help("Silence all output"),
        )
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_parser(existing_file)
                .value_name("PATH")
                .required(true)
                .help("Input BAM file, or .list file with one BAM file per line"),
        )
        .arg(
            Arg::new("ref_config")
                .short('r')
                .long("ref-config")
                .value_parser(existing_file)
                .value_name("PATH")
                .required(true)
                .help("Reference configuration file"),
        )
        .arg(
            Arg::new("index")
                .short('a')
                .long("array-index")
                .value_parser(value_parser!(usize))
                .value_name("INT")
                .help(format!(
                    "Line of .list input file to use [default: ${}]",
                    ARRAY_TASK_VAR
                )),
        )
        .arg(
            Arg::new("log_file")
                .short('l')
                .long("log-file")
                .value_parser(value_parser!(PathBuf))
                .value_name("PATH")
                .help("Run log file [default: <output base>.<tool>.log]"),
        )
        .arg(
            Arg::new("no_telemetry")
                .short('B')
                .long("no-telemetry")
                .action(ArgAction::SetTrue)
                .help("Disable GATK telemetry (needs ETKEY in the reference configuration)"),
        )
        .arg(
            Arg::new("fix_quals")
                .short('F')
                .long("fix-quals")
                .action(ArgAction::SetTrue)
                .help("Fix misencoded (phred+64) quality scores"),
        )
        .arg(
            Arg::new("threads")
                .short('T')
                .long("threads")
                .value_parser(value_parser!(NonZeroUsize))
                .value_name("INT")
                .help("Set number of GATK threads [default: available cores]"),
        )
        .arg(
            Arg::new("java_mem")
                .short('m')
                .long("java-mem")
                .value_parser(value_parser!(String))
                .value_name("SIZE")
                .default_value("7g")
                .help("Set maximum java heap size"),
        )
        .arg(
            Arg::new("work_dir")
                .short('d')
                .long("work-dir")
                .value_parser(value_parser!(PathBuf))
                .value_name("PATH")
                .help("Set directory for output files [default: current directory]"),
        )
        .arg(
            Arg::new("dry_run")
                .long("dry-run")
                .action(ArgAction::SetTrue)
                .help("Print commands without running them"),
        )
}

/// Process the shared options.
///
/// The sample for this job is resolved from the input, using the array index
/// from the command line or, failing that, from the environment.  Output names are
/// derived from the sample name with `tag` identifying the tool.
pub fn handle_job_args(m: &ArgMatches, tag: &'static str) -> anyhow::Result<Job> {
    let manifest = m.get_one::<PathBuf>("input").expect("Missing input");
    let ix = job_index(m)?;
    let sample = resolve_sample(manifest, ix)
        .with_context(|| format!("Could not resolve input from {}", manifest.display()))?;
    if !sample.exists() {
        return Err(anyhow!("Input file {} not found", sample.display()));
    }

    let ref_cfg = RefConfig::from_file(m.get_one::<PathBuf>("ref_config").expect("Missing reference config"))?;

    let work_dir = match m.get_one::<PathBuf>("work_dir") {
        Some(d) => absolute_path(d)?,
        None => std::env::current_dir().with_context(|| "Could not get current directory")?,
    };

    let mut files = JobFiles::new(work_dir, output_base(&sample)?, tag);
    if let Some(p) = m.get_one::<PathBuf>("log_file") {
        files.set_log(absolute_path(p)?)
    }

    let mut settings = JobSettings::default();
    settings.set_no_telemetry(m.get_flag("no_telemetry"));
    settings.set_fix_quals(m.get_flag("fix_quals"));
    settings.set_threads(
        m.get_one::<NonZeroUsize>("threads")
            .map(|x| usize::from(*x))
            .unwrap_or_else(num_cpus::get),
    );
    settings.set_java_mem(m.get_one::<String>("java_mem").expect("Missing default java mem"));

    Ok(Job::new(sample, ix, ref_cfg, files, settings, m.get_flag("dry_run")))
}

fn job_index(m: &ArgMatches) -> anyhow::Result<Option<JobIndex>> {
    let env = std::env::var(ARRAY_TASK_VAR).ok();
    JobIndex::from_arg_or_env(m.get_one::<usize>("index").copied(), env.as_deref())
}
