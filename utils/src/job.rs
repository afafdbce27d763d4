use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::{
    manifest::{absolute_path, JobIndex},
    ref_config::RefConfig,
    runner::StepRunner,
};

/// Output base name for an input file: the file name with any `.bam` suffix removed
pub fn output_base(input: &Path) -> anyhow::Result<String> {
    let name = input
        .file_name()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow!("Could not get file name from {}", input.display()))?;
    let base = name.strip_suffix(".bam").unwrap_or(name);
    if base.is_empty() {
        Err(anyhow!("Empty output base name for {}", input.display()))
    } else {
        Ok(base.to_owned())
    }
}

/// Target interval file, if supplied and present on disk.
/// A supplied file that does not exist is reported and ignored.
pub fn existing_target(p: Option<&Path>) -> anyhow::Result<Option<PathBuf>> {
    match p {
        Some(p) if p.exists() => Ok(Some(absolute_path(p)?)),
        Some(p) => {
            warn!(
                "Target file {} not found; analysis will not be restricted to targets",
                p.display()
            );
            Ok(None)
        }
        None => Ok(None),
    }
}

/// JobFiles
///
/// Names of the files produced by a job.  All are derived from the output base name
/// and a fixed tag for each tool, and are placed in the working directory.
///
/// log - run log (can be overridden from the command line)
/// tool_log - captured output of the external programs
/// temp_dir - temporary directory passed to java
///
#[derive(Debug, Clone)]
pub struct JobFiles {
    work_dir: PathBuf,
    base: String,
    tag: &'static str,
    log: PathBuf,
}

impl JobFiles {
    pub fn new(work_dir: PathBuf, base: String, tag: &'static str) -> Self {
        let log = work_dir.join(format!("{}.{}.log", base, tag));
        Self {
            work_dir,
            base,
            tag,
            log,
        }
    }

    pub fn set_log(&mut self, p: PathBuf) {
        self.log = p
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn tag(&self) -> &str {
        self.tag
    }

    pub fn log(&self) -> &Path {
        &self.log
    }

    pub fn tool_log(&self) -> PathBuf {
        self.output(&format!(".{}.toollog", self.tag))
    }

    pub fn temp_dir(&self) -> PathBuf {
        self.output(&format!(".{}.tempdir", self.tag))
    }

    /// Output file `<base><suffix>` in the working directory
    pub fn output(&self, suffix: &str) -> PathBuf {
        self.work_dir.join(format!("{}{}", self.base, suffix))
    }
}

/// JobSettings
///
/// Settings from the command line that apply to every GATK invocation of a job.
/// Once set it is read only.
///
#[derive(Debug, Clone)]
pub struct JobSettings {
    target: Option<PathBuf>,
    interval_padding: Option<u32>,
    no_telemetry: bool,
    fix_quals: bool,
    threads: usize,
    java_mem: String,
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            target: None,
            interval_padding: None,
            no_telemetry: false,
            fix_quals: false,
            threads: 1,
            java_mem: "7g".to_string(),
        }
    }
}

impl JobSettings {
    pub fn set_target(&mut self, p: Option<PathBuf>) {
        self.target = p
    }

    pub fn set_interval_padding(&mut self, x: Option<u32>) {
        self.interval_padding = x.filter(|x| *x > 0)
    }

    pub fn set_no_telemetry(&mut self, x: bool) {
        self.no_telemetry = x
    }

    pub fn set_fix_quals(&mut self, x: bool) {
        self.fix_quals = x
    }

    pub fn set_threads(&mut self, x: usize) {
        self.threads = x.max(1)
    }

    pub fn set_java_mem<S: AsRef<str>>(&mut self, s: S) {
        self.java_mem = s.as_ref().to_owned()
    }

    pub fn target(&self) -> Option<&Path> {
        self.target.as_deref()
    }

    pub fn interval_padding(&self) -> Option<u32> {
        self.interval_padding
    }

    pub fn no_telemetry(&self) -> bool {
        self.no_telemetry
    }

    pub fn fix_quals(&self) -> bool {
        self.fix_quals
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn java_mem(&self) -> &str {
        &self.java_mem
    }
}

/// Job
///
/// Everything a job wrapper needs once the command line has been processed:
/// the resolved sample, the reference configuration, output file names and
/// the settings applied to every GATK invocation
///
pub struct Job {
    sample: PathBuf,
    index: Option<JobIndex>,
    ref_cfg: RefConfig,
    files: JobFiles,
    settings: JobSettings,
    dry_run: bool,
}

impl Job {
    pub fn new(
        sample: PathBuf,
        index: Option<JobIndex>,
        ref_cfg: RefConfig,
        files: JobFiles,
        settings: JobSettings,
        dry_run: bool,
    ) -> Self {
        Self {
            sample,
            index,
            ref_cfg,
            files,
            settings,
            dry_run,
        }
    }

    pub fn set_target(&mut self, p: Option<PathBuf>) {
        self.settings.set_target(p)
    }

    pub fn set_interval_padding(&mut self, x: Option<u32>) {
        self.settings.set_interval_padding(x)
    }

    pub fn sample(&self) -> &Path {
        &self.sample
    }

    pub fn index(&self) -> Option<JobIndex> {
        self.index
    }

    pub fn ref_cfg(&self) -> &RefConfig {
        &self.ref_cfg
    }

    pub fn files(&self) -> &JobFiles {
        &self.files
    }

    pub fn settings(&self) -> &JobSettings {
        &self.settings
    }

    /// Create the temporary directory and set up the step runner
    pub fn prepare(&self) -> anyhow::Result<StepRunner> {
        let mut runner = StepRunner::new(self.files.log().to_owned());
        runner.set_dry_run(self.dry_run);
        if !self.dry_run {
            let tmp = self.files.temp_dir();
            fs::create_dir_all(&tmp)
                .with_context(|| format!("Error creating temporary directory {}", tmp.display()))?;
            runner.set_tool_log(self.files.tool_log());
        }
        runner.log_msg(&format!(
            "Job {} started for {}",
            self.files.tag(),
            self.sample.display()
        ))?;
        if let Some(ix) = self.index {
            runner.log_msg(&format!("Array index {}", ix))?;
        }
        Ok(runner)
    }
}
