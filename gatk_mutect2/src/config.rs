use std::path::{Path, PathBuf};

use utils::Job;

/// Config
///
/// Tumour job (from the shared options) plus the matched normal sample.
/// Once set it is read only.
///
pub struct Config {
    job: Job,
    normal: PathBuf,
}

impl Config {
    pub fn new(job: Job, normal: PathBuf) -> Self {
        Self { job, normal }
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    pub fn tumor(&self) -> &Path {
        self.job.sample()
    }

    pub fn normal(&self) -> &Path {
        &self.normal
    }
}
