//! Selection of the input file for one array job instance
//!
//! The input manifest is either a single file path, or a list file (extension `.list`)
//! with one path per line.  For a list file the job index selects the line (1-based).
use std::{
    fmt,
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

use anyhow::Context;
use compress_io::compress::CompressIo;

use crate::get_next_line;

/// Environment variable set by the grid engine for array job instances
pub const ARRAY_TASK_VAR: &str = "SGE_TASK_ID";

/// 1-based index of an array job instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobIndex(NonZeroUsize);

impl JobIndex {
    pub fn new(ix: usize) -> anyhow::Result<Self> {
        NonZeroUsize::new(ix)
            .map(Self)
            .ok_or_else(|| anyhow!("Job index must be at least 1"))
    }

    pub fn get(&self) -> usize {
        usize::from(self.0)
    }

    /// An explicit index takes precedence over the value of the array task variable.
    /// For non array jobs the grid engine sets the variable to `undefined`, which is
    /// treated the same as the variable being absent.
    pub fn from_arg_or_env(arg: Option<usize>, env: Option<&str>) -> anyhow::Result<Option<Self>> {
        if let Some(ix) = arg {
            return Self::new(ix).map(Some);
        }
        match env.map(|s| s.trim()) {
            None | Some("") | Some("undefined") => Ok(None),
            Some(s) => {
                let ix = s.parse::<usize>().with_context(|| {
                    format!("Could not parse {} value '{}' as a job index", ARRAY_TASK_VAR, s)
                })?;
                Self::new(ix).map(Some)
            }
        }
    }
}

impl fmt::Display for JobIndex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Check for `.list` (optionally compressed) manifest files
pub fn is_list_file(p: &Path) -> bool {
    p.file_name()
        .and_then(|s| s.to_str())
        .map(|s| s.ends_with(".list") || s.ends_with(".list.gz"))
        .unwrap_or(false)
}

/// Make path absolute relative to the current directory.  The path does not need to exist.
pub fn absolute_path<P: AsRef<Path>>(p: P) -> anyhow::Result<PathBuf> {
    let p = p.as_ref();
    std::path::absolute(p).with_context(|| format!("Could not make path {} absolute", p.display()))
}

/// Read line `ix` from a list file
pub fn read_manifest_line<P: AsRef<Path>>(fname: P, ix: JobIndex) -> anyhow::Result<String> {
    let fname = fname.as_ref();
    debug!("Reading entry {} from {}", ix, fname.display());

    let mut rdr = CompressIo::new()
        .path(fname)
        .bufreader()
        .with_context(|| format!("Could not open list file {}", fname.display()))?;

    let mut buf = String::new();
    let mut line = 0;

    while let Some(s) = get_next_line(&mut rdr, &mut buf)
        .with_context(|| format!("Error after reading {} lines from {}", line, fname.display()))?
    {
        line += 1;
        if line == ix.get() {
            return if s.is_empty() {
                Err(anyhow!("Line {} of {} is empty", line, fname.display()))
            } else {
                Ok(s.to_owned())
            };
        }
    }

    Err(anyhow!(
        "Job index {} is out of range: {} has {} lines",
        ix,
        fname.display(),
        line
    ))
}

/// Resolve the sample file for this job instance
///
/// If `manifest` is a list file then the entry selected by `ix` is returned, otherwise
/// `manifest` itself is the sample.  The result is always an absolute path.
pub fn resolve_sample(manifest: &Path, ix: Option<JobIndex>) -> anyhow::Result<PathBuf> {
    let p = if is_list_file(manifest) {
        let ix = ix.ok_or_else(|| {
            anyhow!(
                "No job index given for list file {} (use -a or run as an array job)",
                manifest.display()
            )
        })?;
        PathBuf::from(read_manifest_line(manifest, ix)?)
    } else {
        if let Some(i) = ix {
            debug!(
                "Input {} is not a list file; ignoring job index {}",
                manifest.display(),
                i
            );
        }
        manifest.to_owned()
    };
    let p = absolute_path(p)?;
    debug!("Resolved sample file {}", p.display());
    Ok(p)
}
