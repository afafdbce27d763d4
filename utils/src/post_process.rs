use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::{gatk::ExternalCommand, ref_config::RefConfig, runner::StepRunner};

/// Append an extension to a path (`x.vcf` -> `x.vcf.gz`)
pub fn add_extension(p: &Path, ext: &str) -> PathBuf {
    let mut s = p.as_os_str().to_owned();
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}

/// Compress a VCF file with bgzip and build a tabix index for it.  The `.idx` index
/// written by GATK for the uncompressed file is no longer valid and is removed.
///
/// Returns the path of the compressed file
pub fn compress_and_index(
    runner: &StepRunner,
    cfg: &RefConfig,
    vcf: &Path,
) -> anyhow::Result<PathBuf> {
    let gz = add_extension(vcf, "gz");

    runner.run_step(
        "Compress output",
        &ExternalCommand::new(cfg.bgzip()).arg("-f").arg(vcf),
    )?;
    runner.run_step(
        "Index output",
        &ExternalCommand::new(cfg.tabix())
            .arg("-f")
            .arg("-p")
            .arg("vcf")
            .arg(&gz),
    )?;

    let idx = add_extension(vcf, "idx");
    if !runner.dry_run() && idx.exists() {
        debug!("Removing {}", idx.display());
        fs::remove_file(&idx)
            .with_context(|| format!("Could not remove index file {}", idx.display()))?;
    }
    Ok(gz)
}
