use utils::{GatkCommand, Operation};

use crate::config::Config;

/// Tag used in names of log and temporary files
pub const TAG: &str = "MuTect2";

pub const VCF_SUFFIX: &str = ".mutect2.vcf";

/// Paired tumour/normal MuTect2 run
pub fn mutect2(cfg: &Config) -> anyhow::Result<GatkCommand> {
    let job = cfg.job();
    let ref_cfg = job.ref_cfg();
    let settings = job.settings();
    let files = job.files();

    let cmd = GatkCommand::new(Operation::MuTect2, settings, ref_cfg, &files.temp_dir())?
        .opt("-I:tumor", cfg.tumor())
        .opt("-I:normal", cfg.normal())
        .opt("-o", files.output(VCF_SUFFIX))
        .opt("--dbsnp", ref_cfg.dbsnp()?);

    let cmd = match ref_cfg.cosmic() {
        Some(p) => cmd.opt("--cosmic", p),
        None => cmd,
    };
    cmd.finish(settings, ref_cfg)
}
