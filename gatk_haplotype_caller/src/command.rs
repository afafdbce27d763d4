use utils::{GatkCommand, Job, Operation};

/// Tag used in names of log and temporary files
pub const TAG: &str = "HapCall";

pub const GVCF_SUFFIX: &str = ".g.vcf";

/// Per sample HaplotypeCaller run in gVCF mode
pub fn haplotype_caller(job: &Job) -> anyhow::Result<GatkCommand> {
    let cfg = job.ref_cfg();
    let settings = job.settings();
    let files = job.files();

    GatkCommand::new(Operation::HaplotypeCaller, settings, cfg, &files.temp_dir())?
        .opt("-I", job.sample())
        .opt("-o", files.output(GVCF_SUFFIX))
        .opt("--genotyping_mode", "DISCOVERY")
        .opt("-stand_call_conf", "30")
        .opt("--emitRefConfidence", "GVCF")
        .opt("--variant_index_type", "LINEAR")
        .opt("--variant_index_parameter", "128000")
        .opt("--dbsnp", cfg.dbsnp()?)
        .finish(settings, cfg)
}
