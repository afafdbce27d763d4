use std::path::PathBuf;

use utils::{GatkCommand, Job, Operation};

/// Tag used in names of log and temporary files
pub const TAG: &str = "IndelRealign";

pub const INTERVALS_SUFFIX: &str = ".realign.target.intervals";
pub const BAM_SUFFIX: &str = ".realigned.bam";

fn known_indels(job: &Job) -> anyhow::Result<Vec<PathBuf>> {
    let v = job.ref_cfg().known_indels();
    if v.is_empty() {
        Err(anyhow!(
            "No known indel files (INDEL, INDEL1KG) set in reference configuration {}",
            job.ref_cfg().source().display()
        ))
    } else {
        Ok(v)
    }
}

/// Identify intervals needing realignment
pub fn target_creator(job: &Job) -> anyhow::Result<GatkCommand> {
    let (cfg, settings, files) = (job.ref_cfg(), job.settings(), job.files());
    GatkCommand::new(
        Operation::RealignerTargetCreator,
        settings,
        cfg,
        &files.temp_dir(),
    )?
    .opt("-I", job.sample())
    .opt("-o", files.output(INTERVALS_SUFFIX))
    .opts("-known", known_indels(job)?)
    .finish(settings, cfg)
}

/// Realign reads over the intervals found by [`target_creator`]
pub fn indel_realigner(job: &Job) -> anyhow::Result<GatkCommand> {
    let (cfg, settings, files) = (job.ref_cfg(), job.settings(), job.files());
    GatkCommand::new(Operation::IndelRealigner, settings, cfg, &files.temp_dir())?
        .opt("-I", job.sample())
        .opt("-targetIntervals", files.output(INTERVALS_SUFFIX))
        .opt("-o", files.output(BAM_SUFFIX))
        .opts("-known", known_indels(job)?)
        .finish(settings, cfg)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::path::Path;
    use utils::{JobFiles, JobSettings, RefConfig};

    pub(crate) const REF_CFG: &str = "REF=/ref/hg19.fa\nGATK=/opt/GATK.jar\nINDEL=/ref/mills.vcf\nINDEL1KG=/ref/1kg.indels.vcf\n";

    pub(crate) fn make_job(dir: &Path, ref_cfg: &str, settings: JobSettings) -> Job {
        let r = dir.join("ref.sh");
        std::fs::write(&r, ref_cfg).unwrap();
        let cfg = RefConfig::from_file(&r).unwrap();
        let files = JobFiles::new(dir.to_owned(), "s1".to_string(), TAG);
        Job::new(dir.join("s1.bam"), None, cfg, files, settings, false)
    }

    fn values(v: &[String], name: &str) -> Vec<String> {
        v.windows(2)
            .filter(|w| w[0] == name)
            .map(|w| w[1].clone())
            .collect()
    }

    #[test]
    fn two_step_templates() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = JobSettings::default();
        s.set_threads(8);
        let job = make_job(dir.path(), REF_CFG, s);
        let intervals = dir.path().join("s1.realign.target.intervals");
        let intervals = intervals.to_str().unwrap();

        let rtc = target_creator(&job).unwrap().render().arg_strings();
        assert_eq!(values(&rtc, "-T"), vec!["RealignerTargetCreator"]);
        assert_eq!(values(&rtc, "-o"), vec![intervals]);
        assert_eq!(
            values(&rtc, "-known"),
            vec!["/ref/mills.vcf", "/ref/1kg.indels.vcf"]
        );
        assert_eq!(values(&rtc, "-nt"), vec!["8"]);

        let ir = indel_realigner(&job).unwrap().render().arg_strings();
        assert_eq!(values(&ir, "-T"), vec!["IndelRealigner"]);
        assert_eq!(values(&ir, "-targetIntervals"), vec![intervals]);
        assert_eq!(
            values(&ir, "-o"),
            vec![dir.path().join("s1.realigned.bam").to_str().unwrap()]
        );
        assert!(!ir.iter().any(|a| a == "-nt" || a == "-nct"));
    }

    #[test]
    fn fix_quals_on_both_steps() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = JobSettings::default();
        s.set_fix_quals(true);
        let job = make_job(dir.path(), REF_CFG, s);
        assert!(target_creator(&job)
            .unwrap()
            .has_arg("--fix_misencoded_quality_scores"));
        assert!(indel_realigner(&job)
            .unwrap()
            .has_arg("--fix_misencoded_quality_scores"));
    }

    #[test]
    fn known_indels_required() {
        let dir = tempfile::tempdir().unwrap();
        let job = make_job(
            dir.path(),
            "REF=/ref/hg19.fa\nGATK=/opt/GATK.jar\n",
            JobSettings::default(),
        );
        assert!(target_creator(&job).is_err());
    }
}
