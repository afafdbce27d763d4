use utils::post_process::compress_and_index;

use crate::{
    command::{mutect2, VCF_SUFFIX},
    config::Config,
};

/// Run MuTect2 on the tumour/normal pair, then compress and index the calls
pub fn run_job(cfg: &Config) -> anyhow::Result<()> {
    let job = cfg.job();
    let cmd = mutect2(cfg)?;
    let runner = job.prepare()?;
    runner.log_msg(&format!("Normal sample {}", cfg.normal().display()))?;

    runner.run_step("MuTect2", &cmd.render())?;
    let gz = compress_and_index(&runner, job.ref_cfg(), &job.files().output(VCF_SUFFIX))?;

    runner.log_msg(&format!("Job completed; output in {}", gz.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::tests::{make_config, REF_CFG};
    use std::fs;
    use utils::JobSettings;

    #[test]
    fn job_runs_all_steps() {
        let dir = tempfile::tempdir().unwrap();
        let rc = format!("{}JAVA=true\nBGZIP=true\nTABIX=true\n", REF_CFG);
        let cfg = make_config(dir.path(), &rc, JobSettings::default());
        let idx = dir.path().join("t1.mutect2.vcf.idx");
        fs::write(&idx, "").unwrap();

        run_job(&cfg).unwrap();

        assert!(!idx.exists());
        let log = fs::read_to_string(cfg.job().files().log()).unwrap();
        assert!(log.contains("Normal sample"));
        assert!(log.contains("Finished MuTect2"));
        assert!(log.contains("Finished Index output"));
    }

    #[test]
    fn telemetry_key_checked_before_running() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = JobSettings::default();
        s.set_no_telemetry(true);
        let cfg = make_config(dir.path(), REF_CFG, s);
        assert!(run_job(&cfg).is_err());
        assert!(!cfg.job().files().log().exists());
    }
}
