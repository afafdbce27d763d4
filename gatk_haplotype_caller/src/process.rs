use utils::{post_process::compress_and_index, Job};

use crate::command::{haplotype_caller, GVCF_SUFFIX};

/// Run HaplotypeCaller, then compress and index the gVCF
pub fn run_job(job: &Job) -> anyhow::Result<()> {
    // Build the command first so configuration errors are found before anything is written
    let cmd = haplotype_caller(job)?;
    let runner = job.prepare()?;

    runner.run_step("HaplotypeCaller", &cmd.render())?;
    let gz = compress_and_index(&runner, job.ref_cfg(), &job.files().output(GVCF_SUFFIX))?;

    runner.log_msg(&format!("Job completed; output in {}", gz.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::tests::{make_job, REF_CFG};
    use std::fs;
    use utils::JobSettings;

    #[test]
    fn job_runs_all_steps() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = format!("{}JAVA=true\nBGZIP=true\nTABIX=true\n", REF_CFG);
        let job = make_job(dir.path(), &cfg, JobSettings::default());
        let idx = dir.path().join("s1.g.vcf.idx");
        fs::write(&idx, "").unwrap();

        run_job(&job).unwrap();

        assert!(job.files().temp_dir().is_dir());
        assert!(!idx.exists());
        let log = fs::read_to_string(job.files().log()).unwrap();
        for s in ["Finished HaplotypeCaller", "Finished Compress output", "Job completed"] {
            assert!(log.contains(s), "{} missing from log", s);
        }
    }

    #[test]
    fn failed_tool_stops_job() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = format!("{}JAVA=false\nBGZIP=true\nTABIX=true\n", REF_CFG);
        let job = make_job(dir.path(), &cfg, JobSettings::default());
        assert!(run_job(&job).is_err());
        let log = fs::read_to_string(job.files().log()).unwrap();
        assert!(log.contains("HaplotypeCaller failed"));
        assert!(!log.contains("Compress output"));
    }
}
