use crate::command::{indel_realigner, target_creator, BAM_SUFFIX};
use utils::Job;

/// Run RealignerTargetCreator followed by IndelRealigner
pub fn run_job(job: &Job) -> anyhow::Result<()> {
    let rtc = target_creator(job)?;
    let ir = indel_realigner(job)?;
    let runner = job.prepare()?;

    runner.run_step("RealignerTargetCreator", &rtc.render())?;
    runner.run_step("IndelRealigner", &ir.render())?;

    runner.log_msg(&format!(
        "Job completed; output in {}",
        job.files().output(BAM_SUFFIX).display()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::tests::{make_job, REF_CFG};
    use std::fs;
    use utils::JobSettings;

    #[test]
    fn both_steps_run() {
        let dir = tempfile::tempdir().unwrap();
        let job = make_job(
            dir.path(),
            &format!("{}JAVA=true\n", REF_CFG),
            JobSettings::default(),
        );
        run_job(&job).unwrap();
        let log = fs::read_to_string(job.files().log()).unwrap();
        let a = log.find("Finished RealignerTargetCreator").unwrap();
        let b = log.find("Finished IndelRealigner").unwrap();
        assert!(a < b);
    }

    #[test]
    fn first_step_failure_stops_job() {
        let dir = tempfile::tempdir().unwrap();
        let job = make_job(
            dir.path(),
            &format!("{}JAVA=false\n", REF_CFG),
            JobSettings::default(),
        );
        assert!(run_job(&job).is_err());
        let log = fs::read_to_string(job.files().log()).unwrap();
        assert!(!log.contains("Start IndelRealigner"));
    }
}
