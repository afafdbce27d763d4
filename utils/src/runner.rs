//! Execution of job steps
//!
//! Each step is logged to the run log (start, command line, finish or failure) and
//! the output of the program is appended to the tool log.  A step that fails to start
//! or exits with a non-zero status is an error; there are no retries.
use std::{
    fs::{File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    process::Stdio,
    time::Instant,
};

use anyhow::Context;

use crate::gatk::ExternalCommand;

pub struct StepRunner {
    log: PathBuf,
    tool_log: Option<PathBuf>,
    dry_run: bool,
}

fn open_append(p: &Path) -> anyhow::Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(p)
        .with_context(|| format!("Could not open {} for appending", p.display()))
}

impl StepRunner {
    pub fn new(log: PathBuf) -> Self {
        Self {
            log,
            tool_log: None,
            dry_run: false,
        }
    }

    /// Capture output of programs to file (otherwise it is inherited)
    pub fn set_tool_log(&mut self, p: PathBuf) {
        self.tool_log = Some(p)
    }

    /// In dry run mode commands are printed but not run, and no files are written
    pub fn set_dry_run(&mut self, x: bool) {
        self.dry_run = x
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn log(&self) -> &Path {
        &self.log
    }

    /// Append time stamped message to the run log
    pub fn log_msg(&self, msg: &str) -> anyhow::Result<()> {
        info!("{}", msg);
        if !self.dry_run {
            let mut wrt = open_append(&self.log)?;
            writeln!(
                wrt,
                "[{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                msg
            )
            .with_context(|| format!("Error writing to log file {}", self.log.display()))?;
        }
        Ok(())
    }

    pub fn run_step(&self, name: &str, cmd: &ExternalCommand) -> anyhow::Result<()> {
        self.log_msg(&format!("Start {}", name))?;
        self.log_msg(&format!("{}", cmd))?;

        if self.dry_run {
            println!("{}", cmd);
            return Ok(());
        }

        let mut command = cmd.to_command();
        if let Some(p) = self.tool_log.as_ref() {
            let f = open_append(p)?;
            let f1 = f
                .try_clone()
                .with_context(|| format!("Could not duplicate handle for {}", p.display()))?;
            command.stdout(Stdio::from(f)).stderr(Stdio::from(f1));
        }

        let now = Instant::now();
        let status = match command.status() {
            Ok(s) => s,
            Err(e) => {
                self.log_msg(&format!("{} failed to start: {}", name, e))?;
                return Err(anyhow!("Could not run {} for step {}: {}", cmd.program(), name, e));
            }
        };
        let elapsed = now.elapsed().as_secs_f64();

        if status.success() {
            self.log_msg(&format!("Finished {} ({:.1} s)", name, elapsed))
        } else {
            self.log_msg(&format!("{} failed ({}) after {:.1} s", name, status, elapsed))?;
            let mut msg = format!("Step {} failed: {}", name, status);
            if let Some(p) = self.tool_log.as_ref() {
                msg.push_str(&format!("; see {}", p.display()))
            }
            Err(anyhow!(msg))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn successful_step_logged() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("s1.log");
        let tool_log = dir.path().join("s1.toollog");
        let mut r = StepRunner::new(log.clone());
        r.set_tool_log(tool_log.clone());
        r.run_step("Echo", &ExternalCommand::new("echo").arg("hello"))
            .unwrap();
        let s = fs::read_to_string(&log).unwrap();
        assert!(s.contains("Start Echo"));
        assert!(s.contains("echo hello"));
        assert!(s.contains("Finished Echo"));
        assert_eq!(fs::read_to_string(&tool_log).unwrap(), "hello\n");
    }

    #[test]
    fn failing_step_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("s1.log");
        let r = StepRunner::new(log.clone());
        let e = r.run_step("Fail", &ExternalCommand::new("false")).unwrap_err();
        assert!(format!("{}", e).contains("Step Fail failed"));
        assert!(fs::read_to_string(&log).unwrap().contains("Fail failed"));
    }

    #[test]
    fn missing_program_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let r = StepRunner::new(dir.path().join("s1.log"));
        assert!(r
            .run_step("Missing", &ExternalCommand::new("no-such-program-for-step"))
            .is_err());
    }

    #[test]
    fn dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("s1.log");
        let mut r = StepRunner::new(log.clone());
        r.set_dry_run(true);
        r.run_step("Fail", &ExternalCommand::new("false")).unwrap();
        assert!(!log.exists());
    }
}
