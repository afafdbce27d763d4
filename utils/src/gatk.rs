//! Typed descriptions of external commands
//!
//! A GATK invocation is built up as an operation plus an ordered list of arguments and
//! is only turned into an argument vector when it is about to be run, so no shell
//! quoting is involved at any point.
use std::{
    ffi::{OsStr, OsString},
    fmt,
    path::{Path, PathBuf},
    process::Command,
};

use crate::{job::JobSettings, ref_config::RefConfig};

/// A program and its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    program: String,
    args: Vec<OsString>,
}

impl ExternalCommand {
    pub fn new<S: Into<String>>(program: S) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg<S: AsRef<OsStr>>(mut self, s: S) -> Self {
        self.args.push(s.as_ref().to_owned());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments as strings (lossy conversion)
    pub fn arg_strings(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|s| s.to_string_lossy().into_owned())
            .collect()
    }

    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

impl fmt::Display for ExternalCommand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for a in self.args.iter() {
            let s = a.to_string_lossy();
            if s.is_empty() || s.contains(char::is_whitespace) {
                write!(f, " '{}'", s)?
            } else {
                write!(f, " {}", s)?
            }
        }
        Ok(())
    }
}

/// GATK tools used by the job wrappers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    RealignerTargetCreator,
    IndelRealigner,
    HaplotypeCaller,
    MuTect2,
}

impl Operation {
    pub fn tool_name(&self) -> &'static str {
        match self {
            Self::RealignerTargetCreator => "RealignerTargetCreator",
            Self::IndelRealigner => "IndelRealigner",
            Self::HaplotypeCaller => "HaplotypeCaller",
            Self::MuTect2 => "MuTect2",
        }
    }

    /// Multi-threading option supported by the tool: data threads (-nt) or
    /// cpu threads (-nct).  IndelRealigner supports neither.
    pub fn thread_option(&self) -> Option<&'static str> {
        match self {
            Self::RealignerTargetCreator => Some("-nt"),
            Self::IndelRealigner => None,
            Self::HaplotypeCaller | Self::MuTect2 => Some("-nct"),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.tool_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum GatkArg {
    Flag(&'static str),
    Opt(&'static str, OsString),
}

/// GatkCommand
///
/// Invocation of one GATK tool.  Built in the order
///
///   java <java opts> -jar <GATK> -T <tool> -R <REF> [-L <targets> [-ip <padding>]]
///   <tool specific arguments> [-nt|-nct <threads>] [-et NO_ET -K <ETKEY>]
///   [--fix_misencoded_quality_scores]
///
/// where the tool specific arguments (inputs, output and tool flags) are added by the
/// caller between [`GatkCommand::new`] and [`GatkCommand::finish`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatkCommand {
    java: String,
    java_opts: Vec<OsString>,
    jar: PathBuf,
    op: Operation,
    args: Vec<GatkArg>,
}

impl GatkCommand {
    pub fn new(
        op: Operation,
        settings: &JobSettings,
        cfg: &RefConfig,
        temp_dir: &Path,
    ) -> anyhow::Result<Self> {
        let mut tmp_opt = OsString::from("-Djava.io.tmpdir=");
        tmp_opt.push(temp_dir);
        let java_opts = vec![
            OsString::from(format!("-Xmx{}", settings.java_mem())),
            tmp_opt,
        ];

        let mut cmd = Self {
            java: cfg.java().to_owned(),
            java_opts,
            jar: cfg.gatk_jar()?,
            op,
            args: Vec::new(),
        }
        .opt("-R", cfg.reference()?);

        if let Some(t) = settings.target() {
            cmd = cmd.opt("-L", t);
            if let Some(x) = settings.interval_padding() {
                cmd = cmd.opt("-ip", x.to_string());
            }
        }
        Ok(cmd)
    }

    pub fn flag(mut self, name: &'static str) -> Self {
        self.args.push(GatkArg::Flag(name));
        self
    }

    pub fn opt<S: AsRef<OsStr>>(mut self, name: &'static str, value: S) -> Self {
        self.args
            .push(GatkArg::Opt(name, value.as_ref().to_owned()));
        self
    }

    /// Add the same option once for each value
    pub fn opts<I, S>(self, name: &'static str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        values.into_iter().fold(self, |c, v| c.opt(name, v))
    }

    /// Append the job wide conditional arguments
    pub fn finish(mut self, settings: &JobSettings, cfg: &RefConfig) -> anyhow::Result<Self> {
        if let Some(s) = self.op.thread_option() {
            self = self.opt(s, settings.threads().to_string());
        }
        if settings.no_telemetry() {
            let key = cfg.telemetry_key()?;
            self = self.opt("-et", "NO_ET").opt("-K", key);
        }
        if settings.fix_quals() {
            self = self.flag("--fix_misencoded_quality_scores");
        }
        Ok(self)
    }

    /// Check whether an option or flag is present
    pub fn has_arg(&self, name: &str) -> bool {
        self.args.iter().any(|a| match a {
            GatkArg::Flag(s) | GatkArg::Opt(s, _) => *s == name,
        })
    }

    /// Value of the first occurrence of an option
    pub fn arg_value(&self, name: &str) -> Option<&OsStr> {
        self.args.iter().find_map(|a| match a {
            GatkArg::Opt(s, v) if *s == name => Some(v.as_os_str()),
            _ => None,
        })
    }

    /// Render to the program and argument vector that will be executed
    pub fn render(&self) -> ExternalCommand {
        let mut cmd = self
            .java_opts
            .iter()
            .fold(ExternalCommand::new(self.java.as_str()), |c, o| c.arg(o))
            .arg("-jar")
            .arg(&self.jar)
            .arg("-T")
            .arg(self.op.tool_name());
        for a in self.args.iter() {
            cmd = match a {
                GatkArg::Flag(s) => cmd.arg(s),
                GatkArg::Opt(s, v) => cmd.arg(s).arg(v),
            }
        }
        cmd
    }
}
