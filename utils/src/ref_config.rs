//! Reference configuration
//!
//! The reference configuration is a shell style file of `NAME=value` assignments giving
//! the locations of the reference genome, the GATK jar and the resource files used by
//! the different tools.  It is parsed once into an immutable [`RefConfig`].
//!
//! Supported syntax: optional leading `export`, single quoted (literal) and double
//! quoted values, and `$NAME` / `${NAME}` expansion from earlier assignments or, failing
//! that, from the process environment.  A quoted value may be followed by a `#` comment.
//! Comment lines and lines that are not assignments are skipped.
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use anyhow::Context;
use compress_io::compress::CompressIo;
use regex::{Captures, Regex};

use crate::get_next_line;

pub const REF: &str = "REF";
pub const GATK: &str = "GATK";
pub const ETKEY: &str = "ETKEY";
pub const DBSNP: &str = "DBSNP";
pub const INDEL: &str = "INDEL";
pub const INDEL1KG: &str = "INDEL1KG";
pub const COSMIC: &str = "COSMIC";
pub const JAVA: &str = "JAVA";
pub const BGZIP: &str = "BGZIP";
pub const TABIX: &str = "TABIX";

pub struct RefConfig {
    source: PathBuf,
    vars: HashMap<String, String>,
}

struct Parser {
    assign: Regex,
    var: Regex,
    unsupported: Regex,
}

impl Parser {
    fn new() -> anyhow::Result<Self> {
        Ok(Self {
            assign: Regex::new(r"^(?:export\s+)?([A-Za-z_][A-Za-z0-9_]*)=(.*)$")?,
            var: Regex::new(r"\$(?:\{([A-Za-z_][A-Za-z0-9_]*)\}|([A-Za-z_][A-Za-z0-9_]*))")?,
            unsupported: Regex::new(r"\\\$|\$\(|\$\{[^}]*[^A-Za-z0-9_}][^}]*\}|\$\{[^}]*$")?,
        })
    }

    /// First expansion form in `s` that is not handled (escaped `$`, `${NAME:-x}` and other
    /// parameter operators, command substitution)
    fn unsupported_expansion<'a>(&self, s: &'a str) -> Option<&'a str> {
        self.unsupported.find(s).map(|m| m.as_str())
    }

    fn expand<F>(&self, s: &str, vars: &HashMap<String, String>, env: &F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(x) = self.unsupported_expansion(s) {
            warn!(
                "Unsupported expansion {} in reference configuration value {} left as is",
                x, s
            );
        }
        self.var
            .replace_all(s, |c: &Captures| {
                let name = c.get(1).or_else(|| c.get(2)).unwrap().as_str();
                vars.get(name).cloned().or_else(|| env(name)).unwrap_or_else(|| {
                    warn!("Variable {} in reference configuration is not set", name);
                    String::new()
                })
            })
            .into_owned()
    }

    /// Parse one line, returning the assignment if present
    fn parse_line<F>(
        &self,
        line: &str,
        vars: &HashMap<String, String>,
        env: &F,
    ) -> Option<(String, String)>
    where
        F: Fn(&str) -> Option<String>,
    {
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let cap = self.assign.captures(line)?;
        let name = cap.get(1).unwrap().as_str().to_owned();
        let raw = cap.get(2).unwrap().as_str().trim();
        let value = match raw.chars().next() {
            Some(q @ ('\'' | '"')) => {
                let body = &raw[1..];
                let Some(end) = body.find(q) else {
                    warn!("Unterminated quote in reference configuration: {}", line);
                    return None;
                };
                let rest = body[end + 1..].trim_start();
                if !(rest.is_empty() || rest.starts_with('#')) {
                    warn!(
                        "Ignoring trailing text '{}' after quoted value of {}",
                        rest, name
                    );
                }
                if q == '"' {
                    self.expand(&body[..end], vars, env)
                } else {
                    body[..end].to_owned()
                }
            }
            // Unquoted values end at the first white space (anything after is a comment
            // or a command)
            _ => self.expand(raw.split_whitespace().next().unwrap_or(""), vars, env),
        };
        Some((name, value))
    }
}

impl RefConfig {
    /// Read configuration from file, expanding variables from the process environment
    pub fn from_file<P: AsRef<Path>>(fname: P) -> anyhow::Result<Self> {
        Self::from_file_with_env(fname, |s| std::env::var(s).ok())
    }

    pub fn from_file_with_env<P, F>(fname: P, env: F) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
        F: Fn(&str) -> Option<String>,
    {
        let fname = fname.as_ref();
        debug!("Reading reference configuration from {}", fname.display());
        let parser = Parser::new()?;
        let mut rdr = CompressIo::new()
            .path(fname)
            .bufreader()
            .with_context(|| format!("Could not open reference configuration {}", fname.display()))?;

        let mut buf = String::new();
        let mut line = 0;
        let mut vars = HashMap::new();

        while let Some(s) = get_next_line(&mut rdr, &mut buf)
            .with_context(|| format!("Error after reading {} lines from {}", line, fname.display()))?
        {
            line += 1;
            match parser.parse_line(s, &vars, &env) {
                Some((name, value)) => {
                    trace!("{}:{} {}={}", fname.display(), line, name, value);
                    vars.insert(name, value);
                }
                None => trace!("{}:{} skipped", fname.display(), line),
            }
        }
        debug!(
            "Finished reading {} lines; found {} assignments",
            line,
            vars.len()
        );

        Ok(Self {
            source: fname.to_owned(),
            vars,
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Get a value; empty values count as unset
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .get(name)
            .map(|s| s.as_str())
            .filter(|s| !s.is_empty())
    }

    pub fn path(&self, name: &str) -> Option<PathBuf> {
        self.get(name).map(PathBuf::from)
    }

    pub fn require_path(&self, name: &str) -> anyhow::Result<PathBuf> {
        self.path(name).ok_or_else(|| {
            anyhow!(
                "Variable {} not set in reference configuration {}",
                name,
                self.source.display()
            )
        })
    }

    /// Reference genome (FASTA)
    pub fn reference(&self) -> anyhow::Result<PathBuf> {
        self.require_path(REF)
    }

    pub fn gatk_jar(&self) -> anyhow::Result<PathBuf> {
        self.require_path(GATK)
    }

    /// Key file allowing GATK telemetry to be switched off
    pub fn telemetry_key(&self) -> anyhow::Result<PathBuf> {
        self.require_path(ETKEY)
    }

    pub fn dbsnp(&self) -> anyhow::Result<PathBuf> {
        self.require_path(DBSNP)
    }

    pub fn cosmic(&self) -> Option<PathBuf> {
        self.path(COSMIC)
    }

    /// Known indel resources (whichever of INDEL and INDEL1KG are set, in that order)
    pub fn known_indels(&self) -> Vec<PathBuf> {
        [INDEL, INDEL1KG]
            .iter()
            .filter_map(|s| self.path(s))
            .collect()
    }

    pub fn java(&self) -> &str {
        self.get(JAVA).unwrap_or("java")
    }

    pub fn bgzip(&self) -> &str {
        self.get(BGZIP).unwrap_or("bgzip")
    }

    pub fn tabix(&self) -> &str {
        self.get(TABIX).unwrap_or("tabix")
    }
}

#[cfg(test)]
pub(crate) fn test_config(vars: &[(&str, &str)]) -> RefConfig {
    RefConfig {
        source: PathBuf::from("test.ref.sh"),
        vars: vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CFG: &str = r#"#!/bin/bash
# Reference files for hg19
RESDIR=/resources/hg19
export REF="${RESDIR}/ucsc.hg19.fasta"
GATK=$TOOLS/GenomeAnalysisTK.jar
ETKEY='/keys/$USER.key'
DBSNP=$RESDIR/dbsnp_138.hg19.vcf   # dbsnp build 138
INDEL=${RESDIR}/Mills_and_1000G_gold_standard.indels.hg19.vcf
module load java
COSMIC=
"#;

    fn env(s: &str) -> Option<String> {
        match s {
            "TOOLS" => Some("/opt/gatk".to_string()),
            _ => None,
        }
    }

    fn load(dir: &Path) -> RefConfig {
        let p = dir.join("ref.sh");
        std::fs::write(&p, CFG).unwrap();
        RefConfig::from_file_with_env(&p, env).unwrap()
    }

    #[test]
    fn parse_assignments() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load(dir.path());
        assert_eq!(
            cfg.reference().unwrap(),
            PathBuf::from("/resources/hg19/ucsc.hg19.fasta")
        );
        assert_eq!(
            cfg.gatk_jar().unwrap(),
            PathBuf::from("/opt/gatk/GenomeAnalysisTK.jar")
        );
        assert_eq!(cfg.get(ETKEY), Some("/keys/$USER.key"));
        assert_eq!(
            cfg.dbsnp().unwrap(),
            PathBuf::from("/resources/hg19/dbsnp_138.hg19.vcf")
        );
        assert_eq!(cfg.known_indels().len(), 1);
        assert!(cfg.cosmic().is_none());
        assert!(cfg.get("module").is_none());
        assert_eq!(cfg.java(), "java");
        assert_eq!(cfg.bgzip(), "bgzip");
    }

    #[test]
    fn missing_variable_named_in_error() {
        let cfg = test_config(&[(REF, "/ref.fa")]);
        let e = cfg.gatk_jar().unwrap_err();
        assert!(format!("{}", e).contains("GATK"));
    }

    #[test]
    fn known_indels_in_order() {
        let cfg = test_config(&[(INDEL1KG, "/r/1kg.vcf"), (INDEL, "/r/mills.vcf")]);
        assert_eq!(
            cfg.known_indels(),
            vec![PathBuf::from("/r/mills.vcf"), PathBuf::from("/r/1kg.vcf")]
        );
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn unset_variable_expands_empty() {
        let p = Parser::new().unwrap();
        let vars = HashMap::new();
        let (k, v) = p.parse_line("X=$NOT_SET/file", &vars, &no_env).unwrap();
        assert_eq!((k.as_str(), v.as_str()), ("X", "/file"));
        assert!(p.parse_line("# X=1", &vars, &no_env).is_none());
        assert!(p.parse_line("echo X=1", &vars, &no_env).is_none());
    }

    #[test]
    fn quoted_value_with_comment() {
        let dir = tempfile::tempdir().unwrap();
        let f = dir.path().join("ref.sh");
        std::fs::write(
            &f,
            "RESDIR=/resources\n\
             REF=\"/ref/hg19.fa\"   # hg19 build\n\
             GATK='/opt/GATK.jar' # v3.8\n\
             DBSNP=\"$RESDIR/dbsnp 138.vcf\" # with a space\n\
             INDEL='$RESDIR/mills.vcf'\n",
        )
        .unwrap();
        let cfg = RefConfig::from_file_with_env(&f, no_env).unwrap();
        assert_eq!(cfg.get(REF), Some("/ref/hg19.fa"));
        assert_eq!(cfg.get(GATK), Some("/opt/GATK.jar"));
        assert_eq!(cfg.get(DBSNP), Some("/resources/dbsnp 138.vcf"));
        assert_eq!(cfg.get(INDEL), Some("$RESDIR/mills.vcf"));
    }

    #[test]
    fn unterminated_quote_skipped() {
        let p = Parser::new().unwrap();
        let vars = HashMap::new();
        assert!(p.parse_line("REF=\"/ref/hg19.fa", &vars, &no_env).is_none());
        let (_, v) = p.parse_line("X=\"\"  # empty", &vars, &no_env).unwrap();
        assert_eq!(v, "");
    }

    #[test]
    fn unsupported_expansions_detected() {
        let p = Parser::new().unwrap();
        assert_eq!(
            p.unsupported_expansion("${RESDIR:-/res}/hg19.fa"),
            Some("${RESDIR:-/res}")
        );
        assert_eq!(p.unsupported_expansion("/ref/\\$HOME.fa"), Some("\\$"));
        assert_eq!(p.unsupported_expansion("$(pwd)/hg19.fa"), Some("$("));
        assert_eq!(p.unsupported_expansion("${RESDIR"), Some("${RESDIR"));
        assert!(p.unsupported_expansion("${RESDIR}/$REF_DIR/x.fa").is_none());

        // Left as literal text
        let vars = HashMap::new();
        let (_, v) = p
            .parse_line("REF=${RESDIR:-/res}/hg19.fa", &vars, &no_env)
            .unwrap();
        assert_eq!(v, "${RESDIR:-/res}/hg19.fa");
    }
}
