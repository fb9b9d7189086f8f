//! Snakemake invocation for the full simulation workflow.

use crate::{Error, Result};
use clap::ValueEnum;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

pub const DEFAULT_TARGET: &str = "all_bin_summaries";
pub const DEFAULT_INSERT_SIZE: i64 = 270;
pub const DEFAULT_CORES: i64 = 6;
pub const DEFAULT_CONDA_FRONTEND: &str = "conda";

lazy_static! {
    static ref ALLOWED_ARGUMENT: Regex = Regex::new(r#"^[a-zA-Z0-9"'./_\- ]*$"#).unwrap();
}

const ALLOWED_DESCRIPTION: &str =
    "Arguments can only consist of alphanumeric characters, quote marks, ., /, _, - and space.";

/// ART error profile used by CAMISIM.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum ProfileType {
    #[default]
    Mbarc,
    Hi,
    Mi,
    Hi150,
    Own,
}

impl fmt::Display for ProfileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProfileType::Mbarc => "mbarc",
            ProfileType::Hi => "hi",
            ProfileType::Mi => "mi",
            ProfileType::Hi150 => "hi150",
            ProfileType::Own => "own",
        };
        write!(f, "{}", name)
    }
}

/// Workflow configuration file handed to Snakemake with `--configfile`.
///
/// Only `conda_frontend` is read here; everything else is passed through.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowConfig {
    #[serde(default = "default_conda_frontend")]
    pub conda_frontend: String,
    #[serde(flatten)]
    pub workflow: serde_json::Map<String, serde_json::Value>,
}

fn default_conda_frontend() -> String {
    DEFAULT_CONDA_FRONTEND.to_string()
}

impl WorkflowConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = crate::utils::open_file(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }
}

/// Repository-relative location of the workflow files.
pub fn default_snakefile() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("snakefiles")
        .join("Snakefile")
}

pub fn default_config_file() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("config")
        .join("default_config.json")
}

#[derive(Debug, Clone, PartialEq)]
pub struct SnakemakeCommand {
    pub samples_file: PathBuf,
    pub target: String,
    pub profile_type: ProfileType,
    pub profile_name: Option<String>,
    pub readlength: Option<String>,
    pub insert_size: i64,
    pub cluster: Option<String>,
    pub cores: i64,
    pub snakefile: PathBuf,
    pub configfile: PathBuf,
    pub conda_frontend: String,
    pub snake_flags: Vec<String>,
}

impl SnakemakeCommand {
    /// A command with every default applied.
    pub fn new<P: AsRef<Path>>(samples_file: P) -> Self {
        Self {
            samples_file: samples_file.as_ref().to_path_buf(),
            target: DEFAULT_TARGET.to_string(),
            profile_type: ProfileType::default(),
            profile_name: None,
            readlength: None,
            insert_size: DEFAULT_INSERT_SIZE,
            cluster: None,
            cores: DEFAULT_CORES,
            snakefile: default_snakefile(),
            configfile: default_config_file(),
            conda_frontend: DEFAULT_CONDA_FRONTEND.to_string(),
            snake_flags: Vec::new(),
        }
    }

    /// Takes configfile and conda frontend from a workflow configuration.
    pub fn with_config<P: AsRef<Path>>(mut self, configfile: P) -> Result<Self> {
        let config = WorkflowConfig::from_file(&configfile)?;
        self.configfile = configfile.as_ref().to_path_buf();
        self.conda_frontend = config.conda_frontend;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        let profile_name = self.profile_name.as_deref().unwrap_or("");
        let readlength = self.readlength.as_deref().unwrap_or("");
        for (name, value) in [
            ("target", self.target.as_str()),
            ("profile name", profile_name),
            ("read length", readlength),
        ] {
            if !ALLOWED_ARGUMENT.is_match(value) {
                return Err(Error::invalid(name, value, ALLOWED_DESCRIPTION));
            }
        }

        if self.insert_size <= 0 {
            return Err(Error::invalid(
                "insert size",
                self.insert_size,
                "Insert size needs to be above 0.",
            ));
        }
        if self.cores <= 0 {
            return Err(Error::invalid(
                "cores",
                self.cores,
                "Amount of cores must be an integer above 0.",
            ));
        }

        let custom = !profile_name.is_empty() || !readlength.is_empty();
        if self.profile_type == ProfileType::Own && (profile_name.is_empty() || readlength.is_empty())
        {
            return Err(Error::invalid(
                "profile type",
                self.profile_type,
                "Both name of the custom error profile and read length of the error profile must be given when using own profiles.",
            ));
        }
        if custom && self.profile_type != ProfileType::Own {
            return Err(Error::invalid(
                "profile type",
                self.profile_type,
                "Name of the error profile and read length can only be specified when using own profiles.",
            ));
        }
        Ok(())
    }

    /// The full argument vector, program name first.
    pub fn build_args(&self) -> Result<Vec<String>> {
        self.validate()?;

        let unset = |v: &Option<String>| match v.as_deref() {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => "False".to_string(),
        };

        let mut args = vec![
            "snakemake".to_string(),
            self.target.clone(),
            "-s".to_string(),
            self.snakefile.display().to_string(),
        ];
        if let Some(cluster) = self.cluster.as_deref().filter(|c| !c.is_empty()) {
            args.push("--cluster".to_string());
            args.push(cluster.to_string());
        }
        args.extend([
            "--config".to_string(),
            format!("profile_type=\"{}\"", self.profile_type),
            format!("profile_name=\"{}\"", unset(&self.profile_name)),
            format!("readlength=\"{}\"", unset(&self.readlength)),
            format!("insert_size={}", self.insert_size),
            format!("samples_file={}", self.samples_file.display()),
            "--use-conda".to_string(),
            "--conda-frontend".to_string(),
            self.conda_frontend.clone(),
            "--configfile".to_string(),
            self.configfile.display().to_string(),
            "--cores".to_string(),
            self.cores.to_string(),
        ]);
        args.extend(self.snake_flags.iter().cloned());
        Ok(args)
    }

    /// Runs Snakemake and fails when it exits unsuccessfully.
    pub fn run(&self) -> Result<()> {
        let args = self.build_args()?;
        log::info!("running {}", args.join(" "));
        let status = Command::new(&args[0]).args(&args[1..]).status()?;
        if !status.success() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("snakemake exited with {}", status),
            )));
        }
        Ok(())
    }
}
