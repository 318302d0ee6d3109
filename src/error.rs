// Copyright 2025 Chisomo Makombo Sakala
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error enum for the vhls library.
#[derive(Error, Debug)]
pub enum VhlsError {
  #[error("Invalid command")]
  Command(#[from] CommandError),

  #[error("Tool run failed")]
  Runner(#[from] RunnerError),

  #[error("Synthesis report error")]
  Report(#[from] ReportError),

  #[error("Distribution error")]
  Dist(#[from] DistError),

  #[error("Project error")]
  Project(#[from] ProjectError),

  #[error("Job file error")]
  Job(#[from] JobError),

  #[error("Sweep failed")]
  Sweep(#[from] SweepError),

  #[error("Configuration error")]
  Config(#[from] ConfigError),

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),
}

/// Errors raised while constructing a command (src/command.rs).
///
/// These are always raised at construction time, never while rendering.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
  #[error("Invalid value '{value}' for -{field} of {op}. Allowed: {allowed:?}")]
  InvalidParameter {
    op: &'static str,
    field: &'static str,
    value: String,
    allowed: &'static [&'static str],
  },

  #[error("{op} has no parameter named '{field}'")]
  UnknownParameter { op: &'static str, field: String },

  #[error("{op} requires parameter '{field}'")]
  MissingParameter {
    op: &'static str,
    field: &'static str,
  },

  #[error("Parameter '{field}' of {op} expects {expected}")]
  TypeMismatch {
    op: &'static str,
    field: &'static str,
    expected: &'static str,
  },

  #[error("Parameter '{field}' of {op} must not be empty")]
  EmptyValue {
    op: &'static str,
    field: &'static str,
  },

  #[error("Unknown operation '{0}'")]
  UnknownOperation(String),
}

/// Errors related to tool invocation (src/runner.rs).
#[derive(Error, Debug)]
pub enum RunnerError {
  #[error("Working directory not found: {0}")]
  WorkingDirNotFound(PathBuf),

  #[error("Failed to write script file")]
  WriteScript(#[source] std::io::Error),

  #[error("Failed to execute tool binary {binary}")]
  Spawn {
    binary: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Tool log file {path} does not exist; the tool did not run as expected")]
  MissingToolLog { path: PathBuf },

  #[error("Failed to read tool log {path}")]
  ReadLog {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error(
    "Tool invocation failed with exit code {exit_code:?}\n--- SCRIPT ---\n{script}\n--- STDOUT ---\n{stdout}\n--- STDERR ---\n{stderr}"
  )]
  ToolInvocationFailed {
    script: String,
    exit_code: Option<i32>,
    stdout: String,
    stderr: String,
  },
}

/// Errors related to synthesis report parsing (src/report.rs).
///
/// A report the parser cannot use surfaces as one of three variants:
/// [`ReportError::Xml`] when the document is not well-formed,
/// [`ReportError::MalformedReport`] when a required element is absent, and
/// [`ReportError::InvalidValue`] when an element's text does not parse.
/// [`ReportError::is_malformed`] matches all three.
#[derive(Error, Debug)]
pub enum ReportError {
  #[error("Failed to read report {path}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Report is not well-formed XML")]
  Xml(#[from] roxmltree::Error),

  #[error("Malformed report: missing required element {path}")]
  MalformedReport { path: String },

  #[error("Malformed report: invalid value '{value}' at {path}")]
  InvalidValue { path: String, value: String },

  #[error("{case} latency is undefined")]
  UndefinedLatency { case: &'static str },

  #[error("Resource kind {kind} missing from {map}")]
  MissingResourceKind { kind: String, map: &'static str },

  #[error("Available count for resource kind {kind} is zero")]
  ZeroAvailable { kind: String },

  #[error("No csynth.xml found below {0}")]
  ReportNotFound(PathBuf),
}

impl ReportError {
  /// True when the report content itself is unusable, as opposed to an I/O
  /// failure or a policy rejection.
  pub fn is_malformed(&self) -> bool {
    matches!(
      self,
      ReportError::Xml(_) | ReportError::MalformedReport { .. } | ReportError::InvalidValue { .. }
    )
  }
}

/// Errors related to locating the tool installation (src/dist.rs).
#[derive(Error, Debug)]
pub enum DistError {
  #[error("Could not find {binary} on PATH; specify the tool path manually")]
  NotFound { binary: &'static str },

  #[error("Tool binary {0} has no installation root")]
  NoRoot(PathBuf),

  #[error("Failed to scan include directory {path}")]
  ScanIncludes {
    path: PathBuf,
    #[source]
    source: walkdir::Error,
  },
}

/// Errors related to project descriptors (src/project.rs).
#[derive(Error, Debug)]
pub enum ProjectError {
  #[error("Could not find hls.app in {0}")]
  MissingDescriptor(PathBuf),

  #[error("Failed to read project descriptor {path}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Project descriptor is not well-formed XML")]
  Xml(#[from] roxmltree::Error),
}

/// Errors related to job and sweep files (src/job.rs).
#[derive(Error, Debug)]
pub enum JobError {
  #[error("Failed to read job file {path}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to parse TOML: {0}")]
  TomlParse(#[from] toml::de::Error),

  #[error("Command #{index} has no 'op' key")]
  MissingOp { index: usize },

  #[error("Command #{index}: parameter '{field}' has an unsupported value type")]
  UnsupportedValue { index: usize, field: String },

  #[error("Command #{index} is invalid")]
  InvalidCommand {
    index: usize,
    #[source]
    source: CommandError,
  },
}

/// Errors related to parallel sweeps (src/sweep.rs).
#[derive(Error, Debug)]
pub enum SweepError {
  #[error("Invalid job name '{0}': must be a single directory name")]
  InvalidJobName(String),

  #[error("Duplicate job name '{0}'")]
  DuplicateJob(String),

  #[error("Failed to create job directory {path}")]
  CreateDir {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Job task failed")]
  Join(#[from] tokio::task::JoinError),
}

/// Errors related to settings resolution (src/config.rs).
#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("Failed to load settings")]
  Figment(#[from] Box<figment::Error>),

  #[error("max_parallel must be at least 1")]
  ZeroParallelism,
}
