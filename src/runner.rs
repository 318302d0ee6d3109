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
use crate::command::Command;
use crate::dist::Distribution;
use crate::error::RunnerError;
use crate::log::HlsLog;
use crate::script::Composer;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path;
use std::path::Path;
use std::path::PathBuf;
use std::process;

pub const DEFAULT_LOG_FILE: &str = "vitis_hls.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RunnerStatus {
  Success,
  Fail,
}

/// The outcome of one tool invocation.
///
/// Only built after the tool's log file was read, so `log` always holds
/// what the tool wrote during this run.
#[derive(Debug, Clone, Serialize)]
pub struct RunnerResult {
  pub commands: Vec<Command>,
  pub script: String,
  /// Set only when the runner was told to keep its script file.
  pub script_path: Option<PathBuf>,
  /// `None` when the process was terminated by a signal.
  pub exit_code: Option<i32>,
  pub stdout: String,
  pub stderr: String,
  pub log: String,
}

impl RunnerResult {
  pub fn status(&self) -> RunnerStatus {
    if self.exit_code == Some(0) {
      RunnerStatus::Success
    } else {
      RunnerStatus::Fail
    }
  }

  pub fn is_success(&self) -> bool {
    self.status() == RunnerStatus::Success
  }

  /// Opt-in fail-fast: turns a failed run into an error carrying the script,
  /// exit code and captured output.
  pub fn check(&self) -> Result<&Self, RunnerError> {
    match self.status() {
      RunnerStatus::Success => Ok(self),
      RunnerStatus::Fail => Err(RunnerError::ToolInvocationFailed {
        script: self.script.clone(),
        exit_code: self.exit_code,
        stdout: self.stdout.clone(),
        stderr: self.stderr.clone(),
      }),
    }
  }

  pub fn hls_log(&self) -> HlsLog {
    HlsLog::new(self.log.clone())
  }
}

/// Drives the tool binary in one working directory.
///
/// The tool keeps project state as files under its working directory, so a
/// runner must not be shared between concurrent invocations. Give each
/// parallel unit of work its own directory and runner.
#[derive(Debug, Clone)]
pub struct Runner {
  dist: Distribution,
  working_dir: PathBuf,
  log_file_name: String,
  keep_script: bool,
  composer: Composer,
}

impl Runner {
  pub fn new(dist: Distribution, working_dir: impl Into<PathBuf>) -> Self {
    Self {
      dist,
      working_dir: working_dir.into(),
      log_file_name: DEFAULT_LOG_FILE.to_string(),
      keep_script: false,
      composer: Composer,
    }
  }

  pub fn with_log_file_name(mut self, name: impl Into<String>) -> Self {
    self.log_file_name = name.into();
    self
  }

  pub fn with_keep_script(mut self, keep: bool) -> Self {
    self.keep_script = keep;
    self
  }

  /// The same configuration pointed at another directory.
  pub fn for_dir(&self, working_dir: impl Into<PathBuf>) -> Self {
    Self {
      working_dir: working_dir.into(),
      ..self.clone()
    }
  }

  pub fn dist(&self) -> &Distribution {
    &self.dist
  }

  pub fn working_dir(&self) -> &Path {
    &self.working_dir
  }

  pub fn log_path(&self) -> PathBuf {
    self.working_dir.join(&self.log_file_name)
  }

  pub fn build_script(&self, commands: &[Command]) -> String {
    self.composer.compose(commands)
  }

  /// Runs the commands as one script with exactly one tool invocation.
  ///
  /// A non-zero exit code is reported through [`RunnerResult::status`], not
  /// as an error. A missing tool log is always an error.
  pub fn run(&self, commands: &[Command]) -> Result<RunnerResult, RunnerError> {
    let span = tracing::info_span!("run", dir = %self.working_dir.display());
    let _enter = span.enter();

    if !self.working_dir.is_dir() {
      return Err(RunnerError::WorkingDirNotFound(self.working_dir.clone()));
    }

    let script = self.build_script(commands);

    let mut script_file = tempfile::Builder::new()
      .prefix("vhls_")
      .suffix(".tcl")
      .tempfile_in(&self.working_dir)
      .map_err(RunnerError::WriteScript)?;
    script_file
      .write_all(script.as_bytes())
      .and_then(|_| script_file.flush())
      .map_err(RunnerError::WriteScript)?;
    tracing::debug!(script = %script_file.path().display(), "Wrote script");

    // A log left over from an earlier run would mask a tool that never started.
    let log_path = self.log_path();
    if log_path.exists() {
      tracing::debug!(log = %log_path.display(), "Removing stale tool log");
      fs::remove_file(&log_path).map_err(|source| RunnerError::ReadLog {
        path: log_path.clone(),
        source,
      })?;
    }

    // The child runs in the working directory, so a relative binary path
    // must be resolved against our own cwd first.
    let binary = self.dist.tool_binary();
    let binary = path::absolute(&binary).map_err(|source| RunnerError::Spawn {
      binary: binary.clone(),
      source,
    })?;
    tracing::debug!(binary = %binary.display(), commands = commands.len(), "Invoking tool");
    let output = process::Command::new(&binary)
      .arg(script_file.path())
      .current_dir(&self.working_dir)
      .output()
      .map_err(|source| RunnerError::Spawn {
        binary: binary.clone(),
        source,
      })?;

    let exit_code = output.status.code();
    tracing::info!(?exit_code, "Tool exited");

    if !log_path.exists() {
      return Err(RunnerError::MissingToolLog { path: log_path });
    }
    let log = fs::read(&log_path)
      .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
      .map_err(|source| RunnerError::ReadLog {
        path: log_path.clone(),
        source,
      })?;

    let script_path = if self.keep_script {
      let (_, path) = script_file
        .keep()
        .map_err(|e| RunnerError::WriteScript(e.error))?;
      Some(path)
    } else {
      None
    };

    let result = RunnerResult {
      commands: commands.to_vec(),
      script,
      script_path,
      exit_code,
      stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
      stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
      log,
    };

    if !result.is_success() {
      tracing::warn!(?exit_code, "Tool reported failure");
    }

    Ok(result)
  }
}
