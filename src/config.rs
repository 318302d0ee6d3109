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
use crate::cli::GlobalArgs;
use crate::dist::Distribution;
use crate::error::ConfigError;
use crate::error::DistError;
use crate::report::ReportParser;
use crate::report::UndefLatency;
use crate::runner::DEFAULT_LOG_FILE;
use crate::runner::Runner;
use figment::Figment;
use figment::providers::Env;
use figment::providers::Format;
use figment::providers::Serialized;
use figment::providers::Toml;
use serde::Deserialize;
use serde::Serialize;
use std::path::Path;
use std::path::PathBuf;
use std::thread;

pub const DEFAULT_CONFIG_FILE: &str = "vhls.toml";
pub const ENV_PREFIX: &str = "VHLS_";

// --- Default Values ---
fn default_working_dir() -> PathBuf {
  PathBuf::from(".")
}

fn default_log_file_name() -> String {
  DEFAULT_LOG_FILE.to_string()
}

fn default_max_parallel() -> usize {
  thread::available_parallelism().map_or(1, |n| n.get())
}

/// Resolved settings.
///
/// Layered as: defaults, then `vhls.toml` (or `--config`), then `VHLS_*`
/// environment variables, then command-line flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
  /// Path to the `vitis_hls` binary. Searched on `PATH` when absent.
  #[serde(default)]
  pub tool_path: Option<PathBuf>,

  #[serde(default = "default_working_dir")]
  pub working_dir: PathBuf,

  #[serde(default = "default_log_file_name")]
  pub log_file_name: String,

  #[serde(default)]
  pub keep_script: bool,

  #[serde(default = "default_max_parallel")]
  pub max_parallel: usize,

  /// Treat `undef` latencies in reports as errors.
  #[serde(default)]
  pub strict_latency: bool,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      tool_path: None,
      working_dir: default_working_dir(),
      log_file_name: default_log_file_name(),
      keep_script: false,
      max_parallel: default_max_parallel(),
      strict_latency: false,
    }
  }
}

/// Command-line values that override every other layer. Only set fields
/// are merged.
#[derive(Debug, Default, Serialize)]
struct Overrides {
  #[serde(skip_serializing_if = "Option::is_none")]
  tool_path: Option<PathBuf>,
  #[serde(skip_serializing_if = "Option::is_none")]
  working_dir: Option<PathBuf>,
}

impl Settings {
  /// Builds the figment for a config file path without the CLI layer.
  pub fn figment(config_file: &Path) -> Figment {
    Figment::from(Serialized::defaults(Settings::default()))
      .merge(Toml::file(config_file))
      .merge(Env::prefixed(ENV_PREFIX))
  }

  pub fn load(args: &GlobalArgs) -> Result<Self, ConfigError> {
    let config_file = args
      .config
      .clone()
      .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let overrides = Overrides {
      tool_path: args.tool_path.clone(),
      working_dir: args.working_dir.clone(),
    };

    let settings: Settings = Self::figment(&config_file)
      .merge(Serialized::defaults(overrides))
      .extract()
      .map_err(Box::new)?;

    if settings.max_parallel == 0 {
      return Err(ConfigError::ZeroParallelism);
    }
    tracing::debug!(?settings, "Resolved settings");
    Ok(settings)
  }

  pub fn distribution(&self) -> Result<Distribution, DistError> {
    match &self.tool_path {
      Some(bin) => Distribution::from_bin_path(bin),
      None => Distribution::auto_find(),
    }
  }

  pub fn runner(&self) -> Result<Runner, DistError> {
    Ok(
      Runner::new(self.distribution()?, &self.working_dir)
        .with_log_file_name(&self.log_file_name)
        .with_keep_script(self.keep_script),
    )
  }

  pub fn report_parser(&self) -> ReportParser {
    if self.strict_latency {
      ReportParser::new(UndefLatency::Reject)
    } else {
      ReportParser::default()
    }
  }
}
