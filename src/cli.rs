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
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about = "Drive Vitis HLS from typed command files")]
pub struct Cli {
  #[command(flatten)]
  pub global: GlobalArgs,

  #[command(subcommand)]
  pub command: Commands,
}

/// Options shared by every subcommand. They override `vhls.toml` and
/// `VHLS_*` environment variables.
#[derive(Debug, Args, Default)]
pub struct GlobalArgs {
  /// Settings file.
  #[arg(long, global = true)]
  pub config: Option<PathBuf>,

  /// Path to the vitis_hls binary. Searched on PATH when absent.
  #[arg(long, global = true)]
  pub tool_path: Option<PathBuf>,

  /// Directory the tool runs in.
  #[arg(long, global = true)]
  pub working_dir: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
  /// Print the Tcl script for a job file without running it.
  Script {
    /// TOML file with [[command]] entries.
    job: PathBuf,
  },

  /// Run a job file through the tool and print the result as JSON.
  Run {
    /// TOML file with [[command]] entries.
    job: PathBuf,

    /// Exit with an error when the tool reports failure.
    #[arg(long)]
    check: bool,
  },

  /// Parse a csynth.xml synthesis report and print it as JSON.
  Report {
    report: PathBuf,

    /// Fail on undefined latencies instead of reporting them as null.
    #[arg(long)]
    strict_latency: bool,
  },

  /// Summarize a vitis_hls.log file as JSON.
  Log { log: PathBuf },

  /// Print the hls.app descriptor of a project directory as JSON.
  Project { dir: PathBuf },

  /// Print the paths of a tool installation.
  Dist {
    /// Installation root. Searched on PATH when absent.
    dir: Option<PathBuf>,
  },

  /// Run several jobs in parallel, one directory per job.
  Sweep {
    /// TOML file with a root directory and [[job]] entries.
    sweep: PathBuf,
  },
}
