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
use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use serde_json::json;
use std::fs;
use std::path::Path;
use vhls::cli::Cli;
use vhls::cli::Commands;
use vhls::config::Settings;
use vhls::dist::Distribution;
use vhls::job::load_commands;
use vhls::job::load_sweep;
use vhls::log::HlsLog;
use vhls::logging::setup_tracing;
use vhls::project::Project;
use vhls::report::ReportParser;
use vhls::report::UndefLatency;
use vhls::script::Composer;
use vhls::sweep::run_sweep;

#[tokio::main]
async fn main() -> Result<()> {
  setup_tracing();

  let Cli { global, command } = Cli::parse();
  let main_span = tracing::info_span!("vhls");
  let _enter = main_span.enter();

  match command {
    Commands::Script { job } => {
      let commands = load_commands(&job)?;
      print!("{}", Composer.compose(&commands));
    }
    Commands::Run { job, check } => {
      let settings = Settings::load(&global)?;
      let commands = load_commands(&job)?;
      let runner = settings.runner()?;

      tracing::info!("Running {} commands...", commands.len());
      let result = tokio::task::spawn_blocking(move || runner.run(&commands)).await??;

      println!("{}", serde_json::to_string_pretty(&result)?);
      if check {
        result.check()?;
      }
    }
    Commands::Report {
      report,
      strict_latency,
    } => {
      let settings = Settings::load(&global)?;
      let parser = if strict_latency {
        ReportParser::new(UndefLatency::Reject)
      } else {
        settings.report_parser()
      };
      let parsed = parser.parse_from_disk(&report)?;
      println!("{}", serde_json::to_string_pretty(&parsed)?);
    }
    Commands::Log { log } => {
      let text = read_lossy(&log)?;
      let log = HlsLog::new(text);
      let summary = json!({
        "warnings": log.warnings().len(),
        "errors": log.errors().len(),
        "infos": log.infos().len(),
        "total_elapsed": log.total_elapsed(),
        "runtimes": log.runtimes(),
      });
      println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Commands::Project { dir } => {
      let project = Project::open(&dir)?;
      println!("{}", serde_json::to_string_pretty(&project)?);
    }
    Commands::Dist { dir } => {
      let dist = match dir {
        Some(dir) => Distribution::new(dir),
        None => Settings::load(&global)?.distribution()?,
      };
      let info = json!({
        "root": dist.root(),
        "tool_binary": dist.tool_binary(),
        "bin_dir": dist.bin_dir(),
        "include_dir": dist.include_dir(),
      });
      println!("{}", serde_json::to_string_pretty(&info)?);
    }
    Commands::Sweep { sweep } => {
      let settings = Settings::load(&global)?;
      let sweep = load_sweep(&sweep, settings.max_parallel)?;
      let runner = settings.runner()?;

      tracing::info!("Starting sweep of {} jobs...", sweep.jobs.len());
      let outcomes = run_sweep(sweep, &runner, settings.report_parser()).await?;

      for outcome in outcomes {
        let line = json!({
          "name": outcome.name,
          "dir": outcome.dir,
          "status": outcome.result.as_ref().ok().map(|r| r.status()),
          "exit_code": outcome.result.as_ref().ok().and_then(|r| r.exit_code),
          "error": outcome.result.as_ref().err().map(|e| e.to_string()),
          "report": outcome.report.as_ref().and_then(|r| r.as_ref().ok()),
          "report_error": outcome
            .report
            .as_ref()
            .and_then(|r| r.as_ref().err())
            .map(|e| e.to_string()),
        });
        println!("{line}");
      }
    }
  }

  Ok(())
}

fn read_lossy(path: &Path) -> Result<String> {
  let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
  Ok(String::from_utf8_lossy(&bytes).into_owned())
}
