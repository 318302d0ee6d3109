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
use crate::command::Operation;
use crate::error::ReportError;
use crate::error::RunnerError;
use crate::error::SweepError;
use crate::report::ReportParser;
use crate::report::SynthesisReport;
use crate::report::locate_csynth_report;
use crate::runner::Runner;
use crate::runner::RunnerResult;
use std::collections::HashSet;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::Instrument;

/// One unit of work. Runs in `<sweep root>/<name>`.
#[derive(Debug, Clone)]
pub struct Job {
  pub name: String,
  pub commands: Vec<Command>,
}

impl Job {
  /// Project and solution names from the last `open_project` and
  /// `open_solution` commands.
  pub fn report_location(&self) -> Option<(&str, &str)> {
    let last_named = |op: Operation| {
      self
        .commands
        .iter()
        .rev()
        .find(|c| c.op() == op)
        .and_then(|c| c.text("name"))
    };
    Some((
      last_named(Operation::OpenProject)?,
      last_named(Operation::OpenSolution)?,
    ))
  }
}

#[derive(Debug, Clone)]
pub struct Sweep {
  pub root: PathBuf,
  pub jobs: Vec<Job>,
  pub max_parallel: usize,
  pub collect_reports: bool,
}

#[derive(Debug)]
pub struct JobOutcome {
  pub name: String,
  pub dir: PathBuf,
  pub result: Result<RunnerResult, RunnerError>,
  /// Present only when reports were requested and the run succeeded.
  pub report: Option<Result<SynthesisReport, ReportError>>,
}

fn validate_names(jobs: &[Job]) -> Result<(), SweepError> {
  let mut seen = HashSet::new();
  for job in jobs {
    let mut components = Path::new(&job.name).components();
    let single_normal = matches!(
      (components.next(), components.next()),
      (Some(Component::Normal(_)), None)
    );
    if !single_normal {
      return Err(SweepError::InvalidJobName(job.name.clone()));
    }
    if !seen.insert(job.name.as_str()) {
      return Err(SweepError::DuplicateJob(job.name.clone()));
    }
  }
  Ok(())
}

/// Runs every job in its own directory with its own runner, at most
/// `max_parallel` at a time.
///
/// A failing job is recorded in its outcome and does not stop the others.
/// Outcomes are sorted by job name.
pub async fn run_sweep(
  sweep: Sweep,
  template: &Runner,
  parser: ReportParser,
) -> Result<Vec<JobOutcome>, SweepError> {
  validate_names(&sweep.jobs)?;

  let span = tracing::info_span!(
    "run_sweep",
    root = %sweep.root.display(),
    jobs = sweep.jobs.len(),
    max_parallel = sweep.max_parallel
  );

  async move {
    let permits = Arc::new(Semaphore::new(sweep.max_parallel.max(1)));
    let mut tasks = JoinSet::new();

    for job in sweep.jobs {
      let dir = sweep.root.join(&job.name);
      tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|source| SweepError::CreateDir {
          path: dir.clone(),
          source,
        })?;

      let runner = template.for_dir(&dir);
      let permits = Arc::clone(&permits);
      let collect_reports = sweep.collect_reports;
      let job_span = tracing::info_span!("job", name = %job.name);

      tasks.spawn(
        async move {
          // The semaphore is never closed, so acquiring only fails on a bug.
          let _permit = permits.acquire_owned().await.ok();
          tracing::info!("Starting job");
          let Job { name, commands } = job;
          let outcome = tokio::task::spawn_blocking(move || {
            let result = runner.run(&commands);
            (commands, result)
          })
          .await;

          let (commands, result) = match outcome {
            Ok(pair) => pair,
            Err(e) => return Err(SweepError::Join(e)),
          };

          let report = match &result {
            Ok(r) if collect_reports && r.is_success() => {
              let job = Job { name: name.clone(), commands };
              job.report_location().map(|(project, solution)| {
                locate_csynth_report(&dir, project, solution)
                  .and_then(|path| parser.parse_from_disk(&path))
              })
            }
            _ => None,
          };

          match &result {
            Ok(r) => tracing::info!(status = ?r.status(), "Finished job"),
            Err(e) => tracing::error!(error = %e, "Job failed"),
          }

          Ok(JobOutcome {
            name,
            dir,
            result,
            report,
          })
        }
        .instrument(job_span),
      );
    }

    let mut outcomes = Vec::new();
    while let Some(joined) = tasks.join_next().await {
      outcomes.push(joined??);
    }
    outcomes.sort_by(|a, b| a.name.cmp(&b.name));
    tracing::info!("--- Sweep complete ---");
    Ok(outcomes)
  }
  .instrument(span)
  .await
}
