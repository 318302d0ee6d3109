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
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::sync::Mutex;
use std::sync::MutexGuard;
use tempfile::TempDir;
use tempfile::tempdir;
use vhls::command::Command;
use vhls::dist::Distribution;
use vhls::error::SweepError;
use vhls::job::parse_sweep;
use vhls::report::ReportParser;
use vhls::runner::Runner;
use vhls::runner::RunnerStatus;
use vhls::sweep::Job;
use vhls::sweep::Sweep;
use vhls::sweep::run_sweep;

static SERIAL: Mutex<()> = Mutex::new(());

/// Installing the fake tool while another test forks can make exec fail
/// with ETXTBSY.
fn serial() -> MutexGuard<'static, ()> {
  SERIAL.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A fake tool that fails when the script mentions "fail" and otherwise
/// writes a synthesis report for `prj/sol`.
fn fake_dist() -> (TempDir, Distribution) {
  let fixture = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/csynth.xml");
  let root = tempdir().unwrap();
  let bin = root.path().join("bin");
  fs::create_dir_all(&bin).unwrap();
  let tool = bin.join("vitis_hls");
  fs::write(
    &tool,
    format!(
      r#"#!/bin/sh
cp "$1" vitis_hls.log
if grep -q fail "$1"; then exit 1; fi
mkdir -p prj/sol/syn/report
cp "{}" prj/sol/syn/report/csynth.xml
"#,
      fixture.display()
    ),
  )
  .unwrap();
  fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();
  let dist = Distribution::new(root.path());
  (root, dist)
}

fn job(name: &str, extra: Option<&str>) -> Job {
  let mut commands = vec![
    Command::open_project("prj").unwrap(),
    Command::open_solution("sol").unwrap(),
  ];
  if let Some(tcl) = extra {
    commands.push(Command::user_tcl(tcl).unwrap());
  }
  commands.push(Command::csynth_design());
  Job {
    name: name.to_string(),
    commands,
  }
}

fn sweep(root: &Path, jobs: Vec<Job>) -> Sweep {
  Sweep {
    root: root.to_path_buf(),
    jobs,
    max_parallel: 2,
    collect_reports: true,
  }
}

#[tokio::test]
async fn test_sweep_runs_each_job_in_its_own_dir() {
  let _serial = serial();
  let (_root, dist) = fake_dist();
  let work = tempdir().unwrap();
  let template = Runner::new(dist, work.path());
  let jobs = vec![
    job("c_fails", Some("# fail")),
    job("a", None),
    job("b", None),
  ];

  let outcomes = run_sweep(sweep(work.path(), jobs), &template, ReportParser::default())
    .await
    .unwrap();

  let names: Vec<_> = outcomes.iter().map(|o| o.name.as_str()).collect();
  assert_eq!(names, vec!["a", "b", "c_fails"]);

  for outcome in &outcomes[..2] {
    assert_eq!(outcome.dir, work.path().join(&outcome.name));
    let result = outcome.result.as_ref().unwrap();
    assert_eq!(result.status(), RunnerStatus::Success);
    let report = outcome.report.as_ref().unwrap().as_ref().unwrap();
    assert_eq!(report.top_level_latency_data.average_case_latency_c, Some(2089));
    assert!(outcome.dir.join("vitis_hls.log").is_file());
  }

  let failed = &outcomes[2];
  assert_eq!(
    failed.result.as_ref().unwrap().status(),
    RunnerStatus::Fail
  );
  assert!(failed.report.is_none());
}

#[tokio::test]
async fn test_sweep_without_reports() {
  let _serial = serial();
  let (_root, dist) = fake_dist();
  let work = tempdir().unwrap();
  let template = Runner::new(dist, work.path());
  let mut plan = sweep(work.path(), vec![job("only", None)]);
  plan.collect_reports = false;
  plan.max_parallel = 1;

  let outcomes = run_sweep(plan, &template, ReportParser::default())
    .await
    .unwrap();
  assert_eq!(outcomes.len(), 1);
  assert!(outcomes[0].result.as_ref().unwrap().is_success());
  assert!(outcomes[0].report.is_none());
}

#[tokio::test]
async fn test_sweep_rejects_bad_job_names() {
  let work = tempdir().unwrap();
  let template = Runner::new(Distribution::new(work.path()), work.path());

  let err = run_sweep(
    sweep(work.path(), vec![job("../escape", None)]),
    &template,
    ReportParser::default(),
  )
  .await
  .unwrap_err();
  assert!(matches!(err, SweepError::InvalidJobName(ref n) if n == "../escape"));

  let err = run_sweep(
    sweep(work.path(), vec![job("a", None), job("a", None)]),
    &template,
    ReportParser::default(),
  )
  .await
  .unwrap_err();
  assert!(matches!(err, SweepError::DuplicateJob(ref n) if n == "a"));
}

#[test]
fn test_report_location_uses_last_open_commands() {
  let mut j = job("x", None);
  j.commands.push(Command::open_solution("sol2").unwrap());
  assert_eq!(j.report_location(), Some(("prj", "sol2")));

  let bare = Job {
    name: "y".to_string(),
    commands: vec![Command::csynth_design()],
  };
  assert_eq!(bare.report_location(), None);
}

#[test]
fn test_parse_sweep_file() {
  let text = r#"
root = "runs"
collect_reports = true

[[job]]
name = "fast"

[[job.command]]
op = "open_project"
name = "prj"

[[job.command]]
op = "create_clock"
period = 2

[[job]]
name = "slow"

[[job.command]]
op = "open_project"
name = "prj"
"#;
  let sweep = parse_sweep(text, 4).unwrap();
  assert_eq!(sweep.root, Path::new("runs"));
  assert_eq!(sweep.max_parallel, 4);
  assert!(sweep.collect_reports);
  assert_eq!(sweep.jobs.len(), 2);
  assert_eq!(sweep.jobs[0].name, "fast");
  assert_eq!(sweep.jobs[0].commands[1].to_string(), "create_clock -period 2");
}
